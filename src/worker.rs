//! Background thread that runs mask requests off the caller's thread.
//!
//! Requests and responses are moved through channels, so the color buffer
//! changes owner instead of being copied, and the caller and the worker never
//! share mutable state. A request in flight cannot be interrupted; dropping the
//! worker stops it after the current request and discards the rest of the queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use crate::engine::{MaskRequest, MaskResponse, process};
use crate::{MaskError, MaskResult};

/// Handle to a dedicated masking thread.
#[derive(Debug)]
pub struct MaskWorker {
    requests: Option<Sender<MaskRequest>>,
    responses: Receiver<MaskResponse>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MaskWorker {
    /// Start the worker thread.
    pub fn spawn() -> MaskResult<Self> {
        Self::spawn_with(process)
    }

    fn spawn_with<H>(handler: H) -> MaskResult<Self>
    where
        H: FnMut(MaskRequest) -> MaskResponse + Send + 'static,
    {
        let (request_tx, request_rx) = channel::<MaskRequest>();
        let (response_tx, response_rx) = channel::<MaskResponse>();
        let stop = Arc::new(AtomicBool::new(false));

        let worker_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("mask-worker".into())
            .spawn(move || worker_loop(request_rx, response_tx, &worker_stop, handler))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            stop,
            handle: Some(handle),
        })
    }

    /// Hand a request (and its buffer) to the worker.
    pub fn submit(&self, request: MaskRequest) -> MaskResult<()> {
        let requests = self.requests.as_ref().ok_or(MaskError::WorkerDisconnected)?;
        requests
            .send(request)
            .map_err(|_| MaskError::WorkerDisconnected)
    }

    /// Block until the next response is available.
    pub fn recv(&self) -> MaskResult<MaskResponse> {
        self.responses
            .recv()
            .map_err(|_| MaskError::WorkerDisconnected)
    }

    /// Take a response if one is ready, without blocking.
    ///
    /// `Ok(None)` means nothing is ready yet; a worker thread that has exited
    /// is reported as [`MaskError::WorkerDisconnected`].
    pub fn try_recv(&self) -> MaskResult<Option<MaskResponse>> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(MaskError::WorkerDisconnected),
        }
    }

    /// Submit a request and wait for its response.
    pub fn process(&self, request: MaskRequest) -> MaskResult<MaskResponse> {
        self.submit(request)?;
        self.recv()
    }
}

impl Drop for MaskWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("mask worker thread panicked");
            }
        }
    }
}

fn worker_loop<H>(
    requests: Receiver<MaskRequest>,
    responses: Sender<MaskResponse>,
    stop: &AtomicBool,
    mut handler: H,
) where
    H: FnMut(MaskRequest) -> MaskResponse,
{
    log::debug!("mask worker started");
    for request in requests {
        if stop.load(Ordering::Acquire) {
            log::debug!("mask worker dropping queued request {}", request.generation);
            break;
        }
        let response = handler(request);
        if responses.send(response).is_err() {
            break;
        }
    }
    log::debug!("mask worker stopped");
}
