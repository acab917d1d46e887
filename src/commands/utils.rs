use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cutout::{Cutout, MaskResult, MaskSettings, MaskWorker};

use crate::cli::{GlobalOptions, OutputArgs};

/// Load the settings file named on the command line, or the defaults.
pub fn load_settings(global: &GlobalOptions) -> MaskResult<MaskSettings> {
    match &global.settings {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            let settings = serde_json::from_reader(reader)?;
            log::debug!("loaded settings from {}", path.display());
            Ok(settings)
        }
        None => Ok(MaskSettings::default()),
    }
}

/// Decode `input`, mask it, and write the requested outputs.
pub fn run_cutout(
    global: &GlobalOptions,
    cutout: &Cutout,
    input: &Path,
    output: &OutputArgs,
) -> MaskResult<()> {
    let image = image::open(input)?.into_rgba8();
    let result = if global.worker {
        let worker = MaskWorker::spawn()?;
        cutout.apply_on(&worker, image)?
    } else {
        cutout.apply(image)?
    };

    let output_path = output
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(input, "cutout", "png"));
    result.save(&output_path)?;
    println!("Cutout PNG saved to {}", output_path.display());

    if let Some(path) = resolve_export_path(&output.export_mask, input, "mask") {
        result.save_mask(&path)?;
        println!("Mask PNG saved to {}", path.display());
    }

    Ok(())
}

/// Resolve an optional export flag into a concrete path.
pub fn resolve_export_path(
    flag: &Option<Option<PathBuf>>,
    input: &Path,
    suffix: &str,
) -> Option<PathBuf> {
    match flag {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(derive_variant_path(input, suffix, "png")),
        None => None,
    }
}

/// Derive a variant file path by appending a suffix before the extension.
pub fn derive_variant_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut derived = input.to_path_buf();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| suffix.to_string());
    let filename = format!("{}-{}.{}", stem, suffix, extension);
    derived.set_file_name(filename);
    derived
}
