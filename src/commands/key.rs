use cutout::{Cutout, MaskResult};

use crate::cli::{GlobalOptions, KeyCommand};

use super::utils::{load_settings, run_cutout};

/// The main function to run the key command.
pub fn run(global: &GlobalOptions, cmd: KeyCommand) -> MaskResult<()> {
    let mut settings = load_settings(global)?;
    if let Some(target) = cmd.target {
        settings.target_color = target;
    }
    if let Some(tolerance) = cmd.tolerance {
        settings.tolerance = tolerance;
    }
    if let Some(smoothness) = cmd.smoothness {
        settings.smoothness = smoothness;
    }
    cmd.refine.apply_to(&mut settings);

    let cutout = Cutout::new(cmd.mode.into()).with_settings(settings);
    run_cutout(global, &cutout, &cmd.input, &cmd.output)
}
