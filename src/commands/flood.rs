use cutout::{Cutout, MaskResult, Mode};

use crate::cli::{FloodCommand, GlobalOptions};

use super::utils::{load_settings, run_cutout};

/// The main function to run the flood command.
pub fn run(global: &GlobalOptions, cmd: FloodCommand) -> MaskResult<()> {
    let mut settings = load_settings(global)?;
    if !cmd.seeds.is_empty() {
        settings.flood_seed_points = cmd.seeds;
    }
    if let Some(contour) = cmd.contour {
        settings.contour_color = contour;
    }
    if let Some(tolerance) = cmd.tolerance {
        settings.tolerance = tolerance;
    }
    cmd.refine.apply_to(&mut settings);

    if settings.flood_seed_points.is_empty() {
        log::warn!("no seed points given; the image will stay fully opaque");
    }

    let cutout = Cutout::new(Mode::FloodClear).with_settings(settings);
    run_cutout(global, &cutout, &cmd.input, &cmd.output)
}
