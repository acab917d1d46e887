use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cutout::{Color, MaskSettings, Mode, SeedPoint};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// JSON mask settings file; explicit flags override its values
    #[arg(long, env = "CUTOUT_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,
    /// Run the engine on a background worker thread
    #[arg(long, global = true)]
    pub worker: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clear (or keep) every pixel close to a target color
    Key(KeyCommand),
    /// Clear the region grown from seed points up to a contour color
    Flood(FloodCommand),
}

/// Polarity of the color key.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KeyModeArg {
    Remove,
    Keep,
}

impl From<KeyModeArg> for Mode {
    fn from(value: KeyModeArg) -> Self {
        match value {
            KeyModeArg::Remove => Mode::Remove,
            KeyModeArg::Keep => Mode::Keep,
        }
    }
}

#[derive(Args, Debug)]
pub struct KeyCommand {
    /// Input image path
    pub input: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Whether matching pixels are removed or kept
    #[arg(long, value_enum, default_value_t = KeyModeArg::Remove)]
    pub mode: KeyModeArg,
    /// Color to key on (`#rrggbb` or `r,g,b`)
    #[arg(short, long)]
    pub target: Option<Color>,
    /// Hard cutoff as a percentage of the largest RGB distance
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Soft ramp width as a percentage of the largest RGB distance
    #[arg(long)]
    pub smoothness: Option<f64>,
    #[command(flatten)]
    pub refine: RefineArgs,
}

#[derive(Args, Debug)]
pub struct FloodCommand {
    /// Input image path
    pub input: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Seed point `x,y`; repeat for several seeds
    #[arg(short, long = "seed", value_name = "X,Y")]
    pub seeds: Vec<SeedPoint>,
    /// Color that stops the fill (`#rrggbb` or `r,g,b`)
    #[arg(short, long)]
    pub contour: Option<Color>,
    /// How close to the contour color a pixel must be to stop the fill, in percent
    #[arg(long)]
    pub tolerance: Option<f64>,
    #[command(flatten)]
    pub refine: RefineArgs,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output PNG path (defaults to `<name>-cutout.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Also save the alpha channel as a grayscale PNG
    #[arg(long = "export-mask", value_name = "PATH", num_args = 0..=1)]
    pub export_mask: Option<Option<PathBuf>>,
}

#[derive(Args, Debug)]
pub struct RefineArgs {
    /// Choke radius in pixels
    #[arg(long = "erode", value_name = "RADIUS")]
    pub erosion_radius: Option<u32>,
    /// Box blur radius in pixels for feathering
    #[arg(long = "blur", value_name = "RADIUS")]
    pub blur_radius: Option<u32>,
    /// Highlight pixels within this radius of the cutout edge
    #[arg(long = "edge-paint", value_name = "RADIUS")]
    pub edge_paint_radius: Option<u32>,
    /// Highlight color for edge painting
    #[arg(long = "edge-color")]
    pub edge_color: Option<Color>,
}

impl RefineArgs {
    /// Override the refinement fields that were given on the command line.
    pub fn apply_to(&self, settings: &mut MaskSettings) {
        if let Some(radius) = self.erosion_radius {
            settings.erosion_radius = radius;
        }
        if let Some(radius) = self.blur_radius {
            settings.blur_radius = radius;
        }
        if let Some(radius) = self.edge_paint_radius {
            settings.edge_paint_radius = radius;
        }
        if let Some(color) = self.edge_color {
            settings.edge_color = color;
        }
    }
}
