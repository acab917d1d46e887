use std::fmt;
use std::str::FromStr;

use crate::color::{Color, MAX_RGB_DISTANCE};
use crate::error::MaskError;

/// Which classifier produces the base alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Mode {
    /// Clear pixels close to the target color.
    #[default]
    Remove,
    /// Keep only pixels close to the target color.
    Keep,
    /// Grow a transparent region from the seed points until the contour color.
    FloodClear,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Mode::Remove => "remove",
            Mode::Keep => "keep",
            Mode::FloodClear => "flood-clear",
        };
        f.write_str(tag)
    }
}

impl FromStr for Mode {
    type Err = MaskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remove" => Ok(Mode::Remove),
            "keep" => Ok(Mode::Keep),
            "flood-clear" | "flood_clear" | "floodclear" | "flood" => Ok(Mode::FloodClear),
            other => Err(MaskError::InvalidMode(other.to_string())),
        }
    }
}

/// A flood seed in pixel coordinates. Fractional values are floored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedPoint {
    pub x: f64,
    pub y: f64,
}

impl SeedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Resolve to an in-bounds pixel coordinate, or `None` if the seed is inert.
    pub fn to_pixel(self, width: u32, height: u32) -> Option<(u32, u32)> {
        let floor_within = |v: f64, limit: u32| {
            if !v.is_finite() {
                return None;
            }
            let v = v.floor();
            (v >= 0.0 && v < f64::from(limit)).then_some(v as u32)
        };
        Some((floor_within(self.x, width)?, floor_within(self.y, height)?))
    }
}

impl From<(u32, u32)> for SeedPoint {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(f64::from(x), f64::from(y))
    }
}

impl From<(f64, f64)> for SeedPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl FromStr for SeedPoint {
    type Err = String;

    /// Parses `x,y`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (x, y) = value
            .split_once(',')
            .ok_or_else(|| format!("seed must look like `x,y`, got `{value}`"))?;
        let coord = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| format!("seed coordinate must be numeric, got `{s}`"))
        };
        Ok(Self::new(coord(x)?, coord(y)?))
    }
}

/// Options describing how the alpha channel is computed and refined.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct MaskSettings {
    /// Color matched by the `Remove`/`Keep` classifier.
    pub target_color: Color,
    /// Color that stops a flood fill.
    pub contour_color: Color,
    /// Hard cutoff, 0-100 percent of `max_rgb_distance`.
    pub tolerance: f64,
    /// Width of the soft ramp past the cutoff, 0-100 percent of `max_rgb_distance`.
    pub smoothness: f64,
    /// Choke radius in pixels; 0 disables erosion.
    pub erosion_radius: u32,
    /// Box blur radius in pixels; 0 disables feathering.
    pub blur_radius: u32,
    /// Edge highlight radius in pixels; 0 disables edge painting.
    pub edge_paint_radius: u32,
    /// Color painted over pixels near the mask boundary.
    pub edge_color: Color,
    /// Distance that 100% tolerance corresponds to.
    pub max_rgb_distance: f64,
    /// Flood fill seeds; only used by [`Mode::FloodClear`].
    pub flood_seed_points: Vec<SeedPoint>,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            target_color: Color::WHITE,
            contour_color: Color::BLACK,
            tolerance: 10.0,
            smoothness: 0.0,
            erosion_radius: 0,
            blur_radius: 0,
            edge_paint_radius: 0,
            edge_color: Color::MAGENTA,
            max_rgb_distance: MAX_RGB_DISTANCE,
            flood_seed_points: Vec::new(),
        }
    }
}

impl MaskSettings {
    /// Set the color matched by the threshold classifier.
    pub fn with_target_color(mut self, color: impl Into<Color>) -> Self {
        self.target_color = color.into();
        self
    }

    /// Set the color that bounds a flood fill.
    pub fn with_contour_color(mut self, color: impl Into<Color>) -> Self {
        self.contour_color = color.into();
        self
    }

    /// Set the tolerance percentage.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the smoothness percentage.
    pub fn with_smoothness(mut self, smoothness: f64) -> Self {
        self.smoothness = smoothness;
        self
    }

    /// Set the erosion radius.
    pub fn with_erosion_radius(mut self, radius: u32) -> Self {
        self.erosion_radius = radius;
        self
    }

    /// Set the blur radius.
    pub fn with_blur_radius(mut self, radius: u32) -> Self {
        self.blur_radius = radius;
        self
    }

    /// Set the edge highlight radius and color.
    pub fn with_edge_paint(mut self, radius: u32, color: impl Into<Color>) -> Self {
        self.edge_paint_radius = radius;
        self.edge_color = color.into();
        self
    }

    /// Override the normalization distance.
    pub fn with_max_rgb_distance(mut self, max_distance: f64) -> Self {
        self.max_rgb_distance = max_distance;
        self
    }

    /// Append a flood seed.
    pub fn with_seed(mut self, seed: impl Into<SeedPoint>) -> Self {
        self.flood_seed_points.push(seed.into());
        self
    }

    /// Check the numeric ranges the classifiers rely on.
    pub fn validate(&self) -> Result<(), MaskError> {
        let percent = |name: &str, value: f64| {
            if value.is_finite() && (0.0..=100.0).contains(&value) {
                Ok(())
            } else {
                Err(MaskError::InvalidSettings(format!(
                    "{name} must be within 0-100, got {value}"
                )))
            }
        };
        percent("tolerance", self.tolerance)?;
        percent("smoothness", self.smoothness)?;
        if !self.max_rgb_distance.is_finite() || self.max_rgb_distance < 0.0 {
            return Err(MaskError::InvalidSettings(format!(
                "max RGB distance must be finite and non-negative, got {}",
                self.max_rgb_distance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod mode {
        use super::*;

        #[test]
        fn parses_known_tags() {
            assert_eq!("remove".parse::<Mode>().unwrap(), Mode::Remove);
            assert_eq!("KEEP".parse::<Mode>().unwrap(), Mode::Keep);
            assert_eq!("flood-clear".parse::<Mode>().unwrap(), Mode::FloodClear);
            assert_eq!("flood".parse::<Mode>().unwrap(), Mode::FloodClear);
        }

        #[test]
        fn unknown_tag_is_invalid_mode() {
            let err = "lasso".parse::<Mode>().unwrap_err();
            assert!(matches!(err, MaskError::InvalidMode(tag) if tag == "lasso"));
        }

        #[test]
        fn display_parses_back() {
            for mode in [Mode::Remove, Mode::Keep, Mode::FloodClear] {
                assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
            }
        }
    }

    mod seed_point {
        use super::*;

        #[test]
        fn fractional_coordinates_are_floored() {
            assert_eq!(SeedPoint::new(1.9, 0.2).to_pixel(4, 4), Some((1, 0)));
        }

        #[test]
        fn out_of_bounds_is_inert() {
            assert_eq!(SeedPoint::new(4.0, 0.0).to_pixel(4, 4), None);
            assert_eq!(SeedPoint::new(0.0, 4.5).to_pixel(4, 4), None);
            assert_eq!(SeedPoint::new(-0.5, 1.0).to_pixel(4, 4), None);
        }

        #[test]
        fn non_finite_is_inert() {
            assert_eq!(SeedPoint::new(f64::NAN, 0.0).to_pixel(4, 4), None);
            assert_eq!(SeedPoint::new(0.0, f64::INFINITY).to_pixel(4, 4), None);
        }

        #[test]
        fn parses_pairs() {
            assert_eq!("3, 4.5".parse::<SeedPoint>().unwrap(), SeedPoint::new(3.0, 4.5));
            assert!("3".parse::<SeedPoint>().is_err());
            assert!("a,b".parse::<SeedPoint>().is_err());
        }
    }

    mod validate {
        use super::*;

        #[test]
        fn defaults_are_valid() {
            assert!(MaskSettings::default().validate().is_ok());
        }

        #[test]
        fn percentages_out_of_range_rejected() {
            let high = MaskSettings::default().with_tolerance(100.5);
            assert!(matches!(high.validate(), Err(MaskError::InvalidSettings(_))));

            let negative = MaskSettings::default().with_smoothness(-1.0);
            assert!(matches!(negative.validate(), Err(MaskError::InvalidSettings(_))));

            let nan = MaskSettings::default().with_tolerance(f64::NAN);
            assert!(matches!(nan.validate(), Err(MaskError::InvalidSettings(_))));
        }

        #[test]
        fn bounds_are_inclusive() {
            let settings = MaskSettings::default().with_tolerance(0.0).with_smoothness(100.0);
            assert!(settings.validate().is_ok());
        }

        #[test]
        fn negative_max_distance_rejected() {
            let settings = MaskSettings::default().with_max_rgb_distance(-1.0);
            assert!(matches!(settings.validate(), Err(MaskError::InvalidSettings(_))));
        }
    }
}
