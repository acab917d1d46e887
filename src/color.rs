use std::fmt;
use std::str::FromStr;

use image::Rgb;

/// Length of the RGB cube diagonal, `sqrt(3 * 255^2)`.
///
/// Tolerance and smoothness percentages are fractions of this distance.
pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const MAGENTA: Color = Color::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance to `other` in RGB space.
    pub fn distance(self, other: Color) -> f64 {
        distance(self, other)
    }
}

/// Euclidean distance between two colors in RGB space.
///
/// Ranges from `0.0` for identical colors to [`MAX_RGB_DISTANCE`] for black vs. white.
pub fn distance(a: Color, b: Color) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Convert a 0-100 percentage into an absolute RGB distance.
pub fn percent_of(percent: f64, max_distance: f64) -> f64 {
    (percent / 100.0) * max_distance
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b]
    }
}

impl From<Rgb<u8>> for Color {
    fn from(Rgb(channels): Rgb<u8>) -> Self {
        channels.into()
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb(color.into())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#rrggbb`, `rrggbb`, or `r,g,b`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.contains(',') {
            let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
            let [r, g, b] = parts.as_slice() else {
                return Err(format!("expected three comma separated channels, got `{value}`"));
            };
            let channel = |s: &str| {
                s.parse::<u8>()
                    .map_err(|_| format!("color channel must be 0-255, got `{s}`"))
            };
            return Ok(Color::new(channel(r)?, channel(g)?, channel(b)?));
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected a color like #rrggbb or r,g,b, got `{value}`"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| format!("invalid hex color `{value}`"))
        };
        Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}
