use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Color given to tasks created without one.
pub const DEFAULT_TASK_COLOR: &str = "#3b82f6";

/// An integer RGB triple, each channel in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A hex color, kept in lowercase `#rrggbb` form.
///
/// Parsing accepts the 3-digit shorthand (`#abc` becomes `#aabbcc`) and an
/// optional leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> Rgb {
        // Validated on construction, so the slices are always hex.
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        Rgb {
            r: channel(1),
            g: channel(3),
            b: channel(5),
        }
    }
}

impl Default for HexColor {
    fn default() -> Self {
        HexColor(DEFAULT_TASK_COLOR.to_string())
    }
}

impl FromStr for HexColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clean = s.trim().trim_start_matches('#');
        if !clean.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidColor(s.to_string()));
        }
        let full = match clean.len() {
            3 => clean.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => clean.to_string(),
            _ => return Err(ValidationError::InvalidColor(s.to_string())),
        };
        Ok(HexColor(format!("#{}", full.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for HexColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> String {
        c.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Linearly interpolates each channel between `low` and `high`.
///
/// `ratio` is clamped to `[0, 1]`; channels are rounded half away from zero,
/// so `mix_color(#000, #fff, 0.5)` is `rgb(128, 128, 128)`.
pub fn mix_color(low: &HexColor, high: &HexColor, ratio: f64) -> Rgb {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let a = low.rgb();
    let b = high.rgb();
    let lerp = |x: u8, y: u8| {
        let v = x as f64 + (y as f64 - x as f64) * ratio;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgb {
        r: lerp(a.r, b.r),
        g: lerp(a.g, b.g),
        b: lerp(a.b, b.b),
    }
}
