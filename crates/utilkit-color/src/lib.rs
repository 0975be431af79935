//! # utilkit-color
//!
//! Random color strings for quick styling: `rgb(R,G,B)` or `#` hex.
//!
//! The hex form concatenates each channel's lowercase hex digits **without
//! zero padding**, so a channel value of `5` contributes `5`, not `05`.
//! The result is between 4 and 7 characters long and is not always a valid
//! CSS hex color. Callers that need the 7-character form should use
//! [`Color::to_hex_padded`] explicitly.
//!
//! Randomness comes from `rand`'s thread RNG and is not suitable for
//! anything security related.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Output notation for a generated color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    /// `rgb(R,G,B)` with decimal channels.
    Rgb,
    /// `#` followed by unpadded lowercase hex channels.
    #[default]
    Hex,
}

impl ColorFormat {
    /// Interpret a loose mode selector.
    ///
    /// Only the exact text `rgb` selects [`ColorFormat::Rgb`]; anything
    /// else, including no selector at all, falls back to hex.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some("rgb") => Self::Rgb,
            _ => Self::Hex,
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb => write!(f, "rgb"),
            Self::Hex => write!(f, "hex"),
        }
    }
}

/// An 8-bit-per-channel RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sample each channel independently and uniformly from `0..=255`.
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    /// Like [`Color::random`], drawing from the given RNG.
    pub fn random_with<R: Rng>(rng: &mut R) -> Self {
        Self {
            r: rng.gen_range(0..=255),
            g: rng.gen_range(0..=255),
            b: rng.gen_range(0..=255),
        }
    }

    /// `rgb(R,G,B)`, no spaces.
    pub fn to_rgb_string(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// `#` plus each channel in lowercase hex, unpadded.
    pub fn to_hex_unpadded(&self) -> String {
        format!("#{:x}{:x}{:x}", self.r, self.g, self.b)
    }

    /// `#rrggbb`, always seven characters.
    pub fn to_hex_padded(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Render in the given notation. Hex uses the unpadded form.
    pub fn format(&self, format: ColorFormat) -> String {
        match format {
            ColorFormat::Rgb => self.to_rgb_string(),
            ColorFormat::Hex => self.to_hex_unpadded(),
        }
    }
}

/// A fresh random color string in `format`.
pub fn random_color(format: ColorFormat) -> String {
    render(Color::random(), format)
}

/// A fresh random color string in `format`, drawing from `rng`.
pub fn random_color_with<R: Rng>(rng: &mut R, format: ColorFormat) -> String {
    render(Color::random_with(rng), format)
}

fn render(color: Color, format: ColorFormat) -> String {
    let out = color.format(format);
    trace!(%format, color = %out, "random_color");
    out
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn selector_only_matches_exact_rgb() {
        assert_eq!(ColorFormat::from_selector(Some("rgb")), ColorFormat::Rgb);
        assert_eq!(ColorFormat::from_selector(Some("RGB")), ColorFormat::Hex);
        assert_eq!(ColorFormat::from_selector(Some("hex")), ColorFormat::Hex);
        assert_eq!(ColorFormat::from_selector(Some("")), ColorFormat::Hex);
        assert_eq!(ColorFormat::from_selector(None), ColorFormat::Hex);
    }

    #[test]
    fn rgb_string_has_no_spaces() {
        assert_eq!(Color::new(0, 128, 255).to_rgb_string(), "rgb(0,128,255)");
    }

    #[test]
    fn hex_is_unpadded() {
        assert_eq!(Color::new(5, 0, 15).to_hex_unpadded(), "#50f");
        assert_eq!(Color::new(255, 16, 171).to_hex_unpadded(), "#ff10ab");
    }

    #[test]
    fn padded_hex_is_seven_chars() {
        assert_eq!(Color::new(5, 0, 15).to_hex_padded(), "#05000f");
    }

    #[test]
    fn format_dispatches_on_notation() {
        let c = Color::new(1, 2, 3);
        assert_eq!(c.format(ColorFormat::Rgb), "rgb(1,2,3)");
        assert_eq!(c.format(ColorFormat::Hex), "#123");
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = random_color_with(&mut StdRng::seed_from_u64(7), ColorFormat::Rgb);
        let b = random_color_with(&mut StdRng::seed_from_u64(7), ColorFormat::Rgb);
        assert_eq!(a, b);
    }

    #[test]
    fn format_serde_names() {
        assert_eq!(serde_json::to_string(&ColorFormat::Rgb).unwrap(), "\"rgb\"");
        let parsed: ColorFormat = serde_json::from_str("\"hex\"").unwrap();
        assert_eq!(parsed, ColorFormat::Hex);
    }
}
