use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors from parsing `#rrggbb` color strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseColorError {
    #[error("color {0:?} must start with '#'")]
    MissingHash(String),
    #[error("color {0:?} must have exactly six hex digits")]
    BadLength(String),
    #[error("color {0:?} contains a non-hex digit")]
    BadDigit(String),
}

/// An sRGB color with components in `0.0..=1.0`.
///
/// Serialized as a `#rrggbb` string so config files read like the panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_srgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError::MissingHash(s.to_string()))?;
        if digits.len() != 6 {
            return Err(ParseColorError::BadLength(s.to_string()));
        }
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| ParseColorError::BadDigit(s.to_string()))?;
        Ok(Self::from_srgb8([
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ]))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_srgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Linear-light components for shading.
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}
