use crate::foundation::error::{SceneError, SceneResult};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Linear RGB color with channels in `[0, 1]`.
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Pure red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Pure green.
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Pure blue.
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    /// Yellow.
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    /// Cyan.
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    /// Magenta.
    pub const MAGENTA: Self = Self::rgb(1.0, 0.0, 1.0);
    /// Mid gray.
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);

    const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color, rejecting channels outside `[0, 1]` or non-finite.
    pub fn new(r: f32, g: f32, b: f32) -> SceneResult<Self> {
        for (name, v) in [("r", r), ("g", g), ("b", b)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(SceneError::out_of_range(format!(
                    "color channel {name}={v} must be in [0, 1]"
                )));
            }
        }
        Ok(Self::rgb(r, g, b))
    }

    /// Build a color from 8-bit channels.
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> SceneResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(SceneError::validation(format!(
                "color hex '{hex}' must look like #rrggbb"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| SceneError::validation(format!("color hex '{hex}' is not hexadecimal")))
        };
        Ok(Self::from_bytes(channel(0)?, channel(2)?, channel(4)?))
    }

    /// 8-bit channels, rounded.
    pub fn to_bytes(self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// `#rrggbb` form used by the viewer for CSS-style colors.
    pub fn to_html_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Channels as an array.
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
