//! 8-bit RGBA colour used for vertex colours and `<color>` tags.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// RGBA colour, one byte per channel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color32 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color32 {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const RED: Self = Self::rgba(255, 0, 0, 255);
    pub const GREEN: Self = Self::rgba(0, 255, 0, 255);
    pub const BLUE: Self = Self::rgba(0, 0, 255, 255);
    pub const YELLOW: Self = Self::rgba(255, 255, 0, 255);
    pub const ORANGE: Self = Self::rgba(255, 128, 0, 255);
    pub const PURPLE: Self = Self::rgba(160, 32, 240, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a colour from hex digits already parsed into an integer.
    ///
    /// Only 6 (`RRGGBB`) and 8 (`RRGGBBAA`) digit forms are valid.
    pub fn from_hex_digits(value: u32, digits: u8) -> Option<Self> {
        match digits {
            6 => Some(Self::rgba(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
                255,
            )),
            8 => Some(Self::rgba(
                (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            )),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Normalized `[r, g, b, a]` in `[0, 1]`.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_six_digits() {
        let c = Color32::from_hex_digits(0xFF8000, 6).unwrap();
        assert_eq!(c, Color32::rgba(255, 128, 0, 255));
    }

    #[test]
    fn test_from_hex_eight_digits() {
        let c = Color32::from_hex_digits(0x11223344, 8).unwrap();
        assert_eq!(c, Color32::rgba(0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn test_from_hex_rejects_other_lengths() {
        assert!(Color32::from_hex_digits(0xFFF, 3).is_none());
        assert!(Color32::from_hex_digits(0xFFFFF, 5).is_none());
    }

    #[test]
    fn test_color_size() {
        assert_eq!(std::mem::size_of::<Color32>(), 4);
    }
}
