//! Atlas page: one CPU-side RGBA bitmap holding packed glyph bitmaps.
//!
//! Placement is delegated to a [`GuillotinePacker`]; this module owns the
//! pixels. Alpha-only bitmaps (the common case for outline glyphs) are
//! expanded to white + alpha so colour glyphs can share the same page.

use serde::{Deserialize, Serialize};

use crate::glyph::GlyphRect;
use crate::packer::GuillotinePacker;

/// A region within the atlas texture (UV coordinates normalized to [0,1]).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AtlasRegion {
    /// Top-left U coordinate.
    pub u_min: f32,
    /// Top-left V coordinate.
    pub v_min: f32,
    /// Bottom-right U coordinate.
    pub u_max: f32,
    /// Bottom-right V coordinate.
    pub v_max: f32,
}

/// Fixed-size square atlas page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasPage {
    /// Width and height in pixels.
    pub size: u32,
    /// RGBA pixel data (size * size * 4 bytes).
    pub data: Vec<u8>,
    /// Whether data has changed since last GPU upload.
    #[serde(skip)]
    pub dirty: bool,
    packer: GuillotinePacker,
}

impl AtlasPage {
    pub fn new(size: u32) -> Self {
        let pixel_count = (size as usize) * (size as usize) * 4;
        Self {
            size,
            data: vec![0u8; pixel_count],
            dirty: false,
            packer: GuillotinePacker::new(size, size),
        }
    }

    pub(crate) fn from_parts(size: u32, data: Vec<u8>, packer: GuillotinePacker) -> Self {
        Self {
            size,
            data,
            dirty: true,
            packer,
        }
    }

    pub fn packer(&self) -> &GuillotinePacker {
        &self.packer
    }

    pub fn free_rects(&self) -> &[GlyphRect] {
        self.packer.free_rects()
    }

    pub fn used_rects(&self) -> &[GlyphRect] {
        self.packer.used_rects()
    }

    /// Reserve space for a glyph without writing pixels.
    pub fn allocate(&mut self, width: u32, height: u32, padding: u32) -> Option<GlyphRect> {
        self.packer.insert(width, height, padding)
    }

    /// Allocate space and copy the bitmap in one step.
    pub fn insert(
        &mut self,
        width: u32,
        height: u32,
        padding: u32,
        bitmap_data: &[u8],
    ) -> Option<GlyphRect> {
        let rect = self.allocate(width, height, padding)?;
        self.blit_bitmap(&rect, bitmap_data);
        Some(rect)
    }

    /// Reset the page (clear all glyphs).
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.packer.clear();
        self.dirty = true;
    }

    /// Blit bitmap data into the page at the given rect.
    ///
    /// Handles both alpha-only (1 byte/pixel) and RGBA (4 bytes/pixel).
    pub fn blit_bitmap(&mut self, rect: &GlyphRect, bitmap_data: &[u8]) {
        let width = rect.width;
        let height = rect.height;
        let expected_rgba = (width * height * 4) as usize;
        let expected_alpha = (width * height) as usize;

        let is_rgba = bitmap_data.len() >= expected_rgba;
        let is_alpha = bitmap_data.len() >= expected_alpha && !is_rgba;

        for row in 0..height {
            for col in 0..width {
                let dst_x = rect.x + col;
                let dst_y = rect.y + row;
                let dst_idx = ((dst_y * self.size + dst_x) * 4) as usize;

                if dst_idx + 3 >= self.data.len() {
                    continue;
                }

                if is_rgba {
                    let src_idx = ((row * width + col) * 4) as usize;
                    self.data[dst_idx..dst_idx + 4]
                        .copy_from_slice(&bitmap_data[src_idx..src_idx + 4]);
                } else if is_alpha {
                    let src_idx = (row * width + col) as usize;
                    // White glyph with alpha.
                    self.data[dst_idx] = 255;
                    self.data[dst_idx + 1] = 255;
                    self.data[dst_idx + 2] = 255;
                    self.data[dst_idx + 3] = bitmap_data[src_idx];
                }
            }
        }
        self.dirty = true;
    }

    /// Convert a pixel rect, grown by `padding` on every side, to UVs.
    pub fn region(&self, rect: &GlyphRect, padding: f32) -> AtlasRegion {
        let inv = 1.0 / self.size as f32;
        AtlasRegion {
            u_min: (rect.x as f32 - padding) * inv,
            v_min: (rect.y as f32 - padding) * inv,
            u_max: (rect.right() as f32 + padding) * inv,
            v_max: (rect.bottom() as f32 + padding) * inv,
        }
    }
}
