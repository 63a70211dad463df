//! Guillotine rectangle packer for atlas pages.
//!
//! Free space is a list of disjoint rectangles. A request is placed in the
//! free rectangle that leaves the smallest short-side remainder
//! (best-short-side-fit, ties broken by the long side). The chosen
//! rectangle is split along its shorter leftover axis into at most two
//! remainders (right, bottom); zero-area remainders are dropped and
//! rectangles are never merged, so the free and used lists always
//! partition the page exactly.

use serde::{Deserialize, Serialize};

use crate::glyph::GlyphRect;

/// Packing state for one atlas page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuillotinePacker {
    width: u32,
    height: u32,
    free: Vec<GlyphRect>,
    used: Vec<GlyphRect>,
}

impl GuillotinePacker {
    pub fn new(width: u32, height: u32) -> Self {
        let free = if width > 0 && height > 0 {
            vec![GlyphRect::new(0, 0, width, height)]
        } else {
            Vec::new()
        };
        Self {
            width,
            height,
            free,
            used: Vec::new(),
        }
    }

    /// Restore a packer from persisted rectangle lists.
    pub fn from_parts(width: u32, height: u32, free: Vec<GlyphRect>, used: Vec<GlyphRect>) -> Self {
        Self {
            width,
            height,
            free,
            used,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn free_rects(&self) -> &[GlyphRect] {
        &self.free
    }

    pub fn used_rects(&self) -> &[GlyphRect] {
        &self.used
    }

    /// Place a `width × height` glyph with `padding` pixels on every side.
    ///
    /// Returns the glyph rectangle (excluding padding); the padded
    /// rectangle is recorded in the used list.
    pub fn insert(&mut self, width: u32, height: u32, padding: u32) -> Option<GlyphRect> {
        let padded_w = width + padding * 2;
        let padded_h = height + padding * 2;
        if padded_w == 0 || padded_h == 0 {
            return None;
        }

        let best = self.find_best(padded_w, padded_h)?;
        let chosen = self.free.swap_remove(best);
        let placed = GlyphRect::new(chosen.x, chosen.y, padded_w, padded_h);
        self.split(&chosen, &placed);
        self.used.push(placed);

        Some(GlyphRect::new(
            placed.x + padding,
            placed.y + padding,
            width,
            height,
        ))
    }

    /// Whether a glyph of this size could be placed without mutating state.
    pub fn can_fit(&self, width: u32, height: u32, padding: u32) -> bool {
        self.find_best(width + padding * 2, height + padding * 2).is_some()
    }

    /// Sum of free area, in pixels.
    pub fn free_area(&self) -> u64 {
        self.free.iter().map(GlyphRect::area).sum()
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    /// First free or used rectangle that extends past the page.
    pub fn rect_outside_page(&self) -> Option<GlyphRect> {
        let page = GlyphRect::new(0, 0, self.width, self.height);
        self.free
            .iter()
            .chain(&self.used)
            .copied()
            .find(|rect| !page.contains(rect))
    }

    /// Whether the free and used rectangles tile the page with no overlap.
    pub fn is_partition(&self) -> bool {
        let page = GlyphRect::new(0, 0, self.width, self.height);
        let all: Vec<GlyphRect> = self.free.iter().chain(&self.used).copied().collect();
        let total: u64 = all.iter().map(GlyphRect::area).sum();
        total == page.area()
            && all.iter().enumerate().all(|(i, a)| {
                page.contains(a) && all[i + 1..].iter().all(|b| !a.intersects(b))
            })
    }

    fn find_best(&self, w: u32, h: u32) -> Option<usize> {
        let mut best: Option<(usize, u32, u32)> = None;
        for (i, free) in self.free.iter().enumerate() {
            if w > free.width || h > free.height {
                continue;
            }
            let leftover_w = free.width - w;
            let leftover_h = free.height - h;
            let short = leftover_w.min(leftover_h);
            let long = leftover_w.max(leftover_h);
            let better = match best {
                None => true,
                Some((_, best_short, best_long)) => {
                    short < best_short || (short == best_short && long < best_long)
                }
            };
            if better {
                best = Some((i, short, long));
            }
        }
        best.map(|(i, _, _)| i)
    }

    fn split(&mut self, free: &GlyphRect, placed: &GlyphRect) {
        let leftover_w = free.width - placed.width;
        let leftover_h = free.height - placed.height;

        let (right, bottom) = if leftover_w < leftover_h {
            // Horizontal cut: the bottom remainder spans the full width.
            (
                GlyphRect::new(placed.right(), free.y, leftover_w, placed.height),
                GlyphRect::new(free.x, placed.bottom(), free.width, leftover_h),
            )
        } else {
            // Vertical cut: the right remainder spans the full height.
            (
                GlyphRect::new(placed.right(), free.y, leftover_w, free.height),
                GlyphRect::new(free.x, placed.bottom(), placed.width, leftover_h),
            )
        };

        for rect in [right, bottom] {
            if !rect.is_empty() {
                self.free.push(rect);
            }
        }
    }
}
