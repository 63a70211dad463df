//! Fixed-capacity style stacks mutated by markup tags.
//!
//! Every stack is a `Copy` value so the complete [`StyleState`] can be
//! snapshot at a line-break candidate and restored by assignment.

use crate::color::Color32;
use crate::glyph::{FontStyles, FontWeight};

/// Maximum nesting depth per attribute, floor included. Deeper pushes are
/// counted but not stored, so their matching pops leave the stack alone.
pub const STACK_DEPTH: usize = 16;

/// Push/pop stack with a floor value that is never removed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TagStack<T: Copy, const N: usize = STACK_DEPTH> {
    items: [T; N],
    len: usize,
    overflow: usize,
}

impl<T: Copy, const N: usize> TagStack<T, N> {
    /// A stack whose floor is `default`.
    pub fn new(default: T) -> Self {
        Self {
            items: [default; N],
            len: 1,
            overflow: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.len < N {
            self.items[self.len] = value;
            self.len += 1;
        } else {
            self.overflow += 1;
            log::debug!("Tag stack full at depth {}; ignoring push", N);
        }
    }

    /// Pop the top value, never removing the floor. Returns the new top.
    pub fn pop(&mut self) -> T {
        if self.overflow > 0 {
            self.overflow -= 1;
        } else if self.len > 1 {
            self.len -= 1;
        }
        self.current()
    }

    pub fn current(&self) -> T {
        self.items[self.len - 1]
    }

    pub fn floor(&self) -> T {
        self.items[0]
    }

    pub fn depth(&self) -> usize {
        self.len - 1
    }

    pub fn reset(&mut self) {
        self.len = 1;
        self.overflow = 0;
    }
}

/// Reference counts for the basic on/off styles.
///
/// `</b>` only clears bold once every open `<b>` has been closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleCounts {
    bold: u8,
    italic: u8,
    lowercase: u8,
    uppercase: u8,
    superscript: u8,
    subscript: u8,
    no_break: u8,
}

impl StyleCounts {
    fn slot(&mut self, style: FontStyles) -> Option<&mut u8> {
        let slot = match style {
            s if s == FontStyles::BOLD => &mut self.bold,
            s if s == FontStyles::ITALIC => &mut self.italic,
            s if s == FontStyles::LOWERCASE => &mut self.lowercase,
            s if s == FontStyles::UPPERCASE => &mut self.uppercase,
            s if s == FontStyles::SUPERSCRIPT => &mut self.superscript,
            s if s == FontStyles::SUBSCRIPT => &mut self.subscript,
            s if s == FontStyles::NO_BREAK => &mut self.no_break,
            _ => return None,
        };
        Some(slot)
    }

    /// Open one level of `style`; returns the new count.
    pub fn add(&mut self, style: FontStyles) -> u8 {
        match self.slot(style) {
            Some(count) => {
                *count = count.saturating_add(1);
                *count
            }
            None => 0,
        }
    }

    /// Close one level of `style`; returns the remaining count.
    pub fn remove(&mut self, style: FontStyles) -> u8 {
        match self.slot(style) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        }
    }
}

/// All style attributes that markup can change, as one snapshot-able value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleState {
    /// Size that relative (`+N`, `%`, `em`) size tags are measured against.
    pub base_size: f32,
    pub size: TagStack<f32>,
    pub color: TagStack<Color32>,
    pub italic_angle: TagStack<i16>,
    pub baseline_offset: TagStack<f32>,
    pub char_spacing: TagStack<f32>,
    pub weight: TagStack<FontWeight>,
    pub counts: StyleCounts,
    /// Effective styles after reference counting.
    pub styles: FontStyles,
    /// Styles set by the text object itself; closing tags cannot clear them.
    pub initial_styles: FontStyles,
    /// Inside `<noparse>`: only `</noparse>` is recognized.
    pub no_parse: bool,
}

impl StyleState {
    pub fn new(
        size: f32,
        color: Color32,
        styles: FontStyles,
        weight: FontWeight,
        italic_angle: i16,
    ) -> Self {
        Self {
            base_size: size,
            size: TagStack::new(size),
            color: TagStack::new(color),
            italic_angle: TagStack::new(italic_angle),
            baseline_offset: TagStack::new(0.0),
            char_spacing: TagStack::new(0.0),
            weight: TagStack::new(weight),
            counts: StyleCounts::default(),
            styles,
            initial_styles: styles,
            no_parse: false,
        }
    }

    pub fn has(&self, style: FontStyles) -> bool {
        self.styles.contains(style)
    }

    pub fn open_style(&mut self, style: FontStyles) {
        self.counts.add(style);
        self.styles.insert(style);
    }

    pub fn close_style(&mut self, style: FontStyles) {
        if self.initial_styles.contains(style) {
            return;
        }
        if self.counts.remove(style) == 0 {
            self.styles.remove(style);
        }
    }

    /// Effective weight: bold without an explicit weight means `Bold`.
    pub fn effective_weight(&self) -> FontWeight {
        let weight = self.weight.current();
        if self.has(FontStyles::BOLD) && weight < FontWeight::Bold {
            FontWeight::Bold
        } else {
            weight
        }
    }
}
