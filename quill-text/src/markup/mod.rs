//! Inline markup tag scanner.
//!
//! A tag runs from `<` to the next `>` and is at most [`MAX_TAG_LENGTH`]
//! code points long. Scanning is single-pass and tolerant: anything the
//! scanner cannot understand (unknown name, bad number, odd hex length,
//! missing terminator) makes [`validate_tag`] return `None` and the
//! caller renders the `<` as literal text. Style changes are applied to a
//! [`StyleState`] only after the whole tag validated, so a rejected tag
//! never leaves partial state behind.
//!
//! Tag and keyword names are compared by hash ([`tag_hash`]), computed
//! case-insensitively on the fly while scanning.

mod stack;

pub use stack::{StyleCounts, StyleState, TagStack, STACK_DEPTH};

use crate::color::Color32;
use crate::glyph::{FontStyles, FontWeight};

/// Longest tag, in code points, including the delimiters.
pub const MAX_TAG_LENGTH: usize = 128;

/// Largest magnitude accepted for a numeric attribute.
pub const MAX_NUMERIC_VALUE: f32 = 32767.0;

const MAX_ATTRIBUTES: usize = 4;

/// Case-insensitive DJB-style hash used for tag names and keywords.
pub const fn tag_hash(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash_step(hash, bytes[i].to_ascii_uppercase() as u32);
        i += 1;
    }
    hash
}

const fn hash_step(hash: u32, unicode: u32) -> u32 {
    (hash << 5).wrapping_add(hash) ^ unicode
}

fn to_upper_ascii(unicode: u32) -> u32 {
    if (b'a' as u32..=b'z' as u32).contains(&unicode) {
        unicode - 32
    } else {
        unicode
    }
}

mod names {
    use super::tag_hash;

    pub const BOLD: u32 = tag_hash("b");
    pub const ITALIC: u32 = tag_hash("i");
    pub const SIZE: u32 = tag_hash("size");
    pub const COLOR: u32 = tag_hash("color");
    pub const ALPHA: u32 = tag_hash("alpha");
    pub const VOFFSET: u32 = tag_hash("voffset");
    pub const SUP: u32 = tag_hash("sup");
    pub const SUB: u32 = tag_hash("sub");
    pub const CSPACE: u32 = tag_hash("cspace");
    pub const FONT_WEIGHT: u32 = tag_hash("font-weight");
    pub const BR: u32 = tag_hash("br");
    pub const NOBR: u32 = tag_hash("nobr");
    pub const LOWERCASE: u32 = tag_hash("lowercase");
    pub const UPPERCASE: u32 = tag_hash("uppercase");
    pub const NOPARSE: u32 = tag_hash("noparse");
    pub const ANGLE: u32 = tag_hash("angle");

    pub const RED: u32 = tag_hash("red");
    pub const GREEN: u32 = tag_hash("green");
    pub const BLUE: u32 = tag_hash("blue");
    pub const WHITE: u32 = tag_hash("white");
    pub const BLACK: u32 = tag_hash("black");
    pub const YELLOW: u32 = tag_hash("yellow");
    pub const ORANGE: u32 = tag_hash("orange");
    pub const PURPLE: u32 = tag_hash("purple");
}

/// Unit suffix on a numeric value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagUnit {
    Pixels,
    Percent,
    Em,
}

/// A typed attribute value, sniffed from its first character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TagValue {
    None,
    Numeric {
        value: f32,
        unit: TagUnit,
        /// Written with an explicit `+` or `-`.
        relative: bool,
    },
    Hex {
        value: u32,
        digits: u8,
    },
    /// Quoted or bare string, kept only as its hash.
    Keyword(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TagAttribute {
    name_hash: u32,
    value: TagValue,
}

/// Result of scanning one tag, before it is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParsedTag {
    /// Index of the closing `>`.
    pub end: usize,
    pub name_hash: u32,
    pub closing: bool,
    pub value: TagValue,
    attributes: [TagAttribute; MAX_ATTRIBUTES],
    attribute_count: usize,
}

impl ParsedTag {
    fn attribute(&self, name_hash: u32) -> Option<TagValue> {
        self.attributes[..self.attribute_count]
            .iter()
            .find(|attr| attr.name_hash == name_hash)
            .map(|attr| attr.value)
    }
}

/// Side effect a validated tag has on the layout pass beyond style state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagEffect {
    /// Only the style state changed.
    Style,
    /// `<br>`: break the line here.
    LineBreak,
}

/// A tag that validated and was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagMatch {
    /// Index of the closing `>`; layout resumes at `end + 1`.
    pub end: usize,
    pub effect: TagEffect,
}

/// Validate the tag starting at `text[start]` (which must be `<`) and
/// apply its style mutation. `None` means "render the `<` literally".
pub fn validate_tag(text: &[u32], start: usize, style: &mut StyleState) -> Option<TagMatch> {
    let tag = parse_tag(text, start)?;
    if style.no_parse && !(tag.closing && tag.name_hash == names::NOPARSE) {
        return None;
    }
    let effect = apply_tag(&tag, style)?;
    Some(TagMatch { end: tag.end, effect })
}

// ── Scanning ────────────────────────────────────────────────────────

/// Scan a tag without applying it.
pub fn parse_tag(text: &[u32], start: usize) -> Option<ParsedTag> {
    if text.get(start) != Some(&('<' as u32)) {
        return None;
    }
    let limit = text.len().min(start + MAX_TAG_LENGTH);
    let mut i = start + 1;

    let closing = text.get(i) == Some(&('/' as u32));
    if closing {
        i += 1;
    }

    let mut tag = ParsedTag {
        end: 0,
        name_hash: 0,
        closing,
        value: TagValue::None,
        attributes: [TagAttribute {
            name_hash: 0,
            value: TagValue::None,
        }; MAX_ATTRIBUTES],
        attribute_count: 0,
    };

    // `<#RRGGBB>` shorthand for `<color=#RRGGBB>`.
    if !closing && text.get(i) == Some(&('#' as u32)) {
        let (value, next) = scan_value(text, i, limit)?;
        if text.get(next) != Some(&('>' as u32)) {
            return None;
        }
        tag.name_hash = names::COLOR;
        tag.value = value;
        tag.end = next;
        return Some(tag);
    }

    let (name_hash, next) = scan_name(text, i, limit)?;
    tag.name_hash = name_hash;
    i = next;

    if text.get(i) == Some(&('=' as u32)) {
        let (value, next) = scan_value(text, i + 1, limit)?;
        tag.value = value;
        i = next;
    }

    loop {
        while i < limit && text[i] == ' ' as u32 {
            i += 1;
        }
        if i >= limit {
            return None;
        }
        if text[i] == '>' as u32 {
            tag.end = i;
            return Some(tag);
        }
        let (attr_name, next) = scan_name(text, i, limit)?;
        if text.get(next) != Some(&('=' as u32)) {
            return None;
        }
        let (value, next) = scan_value(text, next + 1, limit)?;
        if tag.attribute_count == MAX_ATTRIBUTES {
            return None;
        }
        tag.attributes[tag.attribute_count] = TagAttribute {
            name_hash: attr_name,
            value,
        };
        tag.attribute_count += 1;
        i = next;
    }
}

fn is_name_char(unicode: u32) -> bool {
    char::from_u32(unicode).is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Hash a run of name characters. Empty names are rejected.
fn scan_name(text: &[u32], start: usize, limit: usize) -> Option<(u32, usize)> {
    let mut hash = 0;
    let mut i = start;
    while i < limit && is_name_char(text[i]) {
        hash = hash_step(hash, to_upper_ascii(text[i]));
        i += 1;
    }
    (i > start).then_some((hash, i))
}

fn scan_value(text: &[u32], start: usize, limit: usize) -> Option<(TagValue, usize)> {
    let first = char::from_u32(*text.get(start)?)?;
    match first {
        '0'..='9' | '+' | '-' | '.' => scan_numeric(text, start, limit),
        '#' => scan_hex(text, start + 1, limit),
        '"' => {
            let mut hash = 0;
            let mut i = start + 1;
            while i < limit && text[i] != '"' as u32 {
                hash = hash_step(hash, to_upper_ascii(text[i]));
                i += 1;
            }
            if i >= limit {
                return None;
            }
            Some((TagValue::Keyword(hash), i + 1))
        }
        _ => {
            let mut hash = 0;
            let mut i = start;
            while i < limit && text[i] != ' ' as u32 && text[i] != '>' as u32 {
                if text[i] == '<' as u32 {
                    return None;
                }
                hash = hash_step(hash, to_upper_ascii(text[i]));
                i += 1;
            }
            Some((TagValue::Keyword(hash), i))
        }
    }
}

fn scan_hex(text: &[u32], start: usize, limit: usize) -> Option<(TagValue, usize)> {
    let mut value: u32 = 0;
    let mut digits: u8 = 0;
    let mut i = start;
    while i < limit {
        let Some(digit) = char::from_u32(text[i]).and_then(|c| c.to_digit(16)) else {
            break;
        };
        if digits == 8 {
            return None;
        }
        value = (value << 4) | digit;
        digits += 1;
        i += 1;
    }
    if digits == 0 {
        return None;
    }
    Some((TagValue::Hex { value, digits }, i))
}

fn scan_numeric(text: &[u32], start: usize, limit: usize) -> Option<(TagValue, usize)> {
    let mut end = start;
    while end < limit {
        let c = text[end];
        let numeric = char::from_u32(c).is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'));
        if !numeric {
            break;
        }
        end += 1;
    }
    let value = parse_numeric(&text[start..end])?;
    let relative = matches!(char::from_u32(text[start]), Some('+' | '-'));

    let (unit, next) = if text.get(end) == Some(&('%' as u32)) {
        (TagUnit::Percent, end + 1)
    } else if end + 1 < limit
        && to_upper_ascii(text[end]) == 'E' as u32
        && to_upper_ascii(text[end + 1]) == 'M' as u32
    {
        (TagUnit::Em, end + 2)
    } else if end + 1 < limit
        && to_upper_ascii(text[end]) == 'P' as u32
        && to_upper_ascii(text[end + 1]) == 'X' as u32
    {
        (TagUnit::Pixels, end + 2)
    } else {
        (TagUnit::Pixels, end)
    };

    // Anything but a separator after the number is malformed.
    match text.get(next).and_then(|&c| char::from_u32(c)) {
        Some(' ' | '>') => Some((
            TagValue::Numeric {
                value,
                unit,
                relative,
            },
            next,
        )),
        _ => None,
    }
}

/// Parse `[+|-]digits[.digits]`.
///
/// Returns `None` (the rejection signal) for empty input, a misplaced
/// sign, more than one `.`, no digits, or a magnitude above
/// [`MAX_NUMERIC_VALUE`].
pub fn parse_numeric(chars: &[u32]) -> Option<f32> {
    let mut sign = 1.0f32;
    let mut integer = 0.0f64;
    let mut fraction = 0.0f64;
    let mut divisor = 1.0f64;
    let mut seen_dot = false;
    let mut seen_digit = false;

    for (i, &unicode) in chars.iter().enumerate() {
        match char::from_u32(unicode)? {
            '+' if i == 0 => {}
            '-' if i == 0 => sign = -1.0,
            '.' if !seen_dot => seen_dot = true,
            c @ '0'..='9' => {
                let digit = c as u32 - '0' as u32;
                seen_digit = true;
                if seen_dot {
                    divisor *= 10.0;
                    fraction += digit as f64 / divisor;
                } else {
                    integer = integer * 10.0 + digit as f64;
                    if integer > MAX_NUMERIC_VALUE as f64 {
                        return None;
                    }
                }
            }
            _ => return None,
        }
    }

    if !seen_digit {
        return None;
    }
    let value = (integer + fraction) as f32;
    if value > MAX_NUMERIC_VALUE {
        return None;
    }
    Some(sign * value)
}

// ── Application ─────────────────────────────────────────────────────

fn named_color(hash: u32) -> Option<Color32> {
    Some(match hash {
        names::RED => Color32::RED,
        names::GREEN => Color32::GREEN,
        names::BLUE => Color32::BLUE,
        names::WHITE => Color32::WHITE,
        names::BLACK => Color32::BLACK,
        names::YELLOW => Color32::YELLOW,
        names::ORANGE => Color32::ORANGE,
        names::PURPLE => Color32::PURPLE,
        _ => return None,
    })
}

/// Resolve a numeric length against the current size.
fn length(value: TagValue, style: &StyleState) -> Option<f32> {
    match value {
        TagValue::Numeric { value, unit, .. } => Some(match unit {
            TagUnit::Pixels => value,
            TagUnit::Em => value * style.size.current(),
            TagUnit::Percent => value * style.size.current() / 100.0,
        }),
        _ => None,
    }
}

fn apply_tag(tag: &ParsedTag, style: &mut StyleState) -> Option<TagEffect> {
    use names::*;

    if tag.closing {
        match tag.name_hash {
            BOLD => style.close_style(FontStyles::BOLD),
            ITALIC => {
                style.close_style(FontStyles::ITALIC);
                style.italic_angle.pop();
            }
            SIZE => {
                style.size.pop();
            }
            COLOR | ALPHA => {
                style.color.pop();
            }
            VOFFSET => {
                style.baseline_offset.pop();
            }
            SUP => style.close_style(FontStyles::SUPERSCRIPT),
            SUB => style.close_style(FontStyles::SUBSCRIPT),
            CSPACE => {
                style.char_spacing.pop();
            }
            FONT_WEIGHT => {
                style.weight.pop();
            }
            NOBR => style.close_style(FontStyles::NO_BREAK),
            LOWERCASE => style.close_style(FontStyles::LOWERCASE),
            UPPERCASE => style.close_style(FontStyles::UPPERCASE),
            NOPARSE => style.no_parse = false,
            _ => return None,
        }
        return Some(TagEffect::Style);
    }

    match tag.name_hash {
        BOLD => style.open_style(FontStyles::BOLD),
        ITALIC => {
            let angle = match tag.attribute(ANGLE) {
                Some(TagValue::Numeric { value, .. }) => value as i16,
                Some(_) => return None,
                None => style.italic_angle.floor(),
            };
            style.open_style(FontStyles::ITALIC);
            style.italic_angle.push(angle);
        }
        SIZE => {
            let TagValue::Numeric {
                value,
                unit,
                relative,
            } = tag.value
            else {
                return None;
            };
            let size = match unit {
                TagUnit::Pixels if relative => style.base_size + value,
                TagUnit::Pixels => value,
                TagUnit::Percent => style.base_size * value / 100.0,
                TagUnit::Em => style.base_size * value,
            };
            if size <= 0.0 {
                return None;
            }
            style.size.push(size);
        }
        COLOR => {
            let color = match tag.value {
                TagValue::Hex { value, digits } => Color32::from_hex_digits(value, digits)?,
                TagValue::Keyword(hash) => named_color(hash)?,
                _ => return None,
            };
            style.color.push(color);
        }
        ALPHA => {
            let TagValue::Hex { value, digits: 2 } = tag.value else {
                return None;
            };
            let top = style.color.current();
            style.color.push(top.with_alpha(value as u8));
        }
        VOFFSET => {
            let offset = length(tag.value, style)?;
            style.baseline_offset.push(offset);
        }
        SUP => style.open_style(FontStyles::SUPERSCRIPT),
        SUB => style.open_style(FontStyles::SUBSCRIPT),
        CSPACE => {
            let spacing = length(tag.value, style)?;
            style.char_spacing.push(spacing);
        }
        FONT_WEIGHT => {
            let TagValue::Numeric { value, .. } = tag.value else {
                return None;
            };
            let weight = FontWeight::from_numeric(value as u16)?;
            style.weight.push(weight);
        }
        BR => return Some(TagEffect::LineBreak),
        NOBR => style.open_style(FontStyles::NO_BREAK),
        LOWERCASE => style.open_style(FontStyles::LOWERCASE),
        UPPERCASE => style.open_style(FontStyles::UPPERCASE),
        NOPARSE => style.no_parse = true,
        _ => return None,
    }
    Some(TagEffect::Style)
}
