//! Code point classes that drive line breaking.

/// Ends the current line.
pub fn is_line_terminator(unicode: u32) -> bool {
    matches!(unicode, 0x0A | 0x0B | 0x03 | 0x2028 | 0x2029)
}

/// Starts a new paragraph (paragraph spacing applies).
pub fn is_paragraph_terminator(unicode: u32) -> bool {
    matches!(unicode, 0x0A | 0x2029)
}

/// Whitespace that occupies the line but never renders.
pub fn is_whitespace(unicode: u32) -> bool {
    matches!(
        unicode,
        0x09 | 0x0D | 0x20 | 0xA0 | 0x1680 | 0x2000..=0x200A | 0x202F | 0x205F | 0x3000
    )
}

/// Whitespace that may not be broken at.
pub fn is_non_breaking_space(unicode: u32) -> bool {
    matches!(unicode, 0xA0 | 0x2007 | 0x202F)
}

/// Zero-width code points that are break opportunities or format marks.
pub fn is_zero_width(unicode: u32) -> bool {
    matches!(unicode, 0x200B..=0x200F | 0x061C | 0x2060 | 0xFEFF)
}

pub const SOFT_HYPHEN: u32 = 0x00AD;
pub const ZERO_WIDTH_SPACE: u32 = 0x200B;
pub const TRUNCATION_MARKER: u32 = 0x0003;
pub const ELLIPSIS: u32 = 0x2026;

/// Scripts that break between any two characters.
pub fn is_cjk(unicode: u32) -> bool {
    matches!(
        unicode,
        0x1100..=0x11FF
            | 0x2E80..=0x9FFF
            | 0xA960..=0xA97F
            | 0xAC00..=0xD7AF
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFFEF
    )
}

/// May not end a line (opening brackets, currency).
pub fn is_leading_character(unicode: u32) -> bool {
    const LEADING: &str = "([{£¥‘“〈《「『【〔〖〝﹙﹛﹝＄（［｛｢￡￥";
    char::from_u32(unicode).is_some_and(|c| LEADING.contains(c))
}

/// May not start a line (closing brackets, punctuation, small kana).
pub fn is_following_character(unicode: u32) -> bool {
    const FOLLOWING: &str = ")]}.,!?;:、。〉》」』】〕〗〞︰︱︳﹐﹑﹒﹓﹔﹕﹖﹘﹚﹜！），．：；？］｝｣｡ー々ぁぃぅぇぉっゃゅょゎァィゥェォッャュョヮヵヶ";
    char::from_u32(unicode).is_some_and(|c| FOLLOWING.contains(c))
}

/// Whether a line may break between `previous` and `current` without
/// whitespace.
pub fn can_break_between(previous: u32, current: u32) -> bool {
    (is_cjk(previous) || is_cjk(current))
        && !is_following_character(current)
        && !is_leading_character(previous)
        && !is_whitespace(previous)
}
