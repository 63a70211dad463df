//! Text processing buffer: source text as code points, ready for layout.

/// One code point plus the index of the source `char` it came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessingUnit {
    pub unicode: u32,
    pub source_index: usize,
}

/// Per-object code point array.
///
/// Rebuilt when the source text changes; storage grows to the next power
/// of two and is reused across rebuilds.
#[derive(Clone, Debug, Default)]
pub struct TextProcessingBuffer {
    text: String,
    parse_escapes: bool,
    units: Vec<ProcessingUnit>,
}

impl TextProcessingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str, parse_escapes: bool) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text, parse_escapes);
        buffer
    }

    /// Replace the source text. Returns `false` if nothing changed.
    pub fn set_text(&mut self, text: &str, parse_escapes: bool) -> bool {
        if self.text == text && self.parse_escapes == parse_escapes {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        self.parse_escapes = parse_escapes;
        self.rebuild();
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn units(&self) -> &[ProcessingUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Code points only, in order.
    pub fn code_points(&self) -> Vec<u32> {
        self.units.iter().map(|unit| unit.unicode).collect()
    }

    fn rebuild(&mut self) {
        let needed = self.text.chars().count();
        if self.units.capacity() < needed {
            let target = needed.next_power_of_two();
            self.units.reserve_exact(target - self.units.len());
        }
        self.units.clear();

        let chars: Vec<char> = self.text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if self.parse_escapes && chars[i] == '\\' {
                if let Some((unicode, consumed)) = parse_escape(&chars[i + 1..]) {
                    self.units.push(ProcessingUnit {
                        unicode,
                        source_index: i,
                    });
                    i += 1 + consumed;
                    continue;
                }
            }
            self.units.push(ProcessingUnit {
                unicode: chars[i] as u32,
                source_index: i,
            });
            i += 1;
        }
    }
}

/// Decode the escape following a backslash. Returns the code point and how
/// many characters after the backslash it used.
fn parse_escape(rest: &[char]) -> Option<(u32, usize)> {
    match rest.first()? {
        'n' => Some((0x0A, 1)),
        'r' => Some((0x0D, 1)),
        't' => Some((0x09, 1)),
        'v' => Some((0x0B, 1)),
        '\\' => Some(('\\' as u32, 1)),
        'u' => parse_hex(&rest[1..], 4).map(|cp| (cp, 5)),
        'U' => parse_hex(&rest[1..], 8).map(|cp| (cp, 9)),
        _ => None,
    }
}

fn parse_hex(chars: &[char], digits: usize) -> Option<u32> {
    if chars.len() < digits {
        return None;
    }
    let mut value: u32 = 0;
    for c in &chars[..digits] {
        value = (value << 4) | c.to_digit(16)?;
    }
    char::from_u32(value).map(|c| c as u32)
}
