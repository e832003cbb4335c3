//! Metrics of the two standard PDF fonts the ticket uses.
//!
//! Widths are the Adobe core-font AFM advance widths (1/1000 em) for the
//! printable ASCII range, in code point order starting at U+0020.

use serde::Serialize;

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Baseline-to-baseline distance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const BULLET_WIDTH: u16 = 350;
const FALLBACK_WIDTH: u16 = 556;

impl Font {
    /// Resource name the PDF writer registers this font under.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn glyph_width(self, c: char) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA,
            Font::HelveticaBold => &HELVETICA_BOLD,
        };
        match c {
            ' '..='~' => table[c as usize - 0x20],
            '•' => BULLET_WIDTH,
            _ => FALLBACK_WIDTH,
        }
    }

    /// Rendered width of `text` at `size_pt`, in millimetres.
    pub fn text_width_mm(self, text: &str, size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 * size_pt / 1000.0 / PT_PER_MM
    }

    /// Baseline spacing of consecutive lines at `size_pt`, in millimetres.
    pub fn line_height_mm(size_pt: f32) -> f32 {
        size_pt * LINE_HEIGHT_FACTOR / PT_PER_MM
    }

    /// Greedy word wrap so that no line is wider than `max_width_mm`.
    ///
    /// A single word wider than the limit gets a line of its own.
    pub fn wrap(self, text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate = format!("{} {}", current, word);
            if self.text_width_mm(&candidate, size_pt) <= max_width_mm {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Encode text for a `WinAnsiEncoding` simple font.
///
/// Latin-1 maps straight through, the bullet goes to 0x95 and anything the
/// encoding cannot represent becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '•' => 0x95,
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Inverse of [`encode_win_ansi`].
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x95 => '•',
            _ => char::from(b),
        })
        .collect()
}
