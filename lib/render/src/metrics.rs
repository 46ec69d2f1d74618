//! Helvetica advance widths and WinAnsi encoding.
//!
//! Only the two standard fonts the renderer uses are covered. Widths are in
//! thousandths of the font size, taken from the Adobe core font metrics.

use std::fmt;

/// The two standard fonts used for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
}

impl Font {
    /// PostScript name of the base font.
    #[must_use]
    pub fn base_name(&self) -> &'static [u8] {
        match self {
            Self::Regular => b"Helvetica",
            Self::Bold => b"Helvetica-Bold",
        }
    }

    /// Resource name used in page content streams.
    #[must_use]
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            Self::Regular => b"F1",
            Self::Bold => b"F2",
        }
    }
}

/// Byte used for the bullet glyph in WinAnsi.
pub const BULLET: u8 = 0x95;

// Codes 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

// Latin-1 supplement glyphs are approximated by an average lowercase width.
const FALLBACK_WIDTH: u16 = 556;

/// Advance width of one encoded byte, in thousandths of the font size.
#[must_use]
pub fn glyph_width(font: Font, byte: u8) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    match byte {
        32..=126 => table[usize::from(byte - 32)],
        0x85 | 0x97 => 1000,
        BULLET => 350,
        0x91 | 0x92 => match font {
            Font::Regular => 222,
            Font::Bold => 278,
        },
        0x93 | 0x94 => match font {
            Font::Regular => 333,
            Font::Bold => 500,
        },
        0xA0 => 278,
        _ => FALLBACK_WIDTH,
    }
}

/// Width of encoded text at `size` points.
#[must_use]
pub fn text_width(font: Font, text: &[u8], size: f32) -> f32 {
    let units: u32 = text.iter().map(|&b| u32::from(glyph_width(font, b))).sum();
    units as f32 * size / 1000.0
}

/// A character with no WinAnsi code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeError {
    /// The offending character.
    pub character: char,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "character {:?} (U+{:04X}) cannot be encoded in WinAnsi",
            self.character, self.character as u32
        )
    }
}

impl std::error::Error for EncodeError {}

/// Encodes text as WinAnsi bytes, one byte per character.
///
/// Tabs become spaces.
///
/// # Errors
///
/// Returns the first character with no WinAnsi code point.
pub fn encode(text: &str) -> Result<Vec<u8>, EncodeError> {
    text.chars()
        .map(|character| encode_char(character).ok_or(EncodeError { character }))
        .collect()
}

fn encode_char(c: char) -> Option<u8> {
    let byte = match c {
        '\t' => b' ',
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => BULLET,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => return None,
    };
    Some(byte)
}

/// Decodes WinAnsi bytes produced by [`encode`].
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80 => '€',
            0x85 => '…',
            0x91 => '‘',
            0x92 => '’',
            0x93 => '“',
            0x94 => '”',
            BULLET => '•',
            0x96 => '–',
            0x97 => '—',
            0x99 => '™',
            _ => char::from(b),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(encode("Hello, world!").expect("encodable"), b"Hello, world!");
    }

    #[test]
    fn typographic_punctuation_is_mapped() {
        let encoded = encode("“Quoted” – it’s… •").expect("encodable");
        assert_eq!(
            encoded,
            vec![
                0x93, b'Q', b'u', b'o', b't', b'e', b'd', 0x94, b' ', 0x96, b' ', b'i', b't', 0x92,
                b's', 0x85, b' ', BULLET
            ]
        );
        assert_eq!(decode(&encoded), "“Quoted” – it’s… •");
    }

    #[test]
    fn latin1_is_kept() {
        assert_eq!(encode("café").expect("encodable"), vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn cjk_is_rejected() {
        assert_eq!(encode("光合作用"), Err(EncodeError { character: '光' }));
        assert!(encode("emoji 🌱").is_err());
    }

    #[test]
    fn widths_follow_helvetica() {
        assert_eq!(glyph_width(Font::Regular, b'i'), 222);
        assert_eq!(glyph_width(Font::Bold, b'i'), 278);
        assert_eq!(glyph_width(Font::Regular, b'W'), 944);
        assert!((text_width(Font::Regular, b"ii", 10.0) - 4.44).abs() < 1e-4);
    }

    #[test]
    fn bold_is_never_narrower_for_lowercase() {
        for byte in b'a'..=b'z' {
            assert!(glyph_width(Font::Bold, byte) >= glyph_width(Font::Regular, byte));
        }
    }
}
