//! Lossy mapping from Unicode text to WinAnsi (Windows-1252) bytes.

/// Byte written for characters the encoding cannot represent.
pub const REPLACEMENT: u8 = b'?';

/// Text mapped into the single-byte font encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub bytes: Vec<u8>,
    /// Number of characters replaced by [`REPLACEMENT`].
    pub substituted: usize,
}

/// Encode `text` as WinAnsi bytes.
///
/// Newlines are kept as line breaks, tabs become a space, carriage returns and
/// other control characters are dropped, and anything outside the code page
/// becomes `?`.
pub fn encode_win_ansi(text: &str) -> EncodedText {
    let mut bytes = Vec::with_capacity(text.len());
    let mut substituted = 0;

    for c in text.chars() {
        match c {
            '\n' => bytes.push(b'\n'),
            '\t' => bytes.push(b' '),
            c if c.is_control() => {}
            c => match win_ansi_byte(c) {
                Some(b) => bytes.push(b),
                None => {
                    bytes.push(REPLACEMENT);
                    substituted += 1;
                }
            },
        }
    }

    EncodedText { bytes, substituted }
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    if (0x20..0x7f).contains(&code) || (0xa0..=0xff).contains(&code) {
        return Some(code as u8);
    }

    // the 0x80..0x9f block of Windows-1252
    let b = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let encoded = encode_win_ansi("Hello, world!");
        assert_eq!(encoded.bytes, b"Hello, world!");
        assert_eq!(encoded.substituted, 0);
    }

    #[test]
    fn test_latin1_maps_to_single_bytes() {
        let encoded = encode_win_ansi("Café ß");
        assert_eq!(encoded.bytes, vec![b'C', b'a', b'f', 0xe9, b' ', 0xdf]);
    }

    #[test]
    fn test_typographic_punctuation() {
        let encoded = encode_win_ansi("“quoted” — it’s…");
        assert_eq!(encoded.substituted, 0);
        assert_eq!(encoded.bytes[0], 0x93);
        assert_eq!(*encoded.bytes.last().unwrap(), 0x85);
    }

    #[test]
    fn test_unsupported_characters_substituted_not_dropped() {
        let encoded = encode_win_ansi("a中b🚀c");
        assert_eq!(encoded.bytes, b"a?b?c");
        assert_eq!(encoded.substituted, 2);
    }

    #[test]
    fn test_control_characters() {
        let encoded = encode_win_ansi("a\tb\r\nc\u{7}");
        assert_eq!(encoded.bytes, b"a b\nc");
        assert_eq!(encoded.substituted, 0);
    }
}
