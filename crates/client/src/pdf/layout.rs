//! Greedy line breaking with Helvetica metrics.

/// Advance widths for WinAnsi 0x20..=0x7e in 1/1000 em (Helvetica AFM).
#[rustfmt::skip]
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

fn glyph_width(b: u8) -> u16 {
    match b {
        0x20..=0x7e => ASCII_WIDTHS[(b - 0x20) as usize],
        0x85 | 0x89 | 0x97 | 0x99 => 1000,
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x95 => 350,
        _ => 556,
    }
}

fn text_width(bytes: &[u8], font_size: f32) -> f32 {
    bytes.iter().map(|&b| glyph_width(b) as f32).sum::<f32>() * font_size / 1000.0
}

/// Break encoded text into lines no wider than `max_width` points.
///
/// Explicit newlines are kept (so blank lines survive); words longer than a
/// full line are split between characters.
pub fn wrap_lines(text: &[u8], max_width: f32, font_size: f32) -> Vec<Vec<u8>> {
    if text.is_empty() {
        return Vec::new();
    }

    let space = text_width(b" ", font_size);
    let mut lines = Vec::new();

    for paragraph in text.split(|&b| b == b'\n') {
        let mut line: Vec<u8> = Vec::new();
        let mut width = 0.0;

        for word in paragraph.split(|&b| b == b' ').filter(|w| !w.is_empty()) {
            let word_width = text_width(word, font_size);
            let needed = if line.is_empty() { word_width } else { width + space + word_width };

            if needed <= max_width {
                if !line.is_empty() {
                    line.push(b' ');
                }
                line.extend_from_slice(word);
                width = needed;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if word_width <= max_width {
                line.extend_from_slice(word);
                width = word_width;
                continue;
            }

            width = 0.0;
            for &b in word {
                let w = text_width(&[b], font_size);
                if width + w > max_width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    width = 0.0;
                }
                line.push(b);
                width += w;
            }
        }

        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_table_spot_checks() {
        assert_eq!(glyph_width(b' '), 278);
        assert_eq!(glyph_width(b'@'), 1015);
        assert_eq!(glyph_width(b'W'), 944);
        assert_eq!(glyph_width(b'i'), 222);
        assert_eq!(glyph_width(b'~'), 584);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_lines(b"", 100.0, 12.0).is_empty());
    }

    #[test]
    fn test_wrap_short_line_unchanged() {
        assert_eq!(wrap_lines(b"short line", 500.0, 12.0), vec![b"short line".to_vec()]);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let lines = wrap_lines(b"one\n\ntwo", 500.0, 12.0);
        assert_eq!(lines, vec![b"one".to_vec(), Vec::new(), b"two".to_vec()]);
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        // "aaaa" is 4 * 556 * 0.012 = 26.688pt wide
        let lines = wrap_lines(b"aaaa aaaa aaaa", 60.0, 12.0);
        assert_eq!(lines, vec![b"aaaa aaaa".to_vec(), b"aaaa".to_vec()]);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let lines = wrap_lines(b"aaaaaaaaaa", 30.0, 12.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), b"aaaaaaaaaa".to_vec());
        for line in &lines {
            assert!(text_width(line, 12.0) <= 30.0);
        }
    }

    #[test]
    fn test_wrap_never_exceeds_width() {
        let text = b"The quick brown fox jumps over the lazy dog. ".repeat(20);
        for line in wrap_lines(&text, 200.0, 12.0) {
            assert!(text_width(&line, 12.0) <= 200.0);
        }
    }
}
