//! Hex and binary memory-image encoding shared by both binaries: the assembler writes these
//! formats, the emulator reads the hex form back in.

use crate::word::{mask_word, MEMORY_SIZE};

/// Render `words` as the assembler's hex output: 12 words per line, each `%06x` plus a
/// trailing space, lines separated by `\n`.
pub fn to_hex_text(words: &[u32]) -> String {
    let mut out = String::new();
    for (i, chunk) in words.chunks(12).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for word in chunk {
            out.push_str(&format!("{:06x} ", mask_word(*word)));
        }
    }
    out
}

/// Render `words` as little-endian 3-byte machine words, no header, no padding.
pub fn to_binary_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * 3);
    for word in words {
        let word = mask_word(*word);
        out.push((word & 0xFF) as u8);
        out.push(((word >> 8) & 0xFF) as u8);
        out.push(((word >> 16) & 0xFF) as u8);
    }
    out
}

/// Parse the emulator's hex input format: whitespace-separated hex tokens, each masked to
/// 24 bits, zero-padded up to [`MEMORY_SIZE`]. A malformed token is a fatal load error.
pub fn parse_hex_text(text: &str) -> Result<Vec<u32>, String> {
    let mut words = Vec::new();
    for token in text.split_whitespace() {
        let value = u32::from_str_radix(token, 16)
            .map_err(|_| format!("malformed hex token: {:?}", token))?;
        words.push(mask_word(value));
    }
    words.resize(MEMORY_SIZE, 0);
    Ok(words)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_text_wraps_at_twelve_words_per_line() {
        let words: Vec<u32> = (0..13).collect();
        let text = to_hex_text(&words);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split_whitespace().count(), 12);
        assert_eq!(lines[1].split_whitespace().count(), 1);
        assert!(lines[0].starts_with("000000 000001"));
    }

    #[test]
    fn binary_bytes_are_little_endian_three_byte_words() {
        let bytes = to_binary_bytes(&[0x123456]);
        assert_eq!(bytes, vec![0x56, 0x34, 0x12]);
    }

    #[test]
    fn parse_hex_text_zero_pads_short_input() {
        let words = parse_hex_text("1 2 ff").unwrap();
        assert_eq!(&words[..3], &[1, 2, 0xff]);
        assert_eq!(words.len(), MEMORY_SIZE);
    }

    #[test]
    fn parse_hex_text_rejects_malformed_tokens() {
        assert!(parse_hex_text("12 zz 34").is_err());
    }

    #[test]
    fn round_trips_through_hex_text() {
        let words: Vec<u32> = vec![0x001484, 0x000380];
        let text = to_hex_text(&words);
        let mut parsed = parse_hex_text(&text).unwrap();
        parsed.truncate(2);
        assert_eq!(parsed, words);
    }
}
