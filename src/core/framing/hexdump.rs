use std::fmt::Write;

const ROW_WIDTH: usize = 16;
const HEX_COLUMN_WIDTH: usize = 56;

/// Render `bytes` as rows of a 4-digit offset, up to sixteen hex bytes padded to
/// a fixed column, and an ASCII column. Each row ends with a newline.
pub fn render_hex_dump(bytes: &[u8]) -> String {
    let mut dump = String::new();

    for (row, chunk) in bytes.chunks(ROW_WIDTH).enumerate() {
        let hex = chunk
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk.iter().map(|&b| printable(b)).collect();

        // Writing into a String cannot fail.
        let _ = writeln!(
            dump,
            "{:04X}  {:<width$}{}",
            row * ROW_WIDTH,
            hex,
            ascii,
            width = HEX_COLUMN_WIDTH
        );
    }

    dump
}

/// The character for `b` when it is strictly between space and tilde, '.' otherwise.
pub fn printable(b: u8) -> char {
    if b > 32 && b < 126 {
        b as char
    } else {
        '.'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(render_hex_dump(&[]), "");
    }

    #[test]
    fn test_single_full_row() {
        let bytes: Vec<u8> = (0x40..0x50).collect();
        let dump = render_hex_dump(&bytes);

        assert_eq!(dump.lines().count(), 1);
        assert!(dump.starts_with("0000  40 41 42"));
        assert!(dump.ends_with("@ABCDEFGHIJKLMNO\n"));
    }

    #[test]
    fn test_short_row_is_padded() {
        let full = render_hex_dump(&[0x41; 16]);
        let short = render_hex_dump(&[0x41, 0x42]);

        assert_eq!(short, format!("0000  {:<56}AB\n", "41 42"));
        // ASCII column starts at the same place for full and short rows
        assert_eq!(full.len() - 16, short.len() - 2);
    }

    #[test]
    fn test_offsets_advance_per_row() {
        let bytes = vec![0u8; 40];
        let dump = render_hex_dump(&bytes);
        let offsets: Vec<&str> = dump.lines().map(|l| &l[..4]).collect();
        assert_eq!(offsets, vec!["0000", "0010", "0020"]);
    }

    #[test]
    fn test_printable_bounds() {
        assert_eq!(printable(b' '), '.');
        assert_eq!(printable(b'!'), '!');
        assert_eq!(printable(b'}'), '}');
        assert_eq!(printable(b'~'), '.');
        assert_eq!(printable(0x00), '.');
        assert_eq!(printable(0xFF), '.');
    }
}
