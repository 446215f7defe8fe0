use serde::{Deserialize, Serialize};
use std::fmt;

use super::framing::render_hex_dump;

/// How byte chunks are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Hex,
    Ascii,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Hex => ViewMode::Ascii,
            ViewMode::Ascii => ViewMode::Hex,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Hex => write!(f, "HEX"),
            ViewMode::Ascii => write!(f, "ASCII"),
        }
    }
}

/// Origin of a line in the output pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Received,
    Echoed,
    Status,
}

/// Render a chunk in the selected mode. ASCII mode fails on bytes above 0x7F
/// with a message suitable for the status line.
pub fn render_chunk(bytes: &[u8], mode: ViewMode) -> Result<String, String> {
    match mode {
        ViewMode::Hex => Ok(render_hex_dump(bytes)),
        ViewMode::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
            Some(position) => Err(format!(
                "'ascii' codec can't decode byte {:#04x} in position {}",
                bytes[position], position
            )),
            None => Ok(bytes.iter().map(|&b| b as char).collect()),
        },
    }
}

/// Current UTC time as `YYYYMMDDTHHMMSSZ`.
pub fn timecode() -> String {
    chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_hex() {
        let text = render_chunk(&[0x41, 0x00], ViewMode::Hex).unwrap();
        assert!(text.starts_with("0000  41 00"));
    }

    #[test]
    fn test_render_ascii() {
        assert_eq!(render_chunk(b"OK\r\n", ViewMode::Ascii).unwrap(), "OK\r\n");
    }

    #[test]
    fn test_render_ascii_rejects_high_bytes() {
        let error = render_chunk(&[0x41, 0xC3], ViewMode::Ascii).unwrap_err();
        assert!(error.contains("0xc3"));
        assert!(error.contains("position 1"));
    }

    #[test]
    fn test_timecode_shape() {
        let code = timecode();
        assert_eq!(code.len(), 16);
        assert_eq!(&code[8..9], "T");
        assert!(code.ends_with('Z'));
    }

    #[test]
    fn test_toggle() {
        assert_eq!(ViewMode::Hex.toggle(), ViewMode::Ascii);
        assert_eq!(ViewMode::Ascii.toggle(), ViewMode::Hex);
    }
}
