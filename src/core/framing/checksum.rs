use serde::{Deserialize, Serialize};
use std::fmt;

/// Trailing integrity byte appended to outbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChecksumMode {
    #[default]
    #[serde(rename = "none")]
    None,
    /// 8-bit two's complement of the byte sum
    #[serde(rename = "mod")]
    Modulo,
    /// XOR of all bytes
    #[serde(rename = "xor")]
    Xor,
}

impl ChecksumMode {
    /// Checksum byte for `bytes`, or `None` when no mode is selected.
    pub fn compute(self, bytes: &[u8]) -> Option<u8> {
        match self {
            ChecksumMode::None => None,
            ChecksumMode::Modulo => Some(modulo_checksum(bytes)),
            ChecksumMode::Xor => Some(xor_checksum(bytes)),
        }
    }
}

impl fmt::Display for ChecksumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumMode::None => write!(f, "none"),
            ChecksumMode::Modulo => write!(f, "mod"),
            ChecksumMode::Xor => write!(f, "xor"),
        }
    }
}

/// Two's complement checksum: the byte that makes the sum of `bytes` plus the
/// checksum zero modulo 256. A zero sum yields 0.
pub fn modulo_checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b))
        .wrapping_neg()
}

/// XOR of all bytes, 0 for an empty slice.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |x, &b| x ^ b)
}
