use super::checksum::ChecksumMode;

pub const CR: u8 = 0x0D;
pub const LF: u8 = 0x0A;

/// Line ending bytes appended after the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineEnding {
    pub cr: bool,
    pub lf: bool,
}

/// The exact bytes transmitted for one entry:
/// payload, then CR, then LF, then one checksum byte covering all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    bytes: Vec<u8>,
}

impl OutboundFrame {
    pub fn build(payload: &[u8], line_ending: LineEnding, checksum: ChecksumMode) -> Self {
        let mut bytes = Vec::with_capacity(payload.len() + 3);
        bytes.extend_from_slice(payload);

        if line_ending.cr {
            bytes.push(CR);
        }
        if line_ending.lf {
            bytes.push(LF);
        }
        if let Some(sum) = checksum.compute(&bytes) {
            bytes.push(sum);
        }

        Self { bytes }
    }

    /// A frame sent verbatim, without line ending or checksum.
    pub fn raw(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for OutboundFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
