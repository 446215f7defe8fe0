use crate::core::transport::PortHandle;
use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// Port that reads back everything written to it.
#[derive(Debug, Default)]
pub struct LoopbackPort {
    buffer: VecDeque<u8>,
}

impl LoopbackPort {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Read for LoopbackPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.buffer.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
        }

        let n = buf.len().min(self.buffer.len());
        for (slot, byte) in buf.iter_mut().zip(self.buffer.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for LoopbackPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PortHandle for LoopbackPort {
    fn bytes_to_read(&self) -> io::Result<usize> {
        Ok(self.buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_bytes_are_read_back() {
        let mut port = LoopbackPort::new();
        port.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(port.bytes_to_read().unwrap(), 3);

        let mut buf = [0u8; 2];
        assert_eq!(port.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(port.bytes_to_read().unwrap(), 1);
    }

    #[test]
    fn test_empty_read_times_out() {
        let mut port = LoopbackPort::new();
        let mut buf = [0u8; 4];
        let error = port.read(&mut buf).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::TimedOut);
    }
}
