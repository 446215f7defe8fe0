// Framing module - Checksums, hex dumps, escape decoding and outbound frames
pub mod checksum;
pub mod escape;
pub mod frame;
pub mod hexdump;

pub use checksum::{modulo_checksum, xor_checksum, ChecksumMode};
pub use escape::decode_escaped_entry;
pub use frame::{LineEnding, OutboundFrame};
pub use hexdump::render_hex_dump;
