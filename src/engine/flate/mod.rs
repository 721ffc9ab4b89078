//! Deflate engine over [`flate2`], framed as raw deflate or as a gzip member.

mod decoder;
mod encoder;
pub(crate) mod header;

pub use self::{decoder::FlateDecoder, encoder::FlateEncoder};

use flate2::Crc;

/// Gzip trailer: CRC-32 then the uncompressed size modulo 2^32, both little-endian.
fn footer(crc: &Crc) -> [u8; 8] {
    let mut footer = [0; 8];
    footer[0..4].copy_from_slice(&crc.sum().to_le_bytes());
    footer[4..8].copy_from_slice(&crc.amount().to_le_bytes());
    footer
}
