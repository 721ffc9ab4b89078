//! Incremental compression coordinators over a block-oriented deflate engine.
//!
//! A coordinator owns one engine and adapts it to callers which push input and pull output in
//! arbitrary amounts: [`Compressor`] and [`Decompressor`] stage data through buffers of a fixed
//! capacity, while [`DirectDecompressor`] runs the engine directly between two caller regions.
//! They never lose bytes, never block and perform at most one engine step per call.
//!
//! # Feature Organization
//!
//!  Feature | Does
//! ---------|------
//!  `zlib`  | Backs the engine with the system zlib instead of `miniz_oxide`.
#![cfg_attr(
    feature = "tokio",
    doc = "`tokio` | [`tokio::write::CompressorWriter`](crate::tokio::write::CompressorWriter) over [`tokio::io::AsyncWrite`](::tokio::io::AsyncWrite)"
)]
#![cfg_attr(
    not(feature = "tokio"),
    doc = "`tokio` (*inactive*) | `tokio::write::CompressorWriter` over `tokio::io::AsyncWrite`"
)]
//!
//! # Example
//!
//! ```
//! use compression_coordinator::{Compress, Compressor, Config, Decompress, Decompressor};
//!
//! let config = Config::default().with_buffer_size(4096);
//! let data = b"a line of text\n".repeat(100);
//!
//! let mut compressor = Compressor::new(config)?;
//! compressor.set_input(&data, 0, data.len())?;
//! compressor.finish()?;
//! let mut compressed = vec![0; data.len()];
//! let mut len = 0;
//! while !compressor.finished() {
//!     len += compressor.compress(&mut compressed, len, data.len() - len)?;
//! }
//!
//! let mut decompressor = Decompressor::new(config)?;
//! decompressor.set_input(&compressed, 0, len)?;
//! let mut decompressed = vec![0; data.len()];
//! let mut read = 0;
//! while !decompressor.finished() {
//!     read += decompressor.decompress(&mut decompressed, read, data.len() - read)?;
//! }
//! assert_eq!(decompressed, data);
//! # Ok::<(), compression_coordinator::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_copy_implementations,
    missing_debug_implementations
)]

pub mod bufread;
pub mod codec;
pub mod config;
pub mod coordinator;
pub mod engine;
mod error;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod tokio;
mod util;
pub mod write;

pub use crate::{
    codec::Codec,
    config::{Config, Flush, Framing, Level},
    coordinator::{Compress, Compressor, Decompress, Decompressor, DirectDecompressor},
    error::{Error, Result},
    util::PartialBuffer,
};

const _: () = {
    fn _assert() {
        use crate::util::{_assert_send, _assert_sync};

        _assert_send::<Compressor>();
        _assert_send::<Decompressor>();
        _assert_send::<DirectDecompressor>();
        _assert_sync::<Compressor>();
        _assert_sync::<Decompressor>();
    }
};
