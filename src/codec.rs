//! Factory binding one [`Config`] to every kind of coordinator and stream wrapper.

use std::io::{BufRead, Write};

use crate::{
    bufread::DecompressorReader,
    config::Config,
    coordinator::{Compressor, Decompressor, DirectDecompressor},
    error::Result,
    write::CompressorWriter,
};

/// Deflate codec with a fixed configuration.
///
/// ```
/// use std::io::{Read, Write};
///
/// use compression_coordinator::{Codec, Config, Framing};
///
/// let codec = Codec::new(Config::default().with_framing(Framing::Gzip));
/// assert_eq!(codec.default_extension(), ".gz");
///
/// let mut writer = codec.compressor_writer(Vec::new())?;
/// writer.write_all(b"hello codec")?;
/// let compressed = writer.finish()?;
///
/// let mut decompressed = String::new();
/// codec
///     .decompressor_reader(&compressed[..])?
///     .read_to_string(&mut decompressed)?;
/// assert_eq!(decompressed, "hello codec");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Codec {
    config: Config,
    multiple_members: bool,
}

impl Codec {
    /// Create a codec handing `config` to everything it creates.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            multiple_members: false,
        }
    }

    /// Create a codec from string settings, see [`Config::from_properties`].
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(Self::new(Config::from_properties(properties)?))
    }

    /// Whether decompressors continue past the end of a member, see
    /// [`Decompressor::multiple_members`].
    pub fn multiple_members(mut self, enabled: bool) -> Self {
        self.multiple_members = enabled;
        self
    }

    /// The configuration handed to created coordinators.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// File extension of data produced by this codec.
    pub fn default_extension(&self) -> &'static str {
        self.config.framing().extension()
    }

    /// Create a compressing coordinator.
    pub fn create_compressor(&self) -> Result<Compressor> {
        Compressor::new(self.config)
    }

    /// Create a decompressing coordinator.
    pub fn create_decompressor(&self) -> Result<Decompressor> {
        Ok(Decompressor::new(self.config)?.multiple_members(self.multiple_members))
    }

    /// Create a decompressing coordinator working on caller buffers.
    pub fn create_direct_decompressor(&self) -> Result<DirectDecompressor> {
        Ok(DirectDecompressor::new(self.config)?.multiple_members(self.multiple_members))
    }

    /// Wrap `writer` so everything written to it is compressed.
    pub fn compressor_writer<W: Write>(&self, writer: W) -> Result<CompressorWriter<W>> {
        Ok(CompressorWriter::new(writer, self.create_compressor()?))
    }

    /// Wrap `reader` so everything read from it is decompressed.
    pub fn decompressor_reader<R: BufRead>(&self, reader: R) -> Result<DecompressorReader<R>> {
        Ok(DecompressorReader::new(reader, self.create_decompressor()?)
            .multiple_members(self.multiple_members))
    }

    /// Wrap an asynchronous `writer` so everything written to it is compressed.
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub fn async_compressor_writer<W: ::tokio::io::AsyncWrite>(
        &self,
        writer: W,
    ) -> Result<crate::tokio::write::CompressorWriter<W>> {
        Ok(crate::tokio::write::CompressorWriter::new(
            writer,
            self.create_compressor()?,
        ))
    }
}
