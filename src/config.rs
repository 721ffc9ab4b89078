//! Per-instance codec configuration.
//!
//! Every coordinator captures its own copy of a [`Config`] when it is constructed, so changing
//! the settings for one stream never affects a coordinator which already exists.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// Capacity of the pending and ready buffers when nothing else is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Key for the buffer capacity in [`Config::from_properties`].
pub const BUFFER_SIZE_KEY: &str = "compress.buffer.size";
/// Key for the [`Level`] in [`Config::from_properties`].
pub const LEVEL_KEY: &str = "compress.level";
/// Key for the [`Flush`] mode in [`Config::from_properties`].
pub const FLUSH_KEY: &str = "compress.flush";
/// Key for the [`Framing`] in [`Config::from_properties`].
pub const FRAMING_KEY: &str = "compress.framing";

/// Level of compression data should be compressed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Level {
    /// Fastest quality of compression, usually produces bigger size.
    Min,
    /// Best quality of compression, usually produces the smallest size.
    #[default]
    Max,
}

impl Level {
    pub(crate) fn into_flate2(self) -> flate2::Compression {
        match self {
            Self::Min => flate2::Compression::fast(),
            Self::Max => flate2::Compression::best(),
        }
    }
}

/// How much buffered engine state is flushed after each block of input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flush {
    /// Let the engine decide when to emit output.
    #[default]
    None,
    /// Emit all output for the input so far, aligned to a byte boundary.
    Sync,
    /// Like [`Flush::Sync`], additionally resetting the engine's dictionary.
    Full,
}

/// Container format wrapped around the compressed data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Framing {
    /// Bare deflate stream.
    #[default]
    Raw,
    /// Gzip member: header, deflate stream, CRC-32 and size trailer.
    Gzip,
    /// Gzip member without its header: deflate stream followed by the gzip trailer.
    GzipNoHeader,
}

impl Framing {
    /// Conventional file extension for data in this framing.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Raw => ".deflate",
            Self::Gzip | Self::GzipNoHeader => ".gz",
        }
    }
}

macro_rules! parse_enum {
    ($ty:ident { $($name:literal => $variant:ident,)* }) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(value: &str) -> Result<Self> {
                $(
                    if value.trim().eq_ignore_ascii_case($name) {
                        return Ok(Self::$variant);
                    }
                )*
                Err(Error::Config {
                    key: stringify!($ty).to_owned(),
                    value: value.to_owned(),
                })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $(Self::$variant => $name,)*
                };
                f.write_str(name)
            }
        }
    };
}

parse_enum!(Level {
    "min" => Min,
    "max" => Max,
});

parse_enum!(Flush {
    "none" => None,
    "sync" => Sync,
    "full" => Full,
});

parse_enum!(Framing {
    "raw" => Raw,
    "gzip" => Gzip,
    "gzip-no-header" => GzipNoHeader,
});

/// Settings for a compressor or decompressor.
///
/// Decompressors only look at the buffer size and the framing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    buffer_size: usize,
    level: Level,
    flush: Flush,
    framing: Framing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            level: Level::default(),
            flush: Flush::default(),
            framing: Framing::default(),
        }
    }
}

impl Config {
    /// Capacity in bytes of each of the coordinator's owned buffers.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        assert!(size > 0, "buffer size must be non-zero");
        self.buffer_size = size;
        self
    }

    /// Compression level, ignored by decompressors.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Flush mode applied after each block of input, ignored by decompressors.
    pub fn with_flush(mut self, flush: Flush) -> Self {
        self.flush = flush;
        self
    }

    /// Container format around the compressed data.
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// See [`Config::with_buffer_size`].
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// See [`Config::with_level`].
    pub fn level(&self) -> Level {
        self.level
    }

    /// See [`Config::with_flush`].
    pub fn flush(&self) -> Flush {
        self.flush
    }

    /// See [`Config::with_framing`].
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Build a config from string key/value pairs, starting from the defaults.
    ///
    /// Recognised keys are [`BUFFER_SIZE_KEY`], [`LEVEL_KEY`], [`FLUSH_KEY`] and
    /// [`FRAMING_KEY`]; other keys are ignored so a larger settings table can be passed as is.
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in properties {
            let (key, value) = (key.as_ref(), value.as_ref());
            let invalid = || Error::Config {
                key: key.to_owned(),
                value: value.to_owned(),
            };

            match key {
                BUFFER_SIZE_KEY => {
                    config.buffer_size = match value.trim().parse() {
                        Ok(0) | Err(_) => return Err(invalid()),
                        Ok(size) => size,
                    };
                }
                LEVEL_KEY => config.level = value.parse().map_err(|_| invalid())?,
                FLUSH_KEY => config.flush = value.parse().map_err(|_| invalid())?,
                FRAMING_KEY => config.framing = value.parse().map_err(|_| invalid())?,
                _ => {}
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.buffer_size(), 64 * 1024);
        assert_eq!(config.level(), Level::Max);
        assert_eq!(config.flush(), Flush::None);
        assert_eq!(config.framing(), Framing::Raw);
    }

    #[test]
    fn from_properties() {
        let config = Config::from_properties([
            (LEVEL_KEY, "MIN"),
            (FLUSH_KEY, "sync"),
            (FRAMING_KEY, "gzip-no-header"),
            (BUFFER_SIZE_KEY, " 4096 "),
            ("io.file.buffer.size", "ignored"),
        ])
        .unwrap();

        assert_eq!(
            config,
            Config::default()
                .with_level(Level::Min)
                .with_flush(Flush::Sync)
                .with_framing(Framing::GzipNoHeader)
                .with_buffer_size(4096)
        );
    }

    #[test]
    fn from_properties_rejects_bad_values() {
        for (key, value) in [
            (BUFFER_SIZE_KEY, "0"),
            (BUFFER_SIZE_KEY, "-1"),
            (LEVEL_KEY, "medium"),
            (FRAMING_KEY, "zip"),
        ] {
            match Config::from_properties([(key, value)]) {
                Err(Error::Config { key: k, value: v }) => {
                    assert_eq!((k.as_str(), v.as_str()), (key, value));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for framing in [Framing::Raw, Framing::Gzip, Framing::GzipNoHeader] {
            assert_eq!(framing.to_string().parse::<Framing>().unwrap(), framing);
        }
        assert_eq!(Flush::Full.to_string(), "full");
    }
}
