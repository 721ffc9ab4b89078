use std::io;

use thiserror::Error;

/// Alias for the result type of coordinator operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by the coordinators.
///
/// Argument and state errors are detected before any buffer or engine state is touched, so a
/// failed call leaves the coordinator exactly as it was. Engine errors are fatal for the current
/// stream: the caller is expected to [`end`](crate::Compress::end) or
/// [`reset`](crate::Compress::reset) the coordinator.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// The `offset`/`len` pair does not describe a region of the supplied buffer.
    #[error("range {offset}+{len} is out of bounds for a buffer of {size} bytes")]
    OutOfBounds {
        /// Requested start of the region.
        offset: usize,
        /// Requested length of the region.
        len: usize,
        /// Actual size of the buffer.
        size: usize,
    },

    /// An argument was rejected for a reason other than its bounds.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The coordinator was [`end`](crate::Compress::end)ed and has no engine anymore.
    #[error("coordinator has been ended")]
    Closed,

    /// The operation is not provided by this coordinator or engine.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// The engine reported a failure while processing data.
    #[error("compression engine failed: {0}")]
    Engine(#[from] io::Error),

    /// The engine failed its availability probe, see [`crate::engine::init`].
    #[error("compression engine {0} is not available")]
    Unavailable(&'static str),

    /// A configuration value could not be parsed.
    #[error("invalid value {value:?} for configuration key {key}")]
    Config {
        /// The key whose value was rejected.
        key: String,
        /// The rejected value.
        value: String,
    },
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Engine(inner) => inner,
            Error::OutOfBounds { .. } | Error::InvalidArgument(_) | Error::Config { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, error)
            }
            Error::Unsupported(_) | Error::Unavailable(_) => {
                io::Error::new(io::ErrorKind::Unsupported, error)
            }
            Error::Closed => io::Error::other(error),
        }
    }
}
