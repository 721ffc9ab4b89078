//! Implementations for IO traits exported by [`tokio` v1.x](::tokio).

pub mod write;
