//! Gzip codec for compressed STEP archives.
//!
//! A `.stpZ` archive is nothing more than a gzip stream wrapping the bytes of
//! a single plain STEP file. This crate owns that layer, exposing:
//!
//! - **Format detection** from magic bytes ([`Compression::from_magic_bytes`])
//! - **In-memory** compression/decompression ([`Compression::compress`],
//!   [`Compression::decompress`])
//!
//! Gzip is always written at the best compression level; archives are written
//! once and read many times.

mod construct;
pub mod error;
mod ops;
mod util;

/// A supported archive encoding.
///
/// Defaults to [`None`](Self::None) (plain, uncompressed bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Gzip compression (.stpZ, .gz)
    Gzip,
}
