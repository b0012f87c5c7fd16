//! Transcoder Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Errors raised by the codec and configuration crates are
//! re-raised here so that callers only ever match on one [`ErrorKind`].
//!
//! Nothing in this crate is worth retrying: every failure is either bad input
//! (a corrupt archive, an unusable path) or a local filesystem problem.

use crate::kernel::KernelOperation;
use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;
use stepz_compress::error::{Error as CompressionError, ErrorKind as CompressionErrorKind};
use stepz_config::error::Error as ConfigError;

/// A transcoder error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for transcoder operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File (or its parent directory) does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// File already exists (for operations that require new files)
    #[display("file already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Path has no usable base name, or the wrong extension
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The archive could not be decoded, or the plain file encoded
    #[display("compression error: {_0}")]
    Compression(CompressionErrorKind),
    /// The external CAD kernel failed; its own error is the child frame.
    #[display("CAD kernel failed to {operation} {}", path.display())]
    Kernel { operation: KernelOperation, path: PathBuf },
    #[display("configuration error")]
    Config,
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
impl ErrorKind {
    /// Convert a codec error into a transcoder error, keeping the codec's
    /// `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn compression(err: CompressionError) -> Error {
        let inner = *err;
        err.raise(ErrorKind::Compression(inner))
    }

    #[track_caller]
    pub fn config(err: ConfigError) -> Error {
        err.raise(ErrorKind::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepz_compress::Compression;

    #[test]
    fn test_kernel_display() {
        let kind = ErrorKind::Kernel {
            operation: KernelOperation::Export,
            path: PathBuf::from("/parts/bracket.stp"),
        };
        assert_eq!(kind.to_string(), "CAD kernel failed to export /parts/bracket.stp");
    }

    #[test]
    fn test_compression_keeps_kind() {
        let err = Compression::Gzip.decompress(b"definitely not gzip").unwrap_err();
        let wrapped = ErrorKind::compression(err);
        assert!(matches!(&*wrapped, ErrorKind::Compression(CompressionErrorKind::InvalidData)));
    }
}
