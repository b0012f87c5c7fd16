//! The CAD kernel seam.
//!
//! The transcoder never parses or writes STEP itself. Every read and write of
//! model data is delegated to a [`CadKernel`], which only ever sees plain files
//! on ASCII-safe scratch paths.

use derive_more::Display;
use std::path::Path;

/// Which kernel capability was being used, for error reporting.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum KernelOperation {
    #[display("open")]
    Open,
    #[display("insert")]
    Insert,
    #[display("export")]
    Export,
}

/// File-based importer/exporter for plain STEP files.
///
/// Implementations own their document and object types; the transcoder only
/// moves handles between the caller and the kernel.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use stepz::CadKernel;
///
/// struct Passthrough;
///
/// impl CadKernel for Passthrough {
///     type Document = Vec<u8>;
///     type Object = Vec<u8>;
///     type Error = std::io::Error;
///
///     fn open(&self, path: &Path) -> Result<Vec<u8>, Self::Error> {
///         std::fs::read(path)
///     }
///     fn insert(&self, path: &Path, document: &mut Vec<u8>) -> Result<(), Self::Error> {
///         document.extend(std::fs::read(path)?);
///         Ok(())
///     }
///     fn export(&self, objects: &[Vec<u8>], path: &Path) -> Result<(), Self::Error> {
///         std::fs::write(path, objects.concat())
///     }
/// }
/// ```
pub trait CadKernel {
    type Document;
    type Object;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Import the plain file at `path` as a new document.
    fn open(&self, path: &Path) -> Result<Self::Document, Self::Error>;

    /// Import the plain file at `path` into an existing document.
    fn insert(&self, path: &Path, document: &mut Self::Document) -> Result<(), Self::Error>;

    /// Serialize `objects` to a plain file at `path`.
    ///
    /// The transcoder reserves `path` before calling this, so an empty file
    /// already exists there and must be overwritten.
    fn export(&self, objects: &[Self::Object], path: &Path) -> Result<(), Self::Error>;
}
