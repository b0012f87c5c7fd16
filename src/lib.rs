//! Open, insert and export gzip-compressed STEP archives (`.stpZ`).
//!
//! CAD kernels read and write plain STEP files at a path, and many of them
//! can't cope with compressed streams or non-ASCII file names inside them. The
//! [`Transcoder`] bridges that gap: it decompresses an archive to a scratch
//! file, hands the plain file to a [`CadKernel`], and removes the scratch file
//! afterwards. Exports run the same dance in reverse.
//!
//! - Codec: [`stepz_compress`]
//! - Configuration: [`stepz_config`]
//! - User-facing messages: [`Notifier`] (default: [`TracingNotifier`])
//!
//! Test doubles for the kernel and notifier live in [`mock`], behind the
//! `mock` feature.

pub mod error;
mod fs;
mod kernel;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod name;
mod notify;
mod scratch;
mod transcoder;

pub use crate::kernel::{CadKernel, KernelOperation};
pub use crate::name::ArchiveName;
pub use crate::notify::{Notifier, TracingNotifier};
pub use crate::transcoder::{ExportOutcome, Transcoder};
pub use stepz_config::{Config, Formats};
