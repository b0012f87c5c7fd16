//! Scratch files owned by a single transcoder call.
//!
//! A [`ScratchFile`] is removed on every exit path. The happy path calls
//! [`release`](ScratchFile::release), which reports cleanup failures to the
//! user through the [`Notifier`]; any other exit (an error propagating with
//! `?`, a panic unwinding) drops the guard, which still removes the file and
//! logs failures. Cleanup failures never change the outcome of the call.

use crate::error::Result;
use crate::fs::{create_new, map_io_error};
use crate::notify::Notifier;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub(crate) struct ScratchFile {
    path: PathBuf,
    /// Private directory holding `path`, when the guard created one.
    dir: Option<TempDir>,
    released: bool,
}

impl ScratchFile {
    /// Reserve `name` inside a fresh, uniquely named directory under `root`.
    ///
    /// The file itself is not created; the kernel sees exactly `name`, which
    /// matters because importers label documents after the file name.
    pub(crate) fn stage_in(root: &Path, name: &OsStr) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("stepz-").tempdir_in(root).map_err(|e| map_io_error(e, root))?;
        let path = dir.path().join(name);
        Ok(Self {
            path,
            dir: Some(dir),
            released: false,
        })
    }

    /// Claim `path` by creating it empty. Fails with
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if anything
    /// is already there, in which case nothing was touched.
    pub(crate) fn reserve(path: PathBuf) -> Result<Self> {
        create_new(&path)?;
        Ok(Self {
            path,
            dir: None,
            released: false,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the scratch file, reporting failures to `notifier`.
    pub(crate) fn release(mut self, notifier: &dyn Notifier) {
        self.released = true;
        if let Err((path, e)) = self.cleanup() {
            tracing::error!(path = %path.display(), error = %e, "Failed to remove scratch file");
            notifier.error(&format!("error on removing {} file", path.display()));
        }
    }

    fn cleanup(&mut self) -> std::result::Result<(), (PathBuf, std::io::Error)> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::trace!(path = %self.path.display(), "Removed scratch file"),
            // The kernel is allowed to consume its input.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => return Err((self.path.clone(), e)),
        }
        if let Some(dir) = self.dir.take() {
            let dir_path = dir.path().to_path_buf();
            dir.close().map_err(|e| (dir_path, e))?;
        }
        Ok(())
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err((path, e)) = self.cleanup() {
            tracing::error!(path = %path.display(), error = %e, "Failed to remove scratch file while unwinding");
        }
    }
}
