//! Filesystem helpers that map I/O failures onto [`ErrorKind`].

use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tempfile::Builder;

pub(crate) fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    }
}

pub(crate) fn read(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path).map_err(|e| map_io_error(e, path))?)
}

pub(crate) fn write(path: &Path, data: &[u8]) -> Result<()> {
    Ok(fs::write(path, data).map_err(|e| map_io_error(e, path))?)
}

/// Create an empty file, failing with [`AlreadyExists`](ErrorKind::AlreadyExists)
/// if anything is already there. Doubles as an atomic existence check.
pub(crate) fn create_new(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().write(true).create_new(true).open(path).map_err(|e| map_io_error(e, path))?)
}

/// Write `data` to a hidden sibling in `dir`, then rename it over `target`.
///
/// The rename replaces an existing `target` in one step, so readers see
/// either the old archive or the new one, never a gap. The staged file is
/// removed if anything fails before the rename.
///
/// A replaced `target` keeps its permissions; a new one gets the mode a plain
/// `create` would (0666 less the umask on Unix).
pub(crate) fn replace(dir: &Path, stem: &OsStr, target: &Path, data: &[u8]) -> Result<()> {
    let mut prefix = std::ffi::OsString::from(".");
    prefix.push(stem);
    prefix.push(".");
    let mut builder = Builder::new();
    builder.prefix(&prefix).suffix(".partial");
    // tempfile defaults to owner-only, which `persist` would carry over.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(dir).map_err(|e| map_io_error(e, dir))?;
    match fs::metadata(target) {
        Ok(existing) => staged
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| map_io_error(e, staged.path()))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => exn::bail!(map_io_error(e, target)),
    }
    tracing::trace!(staged = %staged.path().display(), target = %target.display(), "Staging compressed output");
    staged.write_all(data).map_err(|e| map_io_error(e, staged.path()))?;
    staged.as_file().sync_all().map_err(|e| map_io_error(e, staged.path()))?;
    staged.persist(target).map_err(|e| map_io_error(e.error, target))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_io_error() {
        let path = Path::new("/parts/bracket.stpZ");
        let kind = |k: std::io::ErrorKind| map_io_error(std::io::Error::from(k), path);
        assert!(matches!(kind(std::io::ErrorKind::NotFound), ErrorKind::NotFound(p) if p == path));
        assert!(matches!(kind(std::io::ErrorKind::PermissionDenied), ErrorKind::PermissionDenied(_)));
        assert!(matches!(kind(std::io::ErrorKind::AlreadyExists), ErrorKind::AlreadyExists(_)));
        assert!(matches!(kind(std::io::ErrorKind::InvalidData), ErrorKind::Io(_)));
    }

    #[test]
    fn test_create_new_refuses_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bracket.stp");
        std::fs::write(&path, b"precious").unwrap();
        let err = create_new(&path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"precious");
    }

    #[test]
    fn test_replace_overwrites_and_leaves_nothing_behind() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("bracket.stpZ");
        std::fs::write(&target, b"old").unwrap();
        replace(temp_dir.path(), OsStr::new("bracket"), &target, b"new").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_new_target_follows_umask() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("bracket.stpZ");
        let reference = temp_dir.path().join("reference");
        std::fs::write(&reference, b"plain").unwrap();

        replace(temp_dir.path(), OsStr::new("bracket"), &target, b"new").unwrap();

        // Whatever the process umask is, the archive matches a plain write.
        assert_eq!(mode(&target), mode(&reference));
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("bracket.stpZ");
        std::fs::write(&target, b"old").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o644)).unwrap();

        replace(temp_dir.path(), OsStr::new("bracket"), &target, b"new").unwrap();
        assert_eq!(mode(&target), 0o644);

        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o640)).unwrap();
        replace(temp_dir.path(), OsStr::new("bracket"), &target, b"newer").unwrap();
        assert_eq!(mode(&target), 0o640);
        assert_eq!(std::fs::read(&target).unwrap(), b"newer");
    }

    #[test]
    fn test_replace_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("missing");
        let err = replace(&dir, OsStr::new("bracket"), &dir.join("bracket.stpZ"), b"data").unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
