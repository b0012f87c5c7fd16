//! Archive naming.
//!
//! An archive identifies its document through the base name, i.e. the file
//! name minus its last extension. Every path the transcoder touches (the
//! staged plain file, the plain sibling checked for collisions, the archive
//! itself) is derived from that base name.

use crate::error::{ErrorKind, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use stepz_config::Formats;

/// A validated (directory, base name) pair taken from an archive path.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use stepz::ArchiveName;
/// use stepz_config::Formats;
///
/// let name = ArchiveName::new("/parts/bracket.v2.stpZ").unwrap();
/// let formats = Formats::default();
/// assert_eq!(name.base(), "bracket.v2");
/// assert_eq!(name.plain_sibling(&formats), Path::new("/parts/bracket.v2.stp"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveName {
    dir: PathBuf,
    base: OsString,
}

impl ArchiveName {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let invalid = || ErrorKind::InvalidPath(path.to_path_buf());
        // `file_stem` is `None` for `..` and for paths ending in `/`-less roots.
        let Some(base) = path.file_stem() else {
            exn::bail!(invalid());
        };
        // Null bytes pass through Path on Unix but truncate in C-based syscalls,
        // and the kernel is a C++ library.
        if base.is_empty() || base.as_encoded_bytes().contains(&0) {
            exn::bail!(invalid());
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self { dir, base: base.to_os_string() })
    }

    /// Directory the archive lives in (`.` for bare file names).
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn base(&self) -> &OsStr {
        &self.base
    }

    /// `<base>.<ext>`
    #[must_use]
    pub fn file_name(&self, ext: &str) -> OsString {
        let mut name = self.base.clone();
        name.push(".");
        name.push(ext);
        name
    }

    /// File name of the plain file handed to the kernel.
    #[must_use]
    pub fn plain_name(&self, formats: &Formats) -> OsString {
        self.file_name(&formats.plain)
    }

    /// The plain file next to the archive; export stages here.
    #[must_use]
    pub fn plain_sibling(&self, formats: &Formats) -> PathBuf {
        self.dir.join(self.plain_name(formats))
    }

    /// `<base>.<archive>` in the same directory; export writes here.
    #[must_use]
    pub fn archive_path(&self, formats: &Formats) -> PathBuf {
        self.dir.join(self.file_name(&formats.archive))
    }
}

/// Whether `path` carries exactly the archive extension (case-sensitive).
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension() == Some(OsStr::new(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/parts/bracket.stpZ", "/parts", "bracket")]
    #[case("bracket.stpZ", ".", "bracket")]
    #[case("/parts/bracket.v2.stpZ", "/parts", "bracket.v2")]
    #[case("/parts/bracket", "/parts", "bracket")]
    // A leading dot is part of the name, not an extension (like `.bashrc`).
    #[case("/parts/.stpZ", "/parts", ".stpZ")]
    #[case("/parts/Träger-ü.stpZ", "/parts", "Träger-ü")]
    fn test_new(#[case] path: &str, #[case] dir: &str, #[case] base: &str) {
        let name = ArchiveName::new(path).unwrap();
        assert_eq!(name.dir(), Path::new(dir));
        assert_eq!(name.base(), base);
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("/parts/..")]
    #[case("/parts/a\0b.stpZ")]
    fn test_new_invalid(#[case] path: &str) {
        let err = ArchiveName::new(path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_derived_paths() {
        let formats = Formats::default();
        let name = ArchiveName::new("/parts/bracket.stpZ").unwrap();
        assert_eq!(name.plain_name(&formats), "bracket.stp");
        assert_eq!(name.plain_sibling(&formats), Path::new("/parts/bracket.stp"));
        assert_eq!(name.archive_path(&formats), Path::new("/parts/bracket.stpZ"));
    }

    #[rstest]
    #[case("/parts/bracket.stpZ", "stpZ", true)]
    #[case("/parts/bracket.stpz", "stpZ", false)]
    #[case("/parts/bracket.stp", "stpZ", false)]
    #[case("/parts/bracket", "stpZ", false)]
    fn test_has_extension(#[case] path: &str, #[case] ext: &str, #[case] expected: bool) {
        assert_eq!(has_extension(Path::new(path), ext), expected);
    }
}
