//! Open, insert and export compressed STEP archives.

use crate::error::{ErrorKind, Result};
use crate::fs;
use crate::kernel::{CadKernel, KernelOperation};
use crate::name::{ArchiveName, has_extension};
use crate::notify::{Notifier, TracingNotifier};
use crate::scratch::ScratchFile;
use exn::ResultExt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use stepz_compress::Compression;
use stepz_compress::error::ErrorKind as CompressionErrorKind;
use stepz_config::{Config, Formats};
use tracing::instrument;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The result of a (successful) export.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The archive was written to this path.
    Written(PathBuf),
    /// A plain file with the archive's base name already exists at this path.
    /// Nothing was written and the kernel was never called; the user has been
    /// warned through the notifier.
    Collision(PathBuf),
}

/// Bridges gzip archives and a [`CadKernel`] that only understands plain files.
///
/// Imports decompress the archive to a private scratch directory (under the
/// configured scratch root), hand `<base>.<plain>` to the kernel, then remove
/// it. Exports have the kernel write `<base>.<plain>` next to the destination,
/// compress it into place and remove the plain file. Scratch files are removed
/// on every exit path, and failing to remove one never fails the call.
///
/// # Examples
///
/// ```no_run
/// use stepz::{ExportOutcome, Transcoder};
/// # use stepz::CadKernel;
/// # fn example<K: CadKernel>(kernel: K, objects: &[K::Object]) -> stepz::error::Result<()> {
/// let config = stepz::Config::load().map_err(stepz::error::ErrorKind::config)?;
/// let transcoder = Transcoder::new(kernel, &config)?;
/// match transcoder.export(objects, "/parts/bracket.stpZ")? {
///     ExportOutcome::Written(path) => println!("wrote {}", path.display()),
///     ExportOutcome::Collision(path) => println!("{} is in the way", path.display()),
/// }
/// let document = transcoder.open("/parts/bracket.stpZ")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Transcoder<K, N = TracingNotifier> {
    kernel: K,
    notifier: N,
    formats: Formats,
    scratch_root: PathBuf,
}

impl<K: CadKernel> Transcoder<K> {
    /// Create a transcoder that reports through [`tracing`].
    pub fn new(kernel: K, config: &Config) -> Result<Self> {
        config.validate().map_err(ErrorKind::config)?;
        Ok(Self {
            kernel,
            notifier: TracingNotifier,
            formats: config.formats.clone(),
            scratch_root: config.scratch_root(),
        })
    }
}

impl<K: CadKernel, N: Notifier> Transcoder<K, N> {
    /// Swap the notification channel, e.g. for one that raises host dialogs.
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> Transcoder<K, M> {
        Transcoder {
            kernel: self.kernel,
            notifier,
            formats: self.formats,
            scratch_root: self.scratch_root,
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn formats(&self) -> &Formats {
        &self.formats
    }

    /// Open an archive as a new document.
    ///
    /// # Errors
    /// - [`NotFound`](ErrorKind::NotFound) if the archive doesn't exist
    /// - [`Compression`](ErrorKind::Compression) if it isn't a valid gzip stream
    /// - [`Kernel`](ErrorKind::Kernel) if the importer fails
    #[instrument(skip_all, fields(archive = %archive.as_ref().display()))]
    pub fn open(&self, archive: impl AsRef<Path>) -> Result<K::Document> {
        let archive = archive.as_ref();
        self.banner();
        let scratch = self.stage(archive)?;
        let document = self.kernel.open(scratch.path()).or_raise(|| ErrorKind::Kernel {
            operation: KernelOperation::Open,
            path: archive.to_path_buf(),
        })?;
        scratch.release(&self.notifier);
        tracing::info!("Opened compressed archive");
        Ok(document)
    }

    /// Import an archive into an existing document.
    ///
    /// Same staging, cleanup and errors as [`open`](Self::open).
    #[instrument(skip_all, fields(archive = %archive.as_ref().display()))]
    pub fn insert(&self, archive: impl AsRef<Path>, document: &mut K::Document) -> Result<()> {
        let archive = archive.as_ref();
        self.banner();
        let scratch = self.stage(archive)?;
        self.kernel.insert(scratch.path(), document).or_raise(|| ErrorKind::Kernel {
            operation: KernelOperation::Insert,
            path: archive.to_path_buf(),
        })?;
        scratch.release(&self.notifier);
        tracing::info!("Inserted compressed archive");
        Ok(())
    }

    /// Export `objects` to a compressed archive at `destination`.
    ///
    /// The kernel writes the plain file next to `destination`. If a file with
    /// that name already exists, the export stops before touching anything and
    /// returns [`ExportOutcome::Collision`]. An existing archive at
    /// `destination` is replaced atomically.
    ///
    /// # Errors
    /// - [`InvalidPath`](ErrorKind::InvalidPath) if `destination` doesn't end
    ///   in the archive extension
    /// - [`NotFound`](ErrorKind::NotFound) if the destination directory is missing
    /// - [`Kernel`](ErrorKind::Kernel) if the exporter fails
    #[instrument(skip_all, fields(destination = %destination.as_ref().display(), objects = objects.len()))]
    pub fn export(&self, objects: &[K::Object], destination: impl AsRef<Path>) -> Result<ExportOutcome> {
        let destination = destination.as_ref();
        self.banner();
        if !has_extension(destination, &self.formats.archive) {
            exn::bail!(ErrorKind::InvalidPath(destination.to_path_buf()));
        }
        let name = ArchiveName::new(destination)?;
        let plain_path = name.plain_sibling(&self.formats);

        let plain = match ScratchFile::reserve(plain_path.clone()) {
            Ok(plain) => plain,
            Err(e) if matches!(e.deref(), ErrorKind::AlreadyExists(_)) => {
                let text = format!(
                    "File cannot be compressed because a file with the same name exists '{}'",
                    plain_path.display()
                );
                self.notifier.warning(&text);
                self.notifier.alert(&text);
                return Ok(ExportOutcome::Collision(plain_path));
            },
            Err(e) => return Err(e),
        };

        self.kernel.export(objects, plain.path()).or_raise(|| ErrorKind::Kernel {
            operation: KernelOperation::Export,
            path: plain_path.clone(),
        })?;
        let contents = fs::read(plain.path())?;
        let compressed = Compression::Gzip.compress(&contents).map_err(ErrorKind::compression)?;
        fs::replace(name.dir(), name.base(), &name.archive_path(&self.formats), &compressed)?;
        plain.release(&self.notifier);

        tracing::info!(plain_size = contents.len(), compressed_size = compressed.len(), "Exported compressed archive");
        Ok(ExportOutcome::Written(destination.to_path_buf()))
    }

    fn banner(&self) {
        self.notifier.message(&format!("{} version {VERSION}", self.formats.archive));
    }

    /// Decompress `archive` into a fresh scratch file named after it.
    ///
    /// Nothing is written until the archive has decoded successfully.
    fn stage(&self, archive: &Path) -> Result<ScratchFile> {
        let name = ArchiveName::new(archive)?;
        let compressed = fs::read(archive)?;
        if !Compression::Gzip.check_magic_bytes(&compressed) {
            exn::bail!(ErrorKind::Compression(CompressionErrorKind::InvalidData));
        }
        let contents = Compression::Gzip.decompress(&compressed).map_err(ErrorKind::compression)?;

        let scratch = ScratchFile::stage_in(&self.scratch_root, &name.plain_name(&self.formats))?;
        fs::write(scratch.path(), &contents)?;
        tracing::debug!(
            scratch = %scratch.path().display(),
            compressed_size = compressed.len(),
            plain_size = contents.len(),
            "Staged plain file for kernel"
        );
        Ok(scratch)
    }
}
