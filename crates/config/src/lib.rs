//! Configuration loading and validation.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file, either explicit or `config.toml` in the platform config
//!    directory (see [`Config::default_path`])
//! 3. Environment variables prefixed with `STEPZ_`, with `__` separating
//!    nested keys (`STEPZ_FORMATS__ARCHIVE=stpz`)
//!
//! ```toml
//! scratch_dir = "/var/tmp/stepz"
//!
//! [formats]
//! plain = "stp"
//! archive = "stpZ"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "STEPZ_";
const CONFIG_FILE: &str = "config.toml";

/// File extensions for the two sides of the transcoder, without leading dots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formats {
    /// Extension of the plain STEP file handed to the CAD kernel.
    pub plain: String,
    /// Extension of the gzip archive.
    pub archive: String,
}
impl Default for Formats {
    fn default() -> Self {
        Self {
            plain: "stp".to_string(),
            archive: "stpZ".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub formats: Formats,
    /// Root under which imports are staged. Falls back to the system
    /// temporary directory.
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    /// Load from the platform config file (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment(Self::default_path().as_deref()))
    }

    /// Load from an explicit TOML file and the environment. A missing file is
    /// not an error; figment treats it as an empty source.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::extract(Self::figment(Some(path.as_ref())))
    }

    /// Location of the per-user configuration file, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "stepz", "stepz").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Layering configuration file");
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject extensions that would break path derivation.
    pub fn validate(&self) -> Result<()> {
        validate_extension("plain", &self.formats.plain)?;
        validate_extension("archive", &self.formats.archive)?;
        if self.formats.plain == self.formats.archive {
            exn::bail!(ErrorKind::Invalid(format!(
                "plain and archive extensions are both `{}`",
                self.formats.plain
            )));
        }
        Ok(())
    }

    /// Directory under which import scratch files are created.
    #[must_use]
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn validate_extension(which: &str, ext: &str) -> Result<()> {
    if ext.is_empty() {
        exn::bail!(ErrorKind::Invalid(format!("{which} extension is empty")));
    }
    if ext.contains(['.', '/', '\\', '\0']) {
        exn::bail!(ErrorKind::Invalid(format!("{which} extension `{ext}` contains a reserved character")));
    }
    Ok(())
}
