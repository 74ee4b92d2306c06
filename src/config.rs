//! Model store configuration.
//!
//! Artifact locations, top-N limits and the duplicate-identifier policy,
//! read from a TOML file. Every field has a default, so an empty file (or
//! no file at all) describes the conventional layout:
//!
//! ```text
//! models/user_latent_features.safetensors
//! models/product_latent_features.safetensors
//! models/sigma_matrix.safetensors
//! user_clusters.csv
//! product_clusters.csv
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up next to the model artifacts.
pub const DEFAULT_CONFIG_FILE: &str = "svdrec.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys.
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// What to do when a cluster table lists the same identifier twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first row, log the rest.
    #[default]
    FirstWins,
    /// Fail the load.
    Reject,
}

/// Location of one numeric artifact.
///
/// Written either as a bare path or as `{ path = "...", tensor = "..." }`
/// when a SafeTensors file holds more than one tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TensorSourceRepr")]
pub struct TensorSource {
    /// File path, relative paths resolve against the config's base directory
    pub path: PathBuf,
    /// Tensor name inside a SafeTensors container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tensor: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TensorSourceRepr {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        tensor: Option<String>,
    },
}

impl From<TensorSourceRepr> for TensorSource {
    fn from(repr: TensorSourceRepr) -> Self {
        match repr {
            TensorSourceRepr::Path(path) => Self { path, tensor: None },
            TensorSourceRepr::Detailed { path, tensor } => Self { path, tensor },
        }
    }
}

impl TensorSource {
    /// Source with no tensor name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tensor: None,
        }
    }

    /// Select a named tensor inside the container.
    #[must_use]
    pub fn with_tensor(mut self, name: impl Into<String>) -> Self {
        self.tensor = Some(name.into());
        self
    }
}

/// Paths of the five model artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactPaths {
    /// U: one row per user
    pub user_factors: TensorSource,
    /// Vt: one column per product
    pub product_factors: TensorSource,
    /// Σ: k×k diagonal or length-k vector
    pub singular_values: TensorSource,
    /// CSV with `userid,cluster`
    pub user_clusters: PathBuf,
    /// CSV with `productid,product_cluster`
    pub product_clusters: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            user_factors: TensorSource::new("models/user_latent_features.safetensors"),
            product_factors: TensorSource::new("models/product_latent_features.safetensors"),
            singular_values: TensorSource::new("models/sigma_matrix.safetensors"),
            user_clusters: PathBuf::from("user_clusters.csv"),
            product_clusters: PathBuf::from("product_clusters.csv"),
        }
    }
}

/// Bounds on the caller's top-N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Used when the caller gives no count
    pub default_top_n: usize,
    /// Largest accepted count
    pub max_top_n: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            max_top_n: 50,
        }
    }
}

/// Complete model store configuration.
///
/// # Examples
///
/// ```
/// use svd_recommender::config::{DuplicatePolicy, StoreConfig};
///
/// let config = StoreConfig::from_toml_str(r#"
///     duplicate_ids = "reject"
///     [limits]
///     max_top_n = 20
/// "#).expect("valid config");
/// assert_eq!(config.limits.max_top_n, 20);
/// assert_eq!(config.limits.default_top_n, 10);
/// assert_eq!(config.duplicate_ids, DuplicatePolicy::Reject);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory relative artifact paths resolve against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// Artifact locations
    pub artifacts: ArtifactPaths,
    /// Top-N bounds
    pub limits: Limits,
    /// Duplicate identifier handling
    pub duplicate_ids: DuplicatePolicy,
}

impl StoreConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error on TOML syntax errors, unknown keys or invalid limits.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Reads a TOML config file.
    ///
    /// A missing or relative `base_dir` is taken relative to the directory
    /// holding the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content, path)?;

        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        config.base_dir = Some(match config.base_dir.take() {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => parent.join(dir),
            None => parent.to_path_buf(),
        });
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the base directory.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Checks limit consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless `1 <= default_top_n <= max_top_n`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Limits {
            default_top_n,
            max_top_n,
        } = self.limits;
        if max_top_n == 0 {
            return Err(ConfigError::Invalid("limits.max_top_n must be >= 1".into()));
        }
        if default_top_n == 0 || default_top_n > max_top_n {
            return Err(ConfigError::Invalid(format!(
                "limits.default_top_n = {default_top_n}, expected 1..={max_top_n}"
            )));
        }
        Ok(())
    }

    /// Resolves an artifact path against the base directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
