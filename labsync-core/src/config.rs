//! Settings file and environment credentials.
//!
//! # Storage layout
//!
//! ```text
//! ~/.labsync/
//!   config.yaml
//! ```
//!
//! # API pattern
//!
//! - `load_at(path)`: explicit file; used by tests and `--config`
//! - `load()`: derives `~/.labsync/config.yaml` from `dirs::home_dir()`
//!
//! Tokens are read from the environment only, never from the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Category, GroupId};

/// Private/personal access token used for API calls.
pub const PRIVATE_TOKEN_VAR: &str = "LABSYNC_PRIVATE_TOKEN";
/// CI job token embedded into clone URLs.
pub const JOB_TOKEN_VAR: &str = "CI_JOB_TOKEN";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the hosting service, e.g. `https://gitlab.example.com`.
    pub host: String,
    /// Tracked branch for every tag, commit and file operation.
    #[serde(default = "default_branch")]
    pub branch: String,
    pub groups: GroupLayout,
    #[serde(default)]
    pub workspace: WorkspaceLayout,
    #[serde(default)]
    pub messages: CommitMessages,
}

/// Group ids that anchor the two-level traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub top: GroupId,
    pub common: GroupId,
}

/// Local directory layout: one directory per category under `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceLayout {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_common_dir")]
    pub common_dir: String,
    #[serde(default = "default_domain_dir")]
    pub domain_dir: String,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            root: default_root(),
            common_dir: default_common_dir(),
            domain_dir: default_domain_dir(),
        }
    }
}

impl WorkspaceLayout {
    /// `<root>/<common_dir|domain_dir>` (pure, no I/O).
    pub fn category_dir(&self, category: Category) -> PathBuf {
        match category {
            Category::Common => self.root.join(&self.common_dir),
            Category::Domain => self.root.join(&self.domain_dir),
        }
    }
}

/// Fixed commit messages for published artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessages {
    #[serde(default = "default_update_message")]
    pub update: String,
    #[serde(default = "default_create_message")]
    pub create: String,
    #[serde(default = "default_update_message")]
    pub batch: String,
}

impl Default for CommitMessages {
    fn default() -> Self {
        Self {
            update: default_update_message(),
            create: default_create_message(),
            batch: default_update_message(),
        }
    }
}

fn default_branch() -> String {
    "main".to_owned()
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_common_dir() -> String {
    "common_rule".to_owned()
}

fn default_domain_dir() -> String {
    "data_domain".to_owned()
}

fn default_update_message() -> String {
    "auto generate consolidate file".to_owned()
}

fn default_create_message() -> String {
    "CI/CD: Auto-generated consolidated expectation suite".to_owned()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Tokens taken from the process environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub private_token: Option<String>,
    pub job_token: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            private_token: non_empty_var(PRIVATE_TOKEN_VAR),
            job_token: non_empty_var(JOB_TOKEN_VAR),
        }
    }
}

// Never print token values.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("private_token", &self.private_token.as_ref().map(|_| "***"))
            .field("job_token", &self.job_token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// `<home>/.labsync/config.yaml` (pure, no I/O).
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".labsync").join("config.yaml")
}

/// Load settings from an explicit file.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `load_at(~/.labsync/config.yaml)` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    load_at(&config_path_at(&home()?))
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
