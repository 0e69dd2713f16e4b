//! Error types for labsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::GroupId;

/// Failures reported by a hosting-service adapter.
///
/// `NotFound` is the "does-not-exist" signal; every other variant is a
/// transport, auth or protocol failure and must never be read as "missing".
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The requested resource does not exist (HTTP 404 or equivalent).
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The service answered with a non-success status.
    #[error("{url} returned status {status}: {body}")]
    Status { status: u16, url: String, body: String },

    /// The response body could not be decoded.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound { .. })
    }
}

/// Errors from building or querying the project registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No registered project matches the (case-insensitive) name.
    #[error("project '{name}' is not in the registry")]
    NotFound { name: String },

    /// Listing a group failed while walking the group tree.
    #[error("failed to list group {group}: {source}")]
    Traversal {
        group: GroupId,
        #[source]
        source: RemoteError,
    },
}

/// Errors from locating or parsing the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the settings file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The settings file does not exist.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,
}
