//! Error types for labsync-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use labsync_core::{ProjectId, ProjectName, RegistryError, RemoteError};

/// Errors from publishing or tagging.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Project could not be resolved; nothing was sent to the remote.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A probe, write or tag call failed before anything was committed.
    #[error("remote call failed for '{project}' (id {project_id}): {source}")]
    Remote {
        project: ProjectName,
        project_id: ProjectId,
        #[source]
        source: RemoteError,
    },

    /// Content was committed but the follow-up tag was not created.
    /// Re-tag the project instead of re-publishing the content.
    #[error("content committed to '{project}' (id {project_id}) but tagging failed: {source}")]
    PartialPublish {
        project: ProjectName,
        project_id: ProjectId,
        #[source]
        source: RemoteError,
    },

    #[error("nothing to publish to '{project}': no files given")]
    EmptyChangeset { project: ProjectName },
}

/// Errors from reading a published artifact back.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("remote call failed for '{project}' (id {project_id}): {source}")]
    Remote {
        project: ProjectName,
        project_id: ProjectId,
        #[source]
        source: RemoteError,
    },

    #[error("{path} at tag {tag} of '{project}' is not valid JSON: {source}")]
    Json {
        project: ProjectName,
        tag: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of an external version-control command.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Which per-project step of a mirror sync failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Pull,
    Clone,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStep::Pull => write!(f, "pull"),
            SyncStep::Clone => write!(f, "clone"),
        }
    }
}

/// One project's pull or clone failure. Never aborts the batch.
#[derive(Debug)]
pub struct SyncStepFailure {
    pub project: ProjectName,
    pub project_id: ProjectId,
    pub step: SyncStep,
    pub path: PathBuf,
    pub error: VcsError,
}

impl fmt::Display for SyncStepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of '{}' (id {}) into {} failed: {}",
            self.step,
            self.project,
            self.project_id,
            self.path.display(),
            self.error
        )
    }
}

/// Errors from a mirror sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A category directory could not be created; nothing was pulled or cloned.
    #[error("cannot create category directory {path}: {source}")]
    CategoryDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every per-project failure of the run.
    #[error("{} project(s) failed to sync:\n{}", .0.len(), list_failures(.0))]
    Steps(Vec<SyncStepFailure>),
}

fn list_failures(failures: &[SyncStepFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(name: &str, step: SyncStep) -> SyncStepFailure {
        SyncStepFailure {
            project: ProjectName::from(name),
            project_id: ProjectId(5),
            step,
            path: PathBuf::from("/work/data_domain").join(name),
            error: VcsError::Failed {
                command: "git pull".to_owned(),
                status: "exit status: 1".to_owned(),
                stderr: "fatal: not a git repository".to_owned(),
            },
        }
    }

    #[test]
    fn steps_error_lists_every_failure() {
        let err = SyncError::Steps(vec![failure("alpha", SyncStep::Pull), failure("beta", SyncStep::Clone)]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 project(s) failed to sync"));
        assert!(msg.contains("pull of 'alpha' (id 5)"));
        assert!(msg.contains("clone of 'beta' (id 5)"));
    }

    #[test]
    fn partial_publish_names_project_and_id() {
        let err = PublishError::PartialPublish {
            project: ProjectName::from("payments"),
            project_id: ProjectId(42),
            source: RemoteError::Transport {
                url: "u".to_owned(),
                message: "timeout".to_owned(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("'payments'"));
        assert!(msg.contains("id 42"));
        assert!(msg.contains("tagging failed"));
    }
}
