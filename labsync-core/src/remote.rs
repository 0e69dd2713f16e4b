//! Capability traits over the hosting service.
//!
//! The registry, tag allocator, publisher and mirror depend only on these
//! traits. `labsync-gitlab` implements them over the REST API; the
//! `test-util` feature provides an in-memory implementation.

use crate::error::RemoteError;
use crate::types::{ChangesetEntry, GroupId, ProjectId};

/// A group as returned by a subgroup listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
}

/// A project as returned by a group's project listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProject {
    pub id: ProjectId,
    /// Display name; not yet normalized.
    pub name: String,
    pub path_with_namespace: String,
    pub http_url_to_repo: String,
}

/// A tag and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub commit_id: Option<String>,
}

/// A commit on the tracked branch, newest first in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    /// Name of a tag pointing at this commit, if any.
    pub tag: Option<String>,
}

/// A file fetched from a project at some ref.
///
/// Content is kept as raw bytes; text is only required by callers that read
/// it as text, so binary files can still be probed and overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub content: Vec<u8>,
    /// Commit that last touched the file, used for optimistic updates.
    pub last_commit_id: Option<String>,
}

impl RemoteFile {
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into().into_bytes();
    }

    /// Content as UTF-8 text.
    pub fn text(&self) -> Result<&str, RemoteError> {
        std::str::from_utf8(&self.content).map_err(|e| RemoteError::Decode {
            url: self.path.clone(),
            message: format!("file is not UTF-8 text: {e}"),
        })
    }
}

/// Group-tree discovery.
pub trait GroupSource {
    /// Direct subgroups of `group`, every page.
    fn list_subgroups(&self, group: GroupId) -> Result<Vec<GroupSummary>, RemoteError>;

    /// Projects living directly in `group`.
    fn list_projects(&self, group: GroupId) -> Result<Vec<RemoteProject>, RemoteError>;
}

/// Opens project handles by id.
pub trait ProjectSource {
    type Handle: ProjectHandle;

    fn open(&self, id: ProjectId) -> Result<Self::Handle, RemoteError>;
}

/// Per-project capabilities used by tagging and publishing.
pub trait ProjectHandle {
    fn id(&self) -> ProjectId;

    /// Every tag on the project.
    fn list_tags(&self, branch: &str) -> Result<Vec<TagInfo>, RemoteError>;

    /// Look up a single tag by name. `NotFound` if absent.
    fn get_tag(&self, name: &str) -> Result<TagInfo, RemoteError>;

    /// Create tag `name` pointing at `reference` (a branch or commit).
    fn create_tag(&self, name: &str, reference: &str) -> Result<(), RemoteError>;

    /// Most recent commits on `branch`, newest first, at most `limit`.
    fn list_commits(&self, branch: &str, limit: usize) -> Result<Vec<CommitInfo>, RemoteError>;

    /// Whether `path` exists at `reference`, without downloading it.
    /// Only a does-not-exist answer is `false`; other failures propagate.
    fn file_exists(&self, path: &str, reference: &str) -> Result<bool, RemoteError>;

    /// Fetch `path` at `reference`. `RemoteError::NotFound` if it does not exist.
    fn get_file(&self, path: &str, reference: &str) -> Result<RemoteFile, RemoteError>;

    /// Commit the (modified) `file` back to `branch`.
    fn save_file(&self, file: &RemoteFile, branch: &str, message: &str) -> Result<(), RemoteError>;

    fn create_file(
        &self,
        path: &str,
        branch: &str,
        content: &str,
        message: &str,
    ) -> Result<(), RemoteError>;

    /// Apply every entry as one commit on `branch`.
    fn create_commit(
        &self,
        branch: &str,
        message: &str,
        actions: &[ChangesetEntry],
    ) -> Result<(), RemoteError>;

    /// Persist pending project attribute changes.
    fn save(&self) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_requires_utf8_but_content_does_not() {
        let mut file = RemoteFile {
            path: "logo.png".to_owned(),
            content: vec![0x89, 0xff],
            last_commit_id: None,
        };
        assert!(matches!(file.text(), Err(RemoteError::Decode { .. })));

        file.set_content("plain");
        assert_eq!(file.text().unwrap(), "plain");
    }
}
