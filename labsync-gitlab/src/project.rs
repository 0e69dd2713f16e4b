//! Per-project repository endpoints.

use serde_json::json;
use tracing::debug;

use labsync_core::remote::{CommitInfo, ProjectHandle, RemoteFile, TagInfo};
use labsync_core::{ChangesetEntry, ProjectId, RemoteError};

use crate::client::GitlabClient;
use crate::models::{self, CommitRef, FileBody, RefBody, TagBody};

/// Handle onto one GitLab project, addressed by numeric id.
#[derive(Debug, Clone)]
pub struct GitlabProject {
    client: GitlabClient,
    id: ProjectId,
}

impl GitlabProject {
    pub(crate) fn new(client: GitlabClient, id: ProjectId) -> Self {
        Self { client, id }
    }

    fn repo_path(&self, rest: &str) -> String {
        format!("projects/{}/repository/{rest}", self.id)
    }

    fn file_path(&self, path: &str) -> String {
        self.repo_path(&format!("files/{}", urlencoding::encode(path)))
    }
}

impl ProjectHandle for GitlabProject {
    fn id(&self) -> ProjectId {
        self.id
    }

    // Tags are project-wide; GitLab has no per-branch tag filter.
    fn list_tags(&self, _branch: &str) -> Result<Vec<TagInfo>, RemoteError> {
        let tags: Vec<TagBody> = self.client.get_all(&self.repo_path("tags"), &[])?;
        Ok(tags.into_iter().map(TagInfo::from).collect())
    }

    fn get_tag(&self, name: &str) -> Result<TagInfo, RemoteError> {
        let path = self.repo_path(&format!("tags/{}", urlencoding::encode(name)));
        let tag: TagBody = self.client.get_json(&path, &[])?;
        Ok(tag.into())
    }

    fn create_tag(&self, name: &str, reference: &str) -> Result<(), RemoteError> {
        debug!(project = %self.id, tag = name, reference, "creating tag");
        self.client.send_json(
            "POST",
            &self.repo_path("tags"),
            json!({ "tag_name": name, "ref": reference }),
        )
    }

    fn list_commits(&self, branch: &str, limit: usize) -> Result<Vec<CommitInfo>, RemoteError> {
        let per_page = limit.to_string();
        let commits: Vec<CommitRef> = self.client.get_json(
            &self.repo_path("commits"),
            &[("ref_name", branch), ("per_page", per_page.as_str())],
        )?;
        commits
            .into_iter()
            .take(limit)
            .map(|commit| {
                let refs: Vec<RefBody> = self.client.get_json(
                    &self.repo_path(&format!("commits/{}/refs", commit.id)),
                    &[("type", "tag")],
                )?;
                Ok(models::commit_info(commit, models::first_tag(refs)))
            })
            .collect()
    }

    fn file_exists(&self, path: &str, reference: &str) -> Result<bool, RemoteError> {
        self.client.exists(&self.file_path(path), &[("ref", reference)])
    }

    fn get_file(&self, path: &str, reference: &str) -> Result<RemoteFile, RemoteError> {
        let url_path = self.file_path(path);
        let body: FileBody = self.client.get_json(&url_path, &[("ref", reference)])?;
        body.into_remote_file().map_err(|message| RemoteError::Decode {
            url: self.client.url(&url_path),
            message,
        })
    }

    fn save_file(&self, file: &RemoteFile, branch: &str, message: &str) -> Result<(), RemoteError> {
        let (content, encoding) = models::encode_content(&file.content);
        let mut body = json!({
            "branch": branch,
            "content": content,
            "encoding": encoding,
            "commit_message": message,
        });
        if let Some(last) = &file.last_commit_id {
            body["last_commit_id"] = json!(last);
        }
        self.client.send_json("PUT", &self.file_path(&file.path), body)
    }

    fn create_file(
        &self,
        path: &str,
        branch: &str,
        content: &str,
        message: &str,
    ) -> Result<(), RemoteError> {
        self.client.send_json(
            "POST",
            &self.file_path(path),
            json!({ "branch": branch, "content": content, "commit_message": message }),
        )
    }

    fn create_commit(
        &self,
        branch: &str,
        message: &str,
        actions: &[ChangesetEntry],
    ) -> Result<(), RemoteError> {
        self.client.send_json(
            "POST",
            &self.repo_path("commits"),
            json!({ "branch": branch, "commit_message": message, "actions": actions }),
        )
    }

    // Tagging never edits project attributes, so there is nothing to PUT.
    fn save(&self) -> Result<(), RemoteError> {
        debug!(project = %self.id, "project record unchanged; nothing to save");
        Ok(())
    }
}
