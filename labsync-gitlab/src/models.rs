//! GitLab REST v4 response bodies and their conversions into core records.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use labsync_core::remote::{CommitInfo, GroupSummary, RemoteFile, RemoteProject, TagInfo};
use labsync_core::{GroupId, ProjectId};

#[derive(Debug, Deserialize)]
pub(crate) struct GroupBody {
    pub id: u64,
    #[serde(default)]
    pub full_path: String,
}

impl From<GroupBody> for GroupSummary {
    fn from(g: GroupBody) -> Self {
        GroupSummary {
            id: GroupId(g.id),
            name: g.full_path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectBody {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    pub http_url_to_repo: String,
}

impl From<ProjectBody> for RemoteProject {
    fn from(p: ProjectBody) -> Self {
        RemoteProject {
            id: ProjectId(p.id),
            name: p.name,
            path_with_namespace: p.path_with_namespace,
            http_url_to_repo: p.http_url_to_repo,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagBody {
    pub name: String,
    pub commit: Option<CommitRef>,
}

impl From<TagBody> for TagInfo {
    fn from(t: TagBody) -> Self {
        TagInfo {
            name: t.name,
            commit_id: t.commit.map(|c| c.id),
        }
    }
}

/// Entry of `GET /projects/:id/repository/commits/:sha/refs`.
#[derive(Debug, Deserialize)]
pub(crate) struct RefBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

/// First tag ref pointing at a commit, if any.
pub(crate) fn first_tag(refs: Vec<RefBody>) -> Option<String> {
    refs.into_iter().find(|r| r.kind == "tag").map(|r| r.name)
}

pub(crate) fn commit_info(commit: CommitRef, tag: Option<String>) -> CommitInfo {
    CommitInfo { id: commit.id, tag }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileBody {
    pub file_path: String,
    pub content: String,
    #[serde(default)]
    pub encoding: String,
    pub last_commit_id: Option<String>,
}

impl FileBody {
    /// Decode the `content` field into raw bytes. Non-text files are fine.
    pub(crate) fn into_remote_file(self) -> Result<RemoteFile, String> {
        let content = decode_content(&self.content, &self.encoding)?;
        Ok(RemoteFile {
            path: self.file_path,
            content,
            last_commit_id: self.last_commit_id,
        })
    }
}

pub(crate) fn decode_content(content: &str, encoding: &str) -> Result<Vec<u8>, String> {
    if encoding != "base64" {
        return Ok(content.as_bytes().to_vec());
    }
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| format!("invalid base64 content: {e}"))
}

/// Request body fields for writing `content` back: text as-is, anything
/// else base64 encoded.
pub(crate) fn encode_content(content: &[u8]) -> (String, &'static str) {
    match std::str::from_utf8(content) {
        Ok(text) => (text.to_owned(), "text"),
        Err(_) => (STANDARD.encode(content), "base64"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsync_core::RemoteError;

    #[test]
    fn project_body_maps_to_remote_project() {
        let body: ProjectBody = serde_json::from_str(
            r#"{"id": 42, "name": "Payments", "path_with_namespace": "org/domain/payments",
                "http_url_to_repo": "https://gitlab.example.com/org/domain/payments.git",
                "default_branch": "main"}"#,
        )
        .unwrap();
        let project = RemoteProject::from(body);
        assert_eq!(project.id, ProjectId(42));
        assert_eq!(project.name, "Payments");
        assert_eq!(project.path_with_namespace, "org/domain/payments");
    }

    #[test]
    fn tag_body_keeps_commit_id() {
        let body: TagBody =
            serde_json::from_str(r#"{"name": "7", "commit": {"id": "abc123", "title": "x"}}"#)
                .unwrap();
        let tag = TagInfo::from(body);
        assert_eq!(tag.name, "7");
        assert_eq!(tag.commit_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn first_tag_skips_branch_refs() {
        let refs: Vec<RefBody> = serde_json::from_str(
            r#"[{"type": "branch", "name": "main"}, {"type": "tag", "name": "3"}]"#,
        )
        .unwrap();
        assert_eq!(first_tag(refs), Some("3".to_owned()));
        assert_eq!(first_tag(vec![]), None);
    }

    #[test]
    fn base64_file_content_is_decoded() {
        let body: FileBody = serde_json::from_str(
            r#"{"file_path": "suite.json", "content": "eyJhIjogMX0=",
                "encoding": "base64", "last_commit_id": "c1"}"#,
        )
        .unwrap();
        let file = body.into_remote_file().unwrap();
        assert_eq!(file.text().unwrap(), r#"{"a": 1}"#);
        assert_eq!(file.last_commit_id.as_deref(), Some("c1"));
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        assert_eq!(decode_content("aGVs\nbG8=\n", "base64").unwrap(), b"hello");
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(decode_content("***", "base64").is_err());
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(decode_content("hello", "text").unwrap(), b"hello");
    }

    #[test]
    fn binary_file_decodes_to_bytes() {
        let body: FileBody = serde_json::from_str(
            r#"{"file_path": "logo.png", "content": "/w==", "encoding": "base64"}"#,
        )
        .unwrap();
        let file = body.into_remote_file().unwrap();
        assert_eq!(file.content, vec![0xff]);
        assert!(matches!(file.text(), Err(RemoteError::Decode { .. })));
    }

    #[test]
    fn content_is_encoded_for_writing() {
        assert_eq!(encode_content(b"{}"), ("{}".to_owned(), "text"));
        assert_eq!(encode_content(&[0xff]), ("/w==".to_owned(), "base64"));
    }
}
