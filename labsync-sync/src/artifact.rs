//! Read a published artifact back at a given tag.

use labsync_core::{ProjectHandle, RemoteError};

/// Decoded text of `path` as of `tag`.
///
/// The tag is resolved to its commit first so the read is pinned even if the
/// tag is later moved.
pub fn read_text_at_tag<P>(project: &P, tag: &str, path: &str) -> Result<String, RemoteError>
where
    P: ProjectHandle + ?Sized,
{
    let info = project.get_tag(tag)?;
    let reference = info.commit_id.as_deref().unwrap_or(tag);
    let file = project.get_file(path, reference)?;
    Ok(file.text()?.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsync_core::memory::InMemoryHost;
    use labsync_core::{ProjectId, ProjectSource};

    const ID: ProjectId = ProjectId(4);

    #[test]
    fn reads_content_as_of_the_tagged_commit() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_file(ID, "suite.json", r#"{"v": 1}"#);
        host.add_commit(ID, Some("1"));
        host.add_file(ID, "suite.json", r#"{"v": 2}"#);
        host.add_commit(ID, Some("2"));

        let project = host.open(ID).unwrap();
        assert_eq!(read_text_at_tag(&project, "1", "suite.json").unwrap(), r#"{"v": 1}"#);
        assert_eq!(read_text_at_tag(&project, "2", "suite.json").unwrap(), r#"{"v": 2}"#);
    }

    #[test]
    fn binary_content_is_a_decode_error() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_binary_file(ID, "logo.png", &[0x89, 0xff]);
        host.add_commit(ID, Some("1"));
        let project = host.open(ID).unwrap();
        let err = read_text_at_tag(&project, "1", "logo.png").unwrap_err();
        assert!(matches!(err, RemoteError::Decode { .. }), "got: {err}");
    }

    #[test]
    fn unknown_tag_is_not_found() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        let project = host.open(ID).unwrap();
        let err = read_text_at_tag(&project, "9", "suite.json").unwrap_err();
        assert!(err.is_not_found());
    }
}
