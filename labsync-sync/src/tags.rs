//! Monotonic integer tags.
//!
//! Only purely numeric tag names count: the next tag is `max + 1`, or `1`
//! when none exist. Comparison is numeric, so `"10"` sorts above `"9"`.
//! Values are decimal strings of any width, so no existing tag is ever too
//! large to count.

use tracing::{debug, info, warn};

use labsync_core::{ProjectHandle, RemoteError};

/// Tag operations scoped to the tracked branch.
#[derive(Debug, Clone, Copy)]
pub struct TagAllocator<'a> {
    branch: &'a str,
}

impl<'a> TagAllocator<'a> {
    pub fn new(branch: &'a str) -> Self {
        Self { branch }
    }

    /// Next tag value from the project's current tags. No side effects.
    pub fn next_tag<P>(&self, project: &P) -> Result<String, RemoteError>
    where
        P: ProjectHandle + ?Sized,
    {
        let tags = project.list_tags(self.branch)?;
        Ok(next_tag_from(tags.iter().map(|t| t.name.as_str())))
    }

    /// Tag the branch head as `value`, then save the project record.
    pub fn create_tag<P>(&self, project: &P, value: &str) -> Result<String, RemoteError>
    where
        P: ProjectHandle + ?Sized,
    {
        let name = value.to_owned();
        project.create_tag(&name, self.branch)?;
        project.save()?;
        info!(project = %project.id(), tag = %name, branch = self.branch, "tag created");
        Ok(name)
    }

    /// `create_tag(next_tag)`.
    pub fn stamp<P>(&self, project: &P) -> Result<String, RemoteError>
    where
        P: ProjectHandle + ?Sized,
    {
        let next = self.next_tag(project)?;
        self.create_tag(project, &next)
    }

    /// Stamp the branch head only if it carries no tag yet.
    ///
    /// Returns the new tag name, or `None` when nothing was created.
    pub fn ensure_tagged<P>(&self, project: &P) -> Result<Option<String>, RemoteError>
    where
        P: ProjectHandle + ?Sized,
    {
        let latest = project.list_commits(self.branch, 1)?.into_iter().next();
        match latest {
            None => {
                warn!(project = %project.id(), branch = self.branch, "branch has no commits; nothing to tag");
                Ok(None)
            }
            Some(commit) if commit.tag.is_some() => {
                debug!(project = %project.id(), commit = %commit.id, "head already tagged");
                Ok(None)
            }
            Some(_) => self.stamp(project).map(Some),
        }
    }
}

/// `max(numeric names) + 1`, or `"1"` when no name is numeric.
pub fn next_tag_from<'n>(names: impl IntoIterator<Item = &'n str>) -> String {
    names
        .into_iter()
        .filter_map(parse_numeric)
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .map_or_else(|| "1".to_owned(), increment)
}

/// Canonical digits of a non-negative decimal name (leading zeros stripped).
fn parse_numeric(name: &str) -> Option<&str> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = name.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed })
}

/// Decimal `digits + 1`.
fn increment(digits: &str) -> String {
    let mut out: Vec<char> = digits.chars().collect();
    for digit in out.iter_mut().rev() {
        if *digit == '9' {
            *digit = '0';
        } else {
            *digit = char::from(*digit as u8 + 1);
            return out.into_iter().collect();
        }
    }
    std::iter::once('1').chain(out).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsync_core::memory::{HostCall, InMemoryHost};
    use labsync_core::{ProjectId, ProjectSource};
    use rstest::rstest;

    const ID: ProjectId = ProjectId(1);

    #[rstest]
    #[case(&["1", "2", "not_a_number"], "3")]
    #[case(&[], "1")]
    #[case(&["9", "10"], "11")]
    #[case(&["10", "9"], "11")]
    #[case(&["v1", "release", "1.0"], "1")]
    #[case(&["007"], "8")]
    #[case(&["-1", " 2", "+3"], "1")]
    #[case(&["0", "000"], "1")]
    #[case(&["18446744073709551615"], "18446744073709551616")]
    #[case(&["99999999999999999999999", "4"], "100000000000000000000000")]
    #[case(&["0099", "100"], "101")]
    fn next_tag_ignores_non_numeric(#[case] names: &[&str], #[case] expected: &str) {
        assert_eq!(next_tag_from(names.iter().copied()), expected);
    }

    #[test]
    fn next_tag_reads_project_tags() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_tag(ID, "1");
        host.add_tag(ID, "2");
        host.add_tag(ID, "not_a_number");
        let project = host.open(ID).unwrap();
        assert_eq!(TagAllocator::new("main").next_tag(&project).unwrap(), "3");
        assert!(host.calls(ID).is_empty(), "next_tag must not mutate");
    }

    #[test]
    fn stamp_past_u64_range_does_not_collide() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_commit(ID, Some("18446744073709551615"));
        host.add_commit(ID, None);
        let project = host.open(ID).unwrap();
        let name = TagAllocator::new("main").stamp(&project).unwrap();
        assert_eq!(name, "18446744073709551616");
    }

    #[test]
    fn create_tag_tags_branch_then_saves() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_commit(ID, None);
        let project = host.open(ID).unwrap();
        let name = TagAllocator::new("main").create_tag(&project, "4").unwrap();
        assert_eq!(name, "4");
        assert_eq!(
            host.calls(ID),
            vec![
                HostCall::CreateTag {
                    name: "4".to_owned(),
                    reference: "main".to_owned()
                },
                HostCall::Save,
            ]
        );
    }

    #[test]
    fn ensure_tagged_stamps_untagged_head_once() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_commit(ID, Some("1"));
        host.add_commit(ID, None);
        let project = host.open(ID).unwrap();
        let tags = TagAllocator::new("main");

        assert_eq!(tags.ensure_tagged(&project).unwrap().as_deref(), Some("2"));
        // Head is now tagged; a second run is a no-op.
        assert_eq!(tags.ensure_tagged(&project).unwrap(), None);

        let creates = host
            .calls(ID)
            .into_iter()
            .filter(|c| matches!(c, HostCall::CreateTag { .. }))
            .count();
        assert_eq!(creates, 1);
    }

    #[test]
    fn ensure_tagged_skips_tagged_head() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_commit(ID, Some("release-candidate"));
        let project = host.open(ID).unwrap();
        assert_eq!(TagAllocator::new("main").ensure_tagged(&project).unwrap(), None);
        assert!(host.calls(ID).is_empty());
    }

    #[test]
    fn ensure_tagged_on_empty_branch_is_noop() {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        let project = host.open(ID).unwrap();
        assert_eq!(TagAllocator::new("main").ensure_tagged(&project).unwrap(), None);
        assert!(host.calls(ID).is_empty());
    }
}
