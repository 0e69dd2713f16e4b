//! Publish generated files to a project's tracked branch, then tag the result.
//!
//! ## Single file
//!
//! 1. Resolve the project name (case-insensitive).
//! 2. Fetch the file on the branch: found → overwrite and save (update);
//!    not found → create.
//! 3. Stamp the next integer tag.
//!
//! ## Many files
//!
//! Every path is probed for existence first (no download), because the
//! commit API needs the action declared per entry. The entries then go out as one commit, followed
//! by one tag.

use tracing::info;

use labsync_core::config::CommitMessages;
use labsync_core::remote::ProjectSource;
use labsync_core::{
    ChangesetEntry, FileAction, ProjectDescriptor, ProjectHandle, ProjectId, ProjectName,
    ProjectRegistry, PublishFile, RemoteError,
};

use crate::error::PublishError;
use crate::tags::TagAllocator;

/// What a successful publish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub project: ProjectName,
    pub project_id: ProjectId,
    /// Per-file action, in input order.
    pub actions: Vec<(String, FileAction)>,
    pub tag: String,
}

pub struct CommitPublisher<'a, S: ProjectSource> {
    registry: &'a ProjectRegistry,
    source: &'a S,
    branch: &'a str,
    messages: &'a CommitMessages,
}

impl<'a, S: ProjectSource> CommitPublisher<'a, S> {
    pub fn new(
        registry: &'a ProjectRegistry,
        source: &'a S,
        branch: &'a str,
        messages: &'a CommitMessages,
    ) -> Self {
        Self {
            registry,
            source,
            branch,
            messages,
        }
    }

    /// Create or update one file, then tag.
    pub fn publish(
        &self,
        project_name: &str,
        path: &str,
        content: &str,
    ) -> Result<PublishOutcome, PublishError> {
        let descriptor = self.registry.resolve(project_name)?;
        let project = self.open(descriptor)?;

        let action = match project.get_file(path, self.branch) {
            Ok(mut file) => {
                file.set_content(content);
                project
                    .save_file(&file, self.branch, &self.messages.update)
                    .map_err(remote(descriptor))?;
                FileAction::Update
            }
            Err(e) if e.is_not_found() => {
                project
                    .create_file(path, self.branch, content, &self.messages.create)
                    .map_err(remote(descriptor))?;
                FileAction::Create
            }
            Err(e) => return Err(remote(descriptor)(e)),
        };
        info!(project = %descriptor.name, path, %action, "file published");

        let tag = self.stamp(descriptor, &project)?;
        Ok(PublishOutcome {
            project: descriptor.name.clone(),
            project_id: descriptor.id,
            actions: vec![(path.to_owned(), action)],
            tag,
        })
    }

    /// Publish every file as a single commit, then tag once.
    pub fn publish_many(
        &self,
        project_name: &str,
        files: &[PublishFile],
    ) -> Result<PublishOutcome, PublishError> {
        let descriptor = self.registry.resolve(project_name)?;
        if files.is_empty() {
            return Err(PublishError::EmptyChangeset {
                project: descriptor.name.clone(),
            });
        }
        let project = self.open(descriptor)?;

        let changeset = files
            .iter()
            .map(|file| -> Result<ChangesetEntry, RemoteError> {
                let action = if project.file_exists(&file.path, self.branch)? {
                    FileAction::Update
                } else {
                    FileAction::Create
                };
                Ok(ChangesetEntry {
                    action,
                    path: file.path.clone(),
                    content: file.content.clone(),
                })
            })
            .collect::<Result<Vec<_>, RemoteError>>()
            .map_err(remote(descriptor))?;

        project
            .create_commit(self.branch, &self.messages.batch, &changeset)
            .map_err(remote(descriptor))?;
        info!(project = %descriptor.name, files = changeset.len(), "changeset committed");

        let tag = self.stamp(descriptor, &project)?;
        Ok(PublishOutcome {
            project: descriptor.name.clone(),
            project_id: descriptor.id,
            actions: changeset.into_iter().map(|e| (e.path, e.action)).collect(),
            tag,
        })
    }

    fn open(&self, descriptor: &ProjectDescriptor) -> Result<S::Handle, PublishError> {
        self.source.open(descriptor.id).map_err(remote(descriptor))
    }

    fn stamp(
        &self,
        descriptor: &ProjectDescriptor,
        project: &S::Handle,
    ) -> Result<String, PublishError> {
        TagAllocator::new(self.branch)
            .stamp(project)
            .map_err(|source| PublishError::PartialPublish {
                project: descriptor.name.clone(),
                project_id: descriptor.id,
                source,
            })
    }
}

fn remote(descriptor: &ProjectDescriptor) -> impl Fn(RemoteError) -> PublishError + '_ {
    move |source| PublishError::Remote {
        project: descriptor.name.clone(),
        project_id: descriptor.id,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsync_core::memory::{HostCall, InMemoryHost};
    use labsync_core::{Category, ProjectName};

    const ID: ProjectId = ProjectId(10);

    fn fixture() -> (InMemoryHost, ProjectRegistry) {
        let host = InMemoryHost::new();
        host.add_repo(ID);
        host.add_commit(ID, Some("1"));
        let mut registry = ProjectRegistry::default();
        registry.insert(ProjectDescriptor {
            category: Category::Domain,
            id: ID,
            name: ProjectName::from("test_project"),
            remote_git_path: "org/domain/test_project".to_owned(),
            http_url: "https://git.example.com/org/domain/test_project.git".to_owned(),
        });
        (host, registry)
    }

    #[test]
    fn file_exists_distinguishes_missing_from_failure() {
        let (host, _) = fixture();
        host.add_file(ID, "present.json", "{}");
        host.add_binary_file(ID, "logo.png", &[0x89, 0x50, 0xff]);
        let project = host.open(ID).unwrap();
        assert!(project.file_exists("present.json", "main").unwrap());
        assert!(project.file_exists("logo.png", "main").unwrap());
        assert!(!project.file_exists("absent.json", "main").unwrap());

        host.fail_file_lookup(ID);
        assert!(project.file_exists("present.json", "main").is_err());
    }

    #[test]
    fn binary_files_are_updates_not_failures() {
        let (host, registry) = fixture();
        host.add_binary_file(ID, "logo.png", &[0x89, 0x50, 0xff]);
        let messages = CommitMessages::default();
        let publisher = CommitPublisher::new(&registry, &host, "main", &messages);

        let outcome = publisher
            .publish_many(
                "test_project",
                &[
                    PublishFile::new("logo.png", "replaced"),
                    PublishFile::new("suite.json", "{}"),
                ],
            )
            .unwrap();
        assert_eq!(
            outcome.actions,
            vec![
                ("logo.png".to_owned(), FileAction::Update),
                ("suite.json".to_owned(), FileAction::Create),
            ]
        );

        host.add_binary_file(ID, "icon.png", &[0xff]);
        let single = publisher.publish("test_project", "icon.png", "text now").unwrap();
        assert_eq!(single.actions, vec![("icon.png".to_owned(), FileAction::Update)]);
        assert_eq!(host.file(ID, "icon.png").as_deref(), Some("text now"));
    }

    #[test]
    fn publish_resolves_case_insensitively() {
        let (host, registry) = fixture();
        let messages = CommitMessages::default();
        let publisher = CommitPublisher::new(&registry, &host, "main", &messages);
        let outcome = publisher.publish("TEST_PROJECT", "a.json", "{}").unwrap();
        assert_eq!(outcome.project.as_str(), "test_project");
        assert_eq!(outcome.tag, "2");
    }

    #[test]
    fn publish_uses_configured_messages() {
        let (host, registry) = fixture();
        host.add_file(ID, "a.json", "old");
        let messages = CommitMessages {
            update: "refresh".to_owned(),
            create: "add".to_owned(),
            batch: "bulk".to_owned(),
        };
        let publisher = CommitPublisher::new(&registry, &host, "main", &messages);
        publisher.publish("test_project", "a.json", "new").unwrap();
        publisher.publish("test_project", "b.json", "new").unwrap();

        let calls = host.calls(ID);
        assert!(calls.contains(&HostCall::SaveFile {
            path: "a.json".to_owned(),
            content: "new".to_owned(),
            message: "refresh".to_owned(),
        }));
        assert!(calls.contains(&HostCall::CreateFile {
            path: "b.json".to_owned(),
            content: "new".to_owned(),
            message: "add".to_owned(),
        }));
    }
}
