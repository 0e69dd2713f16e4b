//! Single owner of the project registry, shared by the CLI and tests.
//!
//! Construct one [`Orchestrator`] per process with [`Orchestrator::connect`];
//! it walks the group tree once and every later operation reads (and, for
//! `sync`, updates) that registry.

use serde_json::Value;

use labsync_core::config::Settings;
use labsync_core::remote::{GroupSource, ProjectSource};
use labsync_core::{
    Credentials, ProjectDescriptor, ProjectId, ProjectName, ProjectRegistry, PublishFile,
    RegistryError, RemoteError,
};

use crate::artifact;
use crate::error::{PublishError, ReadError, SyncError};
use crate::mirror::{CloneUrls, LocalMirrorSync, SyncReport};
use crate::publisher::{CommitPublisher, PublishOutcome};
use crate::tags::TagAllocator;
use crate::vcs::LocalVcs;

pub struct Orchestrator<C, V>
where
    C: GroupSource + ProjectSource,
    V: LocalVcs,
{
    settings: Settings,
    client: C,
    vcs: V,
    urls: CloneUrls,
    registry: ProjectRegistry,
}

impl<C, V> Orchestrator<C, V>
where
    C: GroupSource + ProjectSource,
    V: LocalVcs,
{
    /// Build the registry from the remote group tree. A failed build is fatal.
    pub fn connect(
        settings: Settings,
        credentials: &Credentials,
        client: C,
        vcs: V,
    ) -> Result<Self, RegistryError> {
        let registry = ProjectRegistry::build(&client, &settings.groups)?;
        let urls = CloneUrls::new(settings.host.clone(), credentials.job_token.clone());
        Ok(Self {
            settings,
            client,
            vcs,
            urls,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Pull existing checkouts and clone missing ones.
    pub fn sync(&mut self) -> Result<SyncReport, SyncError> {
        LocalMirrorSync::new(
            &mut self.registry,
            &self.vcs,
            &self.settings.workspace,
            &self.urls,
        )
        .sync()
    }

    pub fn publish(
        &self,
        project: &str,
        path: &str,
        content: &str,
    ) -> Result<PublishOutcome, PublishError> {
        self.publisher().publish(project, path, content)
    }

    pub fn publish_many(
        &self,
        project: &str,
        files: &[PublishFile],
    ) -> Result<PublishOutcome, PublishError> {
        self.publisher().publish_many(project, files)
    }

    /// Stamp the next integer tag on a project's branch head.
    pub fn tag(&self, project: &str) -> Result<String, PublishError> {
        let descriptor = self.registry.resolve(project)?;
        self.stamp(descriptor.name.clone(), descriptor.id)
    }

    /// Stamp a project addressed by id; ids unknown to the registry are
    /// opened directly.
    pub fn tag_project_id(&self, id: ProjectId) -> Result<String, PublishError> {
        let name = self
            .registry
            .find_by_id(id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| ProjectName::new(format!("#{id}")));
        self.stamp(name, id)
    }

    /// Tag the branch head only if it is not tagged yet.
    pub fn ensure_tagged(&self, project: &str) -> Result<Option<String>, PublishError> {
        let descriptor = self.registry.resolve(project)?;
        let allocator = TagAllocator::new(&self.settings.branch);
        self.client
            .open(descriptor.id)
            .and_then(|handle| allocator.ensure_tagged(&handle))
            .map_err(remote_publish(descriptor))
    }

    /// Parse the JSON file at `path` as of `tag`.
    pub fn read_json_at_tag(&self, project: &str, tag: &str, path: &str) -> Result<Value, ReadError> {
        let descriptor = self.registry.resolve(project)?;
        let text = self
            .client
            .open(descriptor.id)
            .and_then(|handle| artifact::read_text_at_tag(&handle, tag, path))
            .map_err(|source| ReadError::Remote {
                project: descriptor.name.clone(),
                project_id: descriptor.id,
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| ReadError::Json {
            project: descriptor.name.clone(),
            tag: tag.to_owned(),
            path: path.to_owned(),
            source,
        })
    }

    fn publisher(&self) -> CommitPublisher<'_, C> {
        CommitPublisher::new(
            &self.registry,
            &self.client,
            &self.settings.branch,
            &self.settings.messages,
        )
    }

    fn stamp(&self, name: ProjectName, id: ProjectId) -> Result<String, PublishError> {
        let allocator = TagAllocator::new(&self.settings.branch);
        self.client
            .open(id)
            .and_then(|handle| allocator.stamp(&handle))
            .map_err(|source| PublishError::Remote {
                project: name,
                project_id: id,
                source,
            })
    }
}

fn remote_publish(descriptor: &ProjectDescriptor) -> impl FnOnce(RemoteError) -> PublishError + '_ {
    move |source| PublishError::Remote {
        project: descriptor.name.clone(),
        project_id: descriptor.id,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    use labsync_core::config::{CommitMessages, GroupLayout, WorkspaceLayout};
    use labsync_core::memory::InMemoryHost;
    use labsync_core::GroupId;
    use tempfile::TempDir;

    use crate::error::VcsError;

    #[derive(Default)]
    struct NoopVcs {
        clones: RefCell<Vec<PathBuf>>,
    }

    impl LocalVcs for NoopVcs {
        fn pull_in_place(&self, _local_path: &Path) -> Result<(), VcsError> {
            Ok(())
        }

        fn clone_repo(&self, _remote_url: &str, destination: &Path) -> Result<(), VcsError> {
            self.clones.borrow_mut().push(destination.to_path_buf());
            Ok(())
        }
    }

    fn settings(root: &Path) -> Settings {
        Settings {
            host: "https://gitlab.example.com".to_owned(),
            branch: "main".to_owned(),
            groups: GroupLayout {
                top: GroupId(1),
                common: GroupId(2),
            },
            workspace: WorkspaceLayout {
                root: root.to_path_buf(),
                ..WorkspaceLayout::default()
            },
            messages: CommitMessages::default(),
        }
    }

    fn host() -> InMemoryHost {
        let host = InMemoryHost::new();
        host.add_subgroup(GroupId(1), GroupId(2), "common");
        host.add_subgroup(GroupId(1), GroupId(3), "domain");
        host.add_project(GroupId(3), ProjectId(30), "Orders");
        host.add_commit(ProjectId(30), Some("5"));
        host
    }

    #[test]
    fn connect_builds_registry_once() {
        let tmp = TempDir::new().unwrap();
        let orch = Orchestrator::connect(
            settings(tmp.path()),
            &Credentials::default(),
            host(),
            NoopVcs::default(),
        )
        .unwrap();
        assert_eq!(orch.registry().len(), 1);
    }

    #[test]
    fn publish_still_resolves_after_sync() {
        let tmp = TempDir::new().unwrap();
        let mut orch = Orchestrator::connect(
            settings(tmp.path()),
            &Credentials::default(),
            host(),
            NoopVcs::default(),
        )
        .unwrap();
        let report = orch.sync().unwrap();
        assert_eq!(report.cloned, vec![ProjectName::from("orders")]);
        assert_eq!(orch.registry().pending_len(), 0);

        let outcome = orch.publish("ORDERS", "suite.json", "{}").unwrap();
        assert_eq!(outcome.tag, "6");
    }

    #[test]
    fn tag_project_id_opens_unregistered_projects() {
        let tmp = TempDir::new().unwrap();
        let host = host();
        host.add_repo(ProjectId(99));
        let orch = Orchestrator::connect(
            settings(tmp.path()),
            &Credentials::default(),
            host.clone(),
            NoopVcs::default(),
        )
        .unwrap();
        assert_eq!(orch.tag_project_id(ProjectId(99)).unwrap(), "1");
        assert_eq!(orch.tag_project_id(ProjectId(30)).unwrap(), "6");
        assert_eq!(host.tag_names(ProjectId(99)), vec!["1"]);
    }

    #[test]
    fn read_json_at_tag_reports_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let host = host();
        host.add_file(ProjectId(30), "notes.txt", "not json");
        host.add_commit(ProjectId(30), Some("6"));
        let orch = Orchestrator::connect(
            settings(tmp.path()),
            &Credentials::default(),
            host,
            NoopVcs::default(),
        )
        .unwrap();
        let err = orch.read_json_at_tag("orders", "6", "notes.txt").unwrap_err();
        assert!(matches!(err, ReadError::Json { .. }), "got: {err}");
    }
}
