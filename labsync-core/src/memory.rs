//! In-memory hosting service for tests.
//!
//! Implements every remote trait over shared state and records each mutating
//! call per project so tests can assert on exact call sequences. Cloning an
//! [`InMemoryHost`] shares the same state.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::RemoteError;
use crate::remote::{
    CommitInfo, GroupSource, GroupSummary, ProjectHandle, ProjectSource, RemoteFile,
    RemoteProject, TagInfo,
};
use crate::types::{ChangesetEntry, FileAction, GroupId, ProjectId};

/// A mutating call observed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    CreateTag { name: String, reference: String },
    SaveFile { path: String, content: String, message: String },
    CreateFile { path: String, content: String, message: String },
    CreateCommit { message: String, actions: Vec<ChangesetEntry> },
    Save,
}

#[derive(Debug, Default)]
struct Repo {
    tags: Vec<TagInfo>,
    /// Newest first.
    commits: Vec<CommitInfo>,
    files: BTreeMap<String, Vec<u8>>,
    snapshots: HashMap<String, BTreeMap<String, Vec<u8>>>,
    calls: Vec<HostCall>,
    fail_tag_creation: bool,
    fail_file_lookup: bool,
}

impl Repo {
    /// Files as of `reference` when it names a commit, else the branch head.
    fn files_at(&self, reference: &str) -> &BTreeMap<String, Vec<u8>> {
        self.snapshots.get(reference).unwrap_or(&self.files)
    }

    fn commit(&mut self) -> String {
        let id = format!("c{}", self.commits.len() + 1);
        self.snapshots.insert(id.clone(), self.files.clone());
        self.commits.insert(
            0,
            CommitInfo {
                id: id.clone(),
                tag: None,
            },
        );
        id
    }
}

#[derive(Debug, Default)]
struct State {
    subgroups: HashMap<GroupId, Vec<GroupSummary>>,
    projects: HashMap<GroupId, Vec<RemoteProject>>,
    repos: HashMap<ProjectId, Repo>,
    failing_groups: HashSet<GroupId>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    state: Arc<Mutex<State>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // -----------------------------------------------------------------------
    // Fixture setup
    // -----------------------------------------------------------------------

    pub fn add_subgroup(&self, parent: GroupId, id: GroupId, name: &str) {
        self.state().subgroups.entry(parent).or_default().push(GroupSummary {
            id,
            name: name.to_owned(),
        });
    }

    /// Register a project in `group`; its path is `top/<group name>/<lowercased name>`.
    pub fn add_project(&self, group: GroupId, id: ProjectId, name: &str) -> RemoteProject {
        let mut state = self.state();
        let group_name = state
            .subgroups
            .values()
            .flatten()
            .find(|g| g.id == group)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| group.to_string());
        let path = format!("top/{group_name}/{}", name.to_lowercase());
        let project = RemoteProject {
            id,
            name: name.to_owned(),
            http_url_to_repo: format!("https://git.example.com/{path}.git"),
            path_with_namespace: path,
        };
        state.projects.entry(group).or_default().push(project.clone());
        state.repos.entry(id).or_default();
        project
    }

    /// Add a repository that is not reachable through any group.
    pub fn add_repo(&self, id: ProjectId) {
        self.state().repos.entry(id).or_default();
    }

    pub fn add_tag(&self, project: ProjectId, name: &str) {
        let mut state = self.state();
        let repo = state.repos.entry(project).or_default();
        let commit_id = repo.commits.first().map(|c| c.id.clone());
        repo.tags.push(TagInfo {
            name: name.to_owned(),
            commit_id,
        });
    }

    /// Push a commit on the tracked branch, optionally already tagged.
    pub fn add_commit(&self, project: ProjectId, tag: Option<&str>) -> String {
        let mut state = self.state();
        let repo = state.repos.entry(project).or_default();
        let id = repo.commit();
        if let Some(name) = tag {
            if let Some(head) = repo.commits.first_mut() {
                head.tag = Some(name.to_owned());
            }
            repo.tags.push(TagInfo {
                name: name.to_owned(),
                commit_id: Some(id.clone()),
            });
        }
        id
    }

    pub fn add_file(&self, project: ProjectId, path: &str, content: &str) {
        self.add_binary_file(project, path, content.as_bytes());
    }

    /// Add a file whose content need not be UTF-8.
    pub fn add_binary_file(&self, project: ProjectId, path: &str, content: &[u8]) {
        let mut state = self.state();
        let repo = state.repos.entry(project).or_default();
        repo.files.insert(path.to_owned(), content.to_vec());
    }

    pub fn fail_group(&self, group: GroupId) {
        self.state().failing_groups.insert(group);
    }

    pub fn fail_tag_creation(&self, project: ProjectId) {
        self.state().repos.entry(project).or_default().fail_tag_creation = true;
    }

    /// Make every file lookup fail with a transport error.
    pub fn fail_file_lookup(&self, project: ProjectId) {
        self.state().repos.entry(project).or_default().fail_file_lookup = true;
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    pub fn calls(&self, project: ProjectId) -> Vec<HostCall> {
        self.state()
            .repos
            .get(&project)
            .map(|r| r.calls.clone())
            .unwrap_or_default()
    }

    pub fn tag_names(&self, project: ProjectId) -> Vec<String> {
        self.state()
            .repos
            .get(&project)
            .map(|r| r.tags.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Text of `path` on the branch head; `None` if absent or not UTF-8.
    pub fn file(&self, project: ProjectId, path: &str) -> Option<String> {
        self.file_bytes(project, path)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    pub fn file_bytes(&self, project: ProjectId, path: &str) -> Option<Vec<u8>> {
        self.state()
            .repos
            .get(&project)
            .and_then(|r| r.files.get(path).cloned())
    }
}

impl GroupSource for InMemoryHost {
    fn list_subgroups(&self, group: GroupId) -> Result<Vec<GroupSummary>, RemoteError> {
        let state = self.state();
        if state.failing_groups.contains(&group) {
            return Err(unavailable(format!("groups/{group}/subgroups")));
        }
        Ok(state.subgroups.get(&group).cloned().unwrap_or_default())
    }

    fn list_projects(&self, group: GroupId) -> Result<Vec<RemoteProject>, RemoteError> {
        let state = self.state();
        if state.failing_groups.contains(&group) {
            return Err(unavailable(format!("groups/{group}/projects")));
        }
        Ok(state.projects.get(&group).cloned().unwrap_or_default())
    }
}

impl ProjectSource for InMemoryHost {
    type Handle = InMemoryProject;

    fn open(&self, id: ProjectId) -> Result<InMemoryProject, RemoteError> {
        if !self.state().repos.contains_key(&id) {
            return Err(RemoteError::NotFound {
                resource: format!("projects/{id}"),
            });
        }
        Ok(InMemoryProject {
            host: self.clone(),
            id,
        })
    }
}

/// Handle onto one project of an [`InMemoryHost`].
#[derive(Debug, Clone)]
pub struct InMemoryProject {
    host: InMemoryHost,
    id: ProjectId,
}

impl InMemoryProject {
    fn with_repo<T>(&self, f: impl FnOnce(&mut Repo) -> Result<T, RemoteError>) -> Result<T, RemoteError> {
        let mut state = self.host.state();
        let repo = state.repos.get_mut(&self.id).ok_or_else(|| RemoteError::NotFound {
            resource: format!("projects/{}", self.id),
        })?;
        f(repo)
    }
}

impl ProjectHandle for InMemoryProject {
    fn id(&self) -> ProjectId {
        self.id
    }

    fn list_tags(&self, _branch: &str) -> Result<Vec<TagInfo>, RemoteError> {
        self.with_repo(|repo| Ok(repo.tags.clone()))
    }

    fn get_tag(&self, name: &str) -> Result<TagInfo, RemoteError> {
        self.with_repo(|repo| {
            repo.tags
                .iter()
                .find(|t| t.name == name)
                .cloned()
                .ok_or_else(|| RemoteError::NotFound {
                    resource: format!("tags/{name}"),
                })
        })
    }

    fn create_tag(&self, name: &str, reference: &str) -> Result<(), RemoteError> {
        self.with_repo(|repo| {
            repo.calls.push(HostCall::CreateTag {
                name: name.to_owned(),
                reference: reference.to_owned(),
            });
            if repo.fail_tag_creation {
                return Err(RemoteError::Status {
                    status: 503,
                    url: "repository/tags".to_owned(),
                    body: "service unavailable".to_owned(),
                });
            }
            if repo.tags.iter().any(|t| t.name == name) {
                return Err(RemoteError::Status {
                    status: 400,
                    url: "repository/tags".to_owned(),
                    body: format!("tag {name} already exists"),
                });
            }
            let head = repo.commits.first_mut();
            let commit_id = head.map(|c| {
                c.tag = Some(name.to_owned());
                c.id.clone()
            });
            repo.tags.push(TagInfo {
                name: name.to_owned(),
                commit_id,
            });
            Ok(())
        })
    }

    fn list_commits(&self, _branch: &str, limit: usize) -> Result<Vec<CommitInfo>, RemoteError> {
        self.with_repo(|repo| Ok(repo.commits.iter().take(limit).cloned().collect()))
    }

    fn file_exists(&self, path: &str, reference: &str) -> Result<bool, RemoteError> {
        self.with_repo(|repo| {
            if repo.fail_file_lookup {
                return Err(unavailable(format!("repository/files/{path}")));
            }
            Ok(repo.files_at(reference).contains_key(path))
        })
    }

    fn get_file(&self, path: &str, reference: &str) -> Result<RemoteFile, RemoteError> {
        self.with_repo(|repo| {
            if repo.fail_file_lookup {
                return Err(unavailable(format!("repository/files/{path}")));
            }
            repo.files_at(reference)
                .get(path)
                .map(|content| RemoteFile {
                    path: path.to_owned(),
                    content: content.clone(),
                    last_commit_id: repo.commits.first().map(|c| c.id.clone()),
                })
                .ok_or_else(|| RemoteError::NotFound {
                    resource: format!("repository/files/{path}"),
                })
        })
    }

    fn save_file(&self, file: &RemoteFile, _branch: &str, message: &str) -> Result<(), RemoteError> {
        self.with_repo(|repo| {
            repo.calls.push(HostCall::SaveFile {
                path: file.path.clone(),
                content: String::from_utf8_lossy(&file.content).into_owned(),
                message: message.to_owned(),
            });
            if !repo.files.contains_key(&file.path) {
                return Err(bad_request(format!("file {} does not exist", file.path)));
            }
            repo.files.insert(file.path.clone(), file.content.clone());
            repo.commit();
            Ok(())
        })
    }

    fn create_file(
        &self,
        path: &str,
        _branch: &str,
        content: &str,
        message: &str,
    ) -> Result<(), RemoteError> {
        self.with_repo(|repo| {
            repo.calls.push(HostCall::CreateFile {
                path: path.to_owned(),
                content: content.to_owned(),
                message: message.to_owned(),
            });
            if repo.files.contains_key(path) {
                return Err(bad_request(format!("file {path} already exists")));
            }
            repo.files.insert(path.to_owned(), content.as_bytes().to_vec());
            repo.commit();
            Ok(())
        })
    }

    fn create_commit(
        &self,
        _branch: &str,
        message: &str,
        actions: &[ChangesetEntry],
    ) -> Result<(), RemoteError> {
        self.with_repo(|repo| {
            repo.calls.push(HostCall::CreateCommit {
                message: message.to_owned(),
                actions: actions.to_vec(),
            });
            // All-or-nothing, like the real service.
            for entry in actions {
                let exists = repo.files.contains_key(&entry.path);
                match entry.action {
                    FileAction::Create if exists => {
                        return Err(bad_request(format!("file {} already exists", entry.path)))
                    }
                    FileAction::Update if !exists => {
                        return Err(bad_request(format!("file {} does not exist", entry.path)))
                    }
                    _ => {}
                }
            }
            for entry in actions {
                repo.files
                    .insert(entry.path.clone(), entry.content.clone().into_bytes());
            }
            repo.commit();
            Ok(())
        })
    }

    fn save(&self) -> Result<(), RemoteError> {
        self.with_repo(|repo| {
            repo.calls.push(HostCall::Save);
            Ok(())
        })
    }
}

fn unavailable(url: String) -> RemoteError {
    RemoteError::Transport {
        url,
        message: "connection refused".to_owned(),
    }
}

fn bad_request(body: String) -> RemoteError {
    RemoteError::Status {
        status: 400,
        url: "repository/commits".to_owned(),
        body,
    }
}
