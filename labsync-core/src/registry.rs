//! In-memory project registry.
//!
//! Built once per process by walking `top group → direct subgroups → projects`.
//! Entries live in one of two sets:
//!
//! ```text
//! pending       discovered remotely, no local checkout seen yet
//! already_local moved here by `take_if_present` (found on disk or cloned)
//! ```
//!
//! Name lookups are case-insensitive because [`ProjectName`] normalizes on
//! construction. Duplicate names keep the last project seen and are recorded
//! in [`ProjectRegistry::duplicates`].

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::GroupLayout;
use crate::error::RegistryError;
use crate::remote::{GroupSource, RemoteProject};
use crate::types::{Category, ProjectDescriptor, ProjectId, ProjectName};

/// Two remote projects normalized to the same registry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateName {
    pub name: ProjectName,
    /// Project that now owns the name.
    pub kept: ProjectId,
    /// Project that was overwritten.
    pub replaced: ProjectId,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    pending: BTreeMap<ProjectName, ProjectDescriptor>,
    already_local: BTreeMap<ProjectName, ProjectDescriptor>,
    duplicates: Vec<DuplicateName>,
}

impl ProjectRegistry {
    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Walk the group tree once and register every project found.
    ///
    /// Only direct subgroups of `groups.top` are visited. Any listing failure
    /// aborts the build; no partial registry is returned.
    pub fn build<S>(source: &S, groups: &GroupLayout) -> Result<Self, RegistryError>
    where
        S: GroupSource + ?Sized,
    {
        info!(top = %groups.top, "fetching project inventory");
        let subgroups = source
            .list_subgroups(groups.top)
            .map_err(|source| RegistryError::Traversal {
                group: groups.top,
                source,
            })?;

        let mut registry = Self::default();
        for group in subgroups {
            let category = Category::classify(group.id, groups.common);
            let projects = source
                .list_projects(group.id)
                .map_err(|source| RegistryError::Traversal {
                    group: group.id,
                    source,
                })?;
            debug!(
                group = %group.id,
                name = %group.name,
                %category,
                projects = projects.len(),
                "listed subgroup"
            );
            for project in projects {
                registry.insert(describe(project, category));
            }
        }

        info!(
            projects = registry.len(),
            duplicates = registry.duplicates.len(),
            "project registry built"
        );
        Ok(registry)
    }

    /// Register a descriptor, replacing (and recording) any same-named entry.
    pub fn insert(&mut self, descriptor: ProjectDescriptor) -> Option<ProjectDescriptor> {
        let name = descriptor.name.clone();
        let kept = descriptor.id;
        let previous = self.pending.insert(name.clone(), descriptor);
        if let Some(old) = &previous {
            warn!(
                name = %name,
                kept = %kept,
                replaced = %old.id,
                "duplicate project name; keeping the later project"
            );
            self.duplicates.push(DuplicateName {
                name,
                kept,
                replaced: old.id,
            });
        }
        previous
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Case-insensitive lookup across pending and already-local entries.
    pub fn resolve(&self, name: &str) -> Result<&ProjectDescriptor, RegistryError> {
        let key = ProjectName::new(name);
        self.pending
            .get(&key)
            .or_else(|| self.already_local.get(&key))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_owned(),
            })
    }

    pub fn find_by_id(&self, id: ProjectId) -> Option<&ProjectDescriptor> {
        self.pending
            .values()
            .chain(self.already_local.values())
            .find(|d| d.id == id)
    }

    pub fn contains_pending(&self, name: &ProjectName) -> bool {
        self.pending.contains_key(name)
    }

    /// Entries with no local checkout yet, ordered by name.
    pub fn pending(&self) -> impl Iterator<Item = &ProjectDescriptor> {
        self.pending.values()
    }

    /// Entries already represented locally, ordered by name.
    pub fn already_local(&self) -> impl Iterator<Item = &ProjectDescriptor> {
        self.already_local.values()
    }

    pub fn duplicates(&self) -> &[DuplicateName] {
        &self.duplicates
    }

    /// Total number of known projects (pending + already local).
    pub fn len(&self) -> usize {
        self.pending.len() + self.already_local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Move `name` from pending to already-local.
    ///
    /// Returns the moved descriptor, or `None` when `name` is not pending.
    /// Entries are never moved back.
    pub fn take_if_present(&mut self, name: &ProjectName) -> Option<&ProjectDescriptor> {
        let descriptor = self.pending.remove(name)?;
        Some(
            self.already_local
                .entry(name.clone())
                .or_insert(descriptor),
        )
    }
}

fn describe(project: RemoteProject, category: Category) -> ProjectDescriptor {
    ProjectDescriptor {
        category,
        id: project.id,
        name: ProjectName::new(&project.name),
        remote_git_path: project.path_with_namespace,
        http_url: project.http_url_to_repo,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
