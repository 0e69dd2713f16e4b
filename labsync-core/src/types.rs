//! Domain types shared by the registry, publisher and mirror.
//!
//! Identifiers are newtypes; paths inside a remote project are plain `String`s
//! because they are never touched on the local filesystem.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Normalized (lower-cased) project name, the registry key.
///
/// Every constructor lower-cases its input, so two names that differ only in
/// case always compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ProjectName> for String {
    fn from(name: ProjectName) -> Self {
        name.0
    }
}

/// Opaque numeric project identifier assigned by the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Numeric group identifier assigned by the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Classification of a project, derived from the subgroup it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Common,
    Domain,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Common, Category::Domain];

    /// `Common` iff `group` is the designated common group.
    pub fn classify(group: GroupId, common_group: GroupId) -> Self {
        if group == common_group {
            Category::Common
        } else {
            Category::Domain
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Common => write!(f, "common"),
            Category::Domain => write!(f, "domain"),
        }
    }
}

/// Per-file action declared up front in a multi-file commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Create,
    Update,
}

impl FileAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FileAction::Create => "create",
            FileAction::Update => "update",
        }
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One discovered remote project. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub category: Category,
    pub id: ProjectId,
    pub name: ProjectName,
    /// `group/subgroup/repo` path, used to build clone URLs.
    pub remote_git_path: String,
    pub http_url: String,
}

impl ProjectDescriptor {
    pub fn is_common(&self) -> bool {
        self.category == Category::Common
    }
}

/// A file to publish: project-relative path plus content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFile {
    pub path: String,
    pub content: String,
}

impl PublishFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// One entry of a multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangesetEntry {
    pub action: FileAction,
    #[serde(rename = "file_path")]
    pub path: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_is_lowercased() {
        assert_eq!(ProjectName::from("TEST_Project").as_str(), "test_project");
        assert_eq!(ProjectName::from("TEST_PROJECT"), ProjectName::from("test_project"));
    }

    #[test]
    fn project_name_deserializes_normalized() {
        let name: ProjectName = serde_yaml::from_str("MixedCase").expect("deserialize");
        assert_eq!(name.as_str(), "mixedcase");
    }

    #[test]
    fn category_classification() {
        let common = GroupId(181187);
        assert_eq!(Category::classify(GroupId(181187), common), Category::Common);
        assert_eq!(Category::classify(GroupId(181188), common), Category::Domain);
        assert_eq!(Category::classify(GroupId(1), common), Category::Domain);
    }

    #[test]
    fn file_action_display() {
        assert_eq!(FileAction::Create.to_string(), "create");
        assert_eq!(FileAction::Update.to_string(), "update");
    }
}
