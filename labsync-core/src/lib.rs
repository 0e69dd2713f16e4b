//! labsync core library: domain types, settings, remote capability traits
//! and the project registry.
//!
//! - [`types`]: newtypes and domain structs
//! - [`config`]: settings file + environment credentials
//! - [`remote`]: traits every hosting-service adapter implements
//! - [`registry`]: [`ProjectRegistry`], built once from the group tree
//! - [`error`]: [`RemoteError`], [`RegistryError`], [`ConfigError`]

pub mod config;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod registry;
pub mod remote;
pub mod types;

pub use config::{Credentials, Settings};
pub use error::{ConfigError, RegistryError, RemoteError};
pub use registry::{DuplicateName, ProjectRegistry};
pub use remote::{GroupSource, ProjectHandle, ProjectSource};
pub use types::{
    Category, ChangesetEntry, FileAction, GroupId, ProjectDescriptor, ProjectId, ProjectName,
    PublishFile,
};
