//! # labsync-gitlab
//!
//! Blocking GitLab REST v4 adapter for the capability traits in
//! `labsync_core::remote`. Authenticates with a private token header,
//! follows `x-next-page` pagination and maps HTTP 404 to
//! `RemoteError::NotFound`.

mod client;
mod models;
mod project;

pub use client::GitlabClient;
pub use project::GitlabProject;
