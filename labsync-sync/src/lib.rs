//! # labsync-sync
//!
//! Publishing, tagging and local mirror orchestration.
//!
//! Build one [`Orchestrator`] per process; it owns the project registry and
//! exposes every operation the CLI needs. The lower-level pieces
//! ([`CommitPublisher`], [`TagAllocator`], [`LocalMirrorSync`]) are public
//! so they can be driven against any [`labsync_core::ProjectSource`].

pub mod artifact;
pub mod error;
pub mod mirror;
pub mod orchestrator;
pub mod publisher;
pub mod tags;
pub mod vcs;

pub use error::{PublishError, ReadError, SyncError, SyncStep, SyncStepFailure, VcsError};
pub use mirror::{CloneUrls, LocalCheckout, LocalMirrorSync, SyncReport};
pub use orchestrator::Orchestrator;
pub use publisher::{CommitPublisher, PublishOutcome};
pub use tags::TagAllocator;
pub use vcs::{GitCli, LocalVcs};
