//! Subcommand implementations. Each one loads settings, connects once and
//! runs a single operation.

pub mod projects;
pub mod publish;
pub mod show;
pub mod sync;
pub mod tag;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing::debug;

use labsync_core::{config, Credentials, Settings};
use labsync_gitlab::GitlabClient;
use labsync_sync::{GitCli, Orchestrator};

pub type Labsync = Orchestrator<GitlabClient, GitCli>;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    config: Option<PathBuf>,
}

impl Context {
    pub fn new(config: Option<PathBuf>) -> Self {
        Self { config }
    }

    pub fn settings(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => config::load_at(path)
                .with_context(|| format!("failed to load settings from {}", path.display())),
            None => config::load().context("failed to load settings"),
        }
    }

    /// Load settings and build the project registry from the remote.
    pub fn connect(&self) -> Result<Labsync> {
        let settings = self.settings()?;
        let credentials = Credentials::from_env();
        debug!(host = %settings.host, ?credentials, "connecting");
        let client = GitlabClient::from_settings(&settings, &credentials);
        let host = settings.host.clone();
        Orchestrator::connect(settings, &credentials, client, GitCli::new())
            .with_context(|| format!("failed to list projects on {host}"))
    }
}
