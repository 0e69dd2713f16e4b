//! `labsync show <project> <tag> <path>`: print a published JSON file.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for `labsync show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Project name (case-insensitive).
    pub project: String,

    /// Tag to read at.
    pub tag: String,

    /// Path of the file inside the repository.
    pub path: String,
}

impl ShowArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let labsync = ctx.connect()?;
        let value = labsync
            .read_json_at_tag(&self.project, &self.tag, &self.path)
            .with_context(|| format!("failed to read {} at tag {}", self.path, self.tag))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("failed to render JSON")?
        );
        Ok(())
    }
}
