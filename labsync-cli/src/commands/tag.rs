//! `labsync tag <project> [--ensure]` and `labsync tag --id <id>`

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use labsync_core::ProjectId;

use super::Context;

/// Arguments for `labsync tag`.
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Project name (case-insensitive).
    #[arg(required_unless_present = "id", conflicts_with = "id")]
    pub project: Option<String>,

    /// Address the project by numeric id instead of name.
    #[arg(long, value_name = "ID")]
    pub id: Option<u64>,

    /// Only tag when the branch head carries no tag yet.
    #[arg(long, conflicts_with = "id")]
    pub ensure: bool,
}

impl TagArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let labsync = ctx.connect()?;
        if let Some(id) = self.id {
            let tag = labsync
                .tag_project_id(ProjectId(id))
                .with_context(|| format!("failed to tag project id {id}"))?;
            println!("{} tagged project {id} as {}", "✓".green(), tag.bold());
            return Ok(());
        }

        let project = self.project.context("provide a project name or --id")?;
        if self.ensure {
            match labsync
                .ensure_tagged(&project)
                .with_context(|| format!("failed to tag '{project}'"))?
            {
                Some(tag) => println!("{} tagged '{project}' as {}", "✓".green(), tag.bold()),
                None => println!("'{project}' head is already tagged; nothing to do"),
            }
        } else {
            let tag = labsync
                .tag(&project)
                .with_context(|| format!("failed to tag '{project}'"))?;
            println!("{} tagged '{project}' as {}", "✓".green(), tag.bold());
        }
        Ok(())
    }
}
