//! `labsync projects`: registry listing.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use labsync_core::config::WorkspaceLayout;
use labsync_core::{ProjectDescriptor, ProjectRegistry};

use super::Context;

/// Arguments for `labsync projects`.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ProjectsArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let labsync = ctx.connect()?;
        let registry = labsync.registry();
        let rows = rows(registry, &labsync.settings().workspace);
        if self.json {
            let listing = Listing {
                projects: rows,
                duplicates: registry
                    .duplicates()
                    .iter()
                    .map(|d| d.name.to_string())
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&listing).context("failed to render projects JSON")?
            );
            return Ok(());
        }
        print_table(registry, rows);
        Ok(())
    }
}

#[derive(Serialize)]
struct Listing {
    projects: Vec<ProjectRow>,
    duplicates: Vec<String>,
}

#[derive(Serialize, Tabled)]
struct ProjectRow {
    #[tabled(rename = "project")]
    name: String,
    #[tabled(rename = "id")]
    id: u64,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "checkout")]
    local: bool,
    #[tabled(rename = "remote path")]
    remote_path: String,
}

impl ProjectRow {
    fn new(descriptor: &ProjectDescriptor, workspace: &WorkspaceLayout) -> Self {
        let checkout = workspace
            .category_dir(descriptor.category)
            .join(descriptor.name.as_str());
        Self {
            name: descriptor.name.to_string(),
            id: descriptor.id.0,
            category: descriptor.category.to_string(),
            local: checkout.is_dir(),
            remote_path: descriptor.remote_git_path.clone(),
        }
    }
}

/// Every entry, sorted by category then name.
fn rows(registry: &ProjectRegistry, workspace: &WorkspaceLayout) -> Vec<ProjectRow> {
    let mut rows: Vec<ProjectRow> = registry
        .pending()
        .chain(registry.already_local())
        .map(|d| ProjectRow::new(d, workspace))
        .collect();
    rows.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
    rows
}

fn print_table(registry: &ProjectRegistry, rows: Vec<ProjectRow>) {
    if rows.is_empty() {
        println!("No projects found under the configured groups.");
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for duplicate in registry.duplicates() {
        println!(
            "{} '{}' is used by projects {} and {}; only {} is reachable by name",
            "warning:".yellow().bold(),
            duplicate.name,
            duplicate.replaced,
            duplicate.kept,
            duplicate.kept
        );
    }
}
