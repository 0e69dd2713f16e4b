//! `labsync publish` and `labsync publish-many`.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use labsync_core::PublishFile;
use labsync_sync::PublishOutcome;

use super::Context;

/// Arguments for `labsync publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Project name (case-insensitive).
    pub project: String,

    /// Path of the file inside the repository.
    pub remote_path: String,

    /// Local file whose content is published.
    #[arg(long, value_name = "FILE")]
    pub from: PathBuf,
}

impl PublishArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let content = read_local(&self.from)?;
        let labsync = ctx.connect()?;
        let outcome = labsync
            .publish(&self.project, &self.remote_path, &content)
            .with_context(|| format!("failed to publish {} to '{}'", self.remote_path, self.project))?;
        print_outcome(&outcome);
        Ok(())
    }
}

/// Arguments for `labsync publish-many`.
#[derive(Args, Debug)]
pub struct PublishManyArgs {
    /// Project name (case-insensitive).
    pub project: String,

    /// `<remote-path>=<local-file>`; repeat for each file.
    #[arg(long = "file", value_name = "REMOTE=LOCAL", required = true, value_parser = parse_mapping)]
    pub files: Vec<(String, PathBuf)>,
}

impl PublishManyArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let files = self
            .files
            .iter()
            .map(|(remote, local)| Ok(PublishFile::new(remote.clone(), read_local(local)?)))
            .collect::<Result<Vec<_>>>()?;
        let labsync = ctx.connect()?;
        let outcome = labsync
            .publish_many(&self.project, &files)
            .with_context(|| format!("failed to publish {} file(s) to '{}'", files.len(), self.project))?;
        print_outcome(&outcome);
        Ok(())
    }
}

fn parse_mapping(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((remote, local)) if !remote.is_empty() && !local.is_empty() => {
            Ok((remote.to_owned(), PathBuf::from(local)))
        }
        _ => Err(format!("expected <remote-path>=<local-file>, got '{raw}'")),
    }
}

fn read_local(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn print_outcome(outcome: &PublishOutcome) {
    for (path, action) in &outcome.actions {
        println!("{} {action} {path}", "✓".green());
    }
    println!(
        "Tagged '{}' (id {}) as {}",
        outcome.project,
        outcome.project_id,
        outcome.tag.bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_splits_on_first_equals() {
        assert_eq!(
            parse_mapping("suites/a.json=out/a=1.json").unwrap(),
            ("suites/a.json".to_owned(), PathBuf::from("out/a=1.json"))
        );
    }

    #[test]
    fn mapping_rejects_missing_halves() {
        assert!(parse_mapping("suites/a.json").is_err());
        assert!(parse_mapping("=local.json").is_err());
        assert!(parse_mapping("remote.json=").is_err());
    }
}
