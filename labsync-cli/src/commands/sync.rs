//! `labsync sync`: pull existing checkouts, clone missing ones.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use labsync_sync::SyncReport;

use super::Context;

/// Arguments for `labsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {}

impl SyncArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let mut labsync = ctx.connect()?;
        let root = labsync.settings().workspace.root.clone();
        let report = labsync
            .sync()
            .with_context(|| format!("sync aborted under {}", root.display()))?;
        print_report(&report);
        report.into_result().context("sync finished with failures")?;
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    for name in &report.pulled {
        println!("{} pulled {}", "✓".green(), name);
    }
    for name in &report.cloned {
        println!("{} cloned {}", "✓".green(), name);
    }
    for failure in &report.failures {
        println!("{} {}", "✗".red(), failure);
    }
    println!(
        "{} pulled, {} cloned, {} failed",
        report.pulled.len(),
        report.cloned.len(),
        report.failures.len()
    );
}
