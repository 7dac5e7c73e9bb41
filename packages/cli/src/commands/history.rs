use super::open_workspace;
use crate::config::Overrides;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only list versions of this file name
    #[arg(short, long)]
    pub file: Option<String>,

    /// Print the document saved at this timestamp (requires --file)
    #[arg(long, value_name = "TIMESTAMP", requires = "file")]
    pub show: Option<String>,
}

pub fn history(args: HistoryArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let ws = open_workspace(overrides, cwd)?;

    if let (Some(file), Some(timestamp)) = (&args.file, &args.show) {
        let entry = ws
            .history_log()
            .find(file, timestamp)?
            .ok_or_else(|| anyhow!("No version of {} at {}", file, timestamp))?;
        println!("{}", serde_json::to_string_pretty(&entry.document)?);
        return Ok(());
    }

    let versions = ws.history_versions()?;
    if versions.is_empty() {
        println!("{} No saved versions in {}", "⚠️".yellow(), ws.history_log().path().display());
        return Ok(());
    }

    for (file, entries) in &versions {
        if args.file.as_ref().is_some_and(|f| f != file) {
            continue;
        }
        println!("📄 {}", file.bold());
        for entry in entries {
            println!("   {}", entry.timestamp);
        }
    }
    Ok(())
}
