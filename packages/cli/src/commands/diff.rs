use super::{open_file, open_workspace};
use crate::config::Overrides;
use anyhow::{anyhow, Result};
use cfgtree_editor::load_document;
use cfgtree_model::{diff as diff_documents, value_at, DiffPair, Document};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Left document
    pub left: PathBuf,

    /// Right document (omit when comparing with --history)
    pub right: Option<PathBuf>,

    /// Compare `left` with its saved version at this timestamp
    #[arg(long, value_name = "TIMESTAMP")]
    pub history: Option<String>,
}

pub fn diff(args: DiffArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let (left_name, right_name, left, right) = match (&args.right, &args.history) {
        (Some(right), None) => {
            let ws = open_workspace(overrides, cwd)?;
            (
                args.left.display().to_string(),
                right.display().to_string(),
                load_document(&ws.resolve_path(&args.left))?,
                load_document(&ws.resolve_path(right))?,
            )
        }
        (None, Some(timestamp)) => {
            let mut ws = open_workspace(overrides, cwd)?;
            let tab = open_file(&mut ws, &args.left)?;
            let name = ws.tab(tab).map(|t| t.name.clone()).unwrap_or_default();
            let session = ws.diff_with_history(&name, timestamp)?;
            (
                format!("{} @ {}", name, timestamp),
                name,
                session.history,
                session.current,
            )
        }
        _ => return Err(anyhow!("Give either a right document or --history, not both")),
    };

    let pair = diff_documents(&left, &right);
    print_diff(&pair, &left_name, &right_name, &left, &right);
    Ok(())
}

fn print_diff(pair: &DiffPair, left_name: &str, right_name: &str, left: &Document, right: &Document) {
    println!("🔍 {} ↔ {}", left_name.bold(), right_name.bold());
    println!();

    let flagged = pair.flagged_paths();
    if flagged.is_empty() {
        println!("{} No differences", "✓".green());
        return;
    }

    let show = |doc: &Document, path: &[String]| {
        value_at(doc, path)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(missing)".to_string())
    };
    for path in &flagged {
        println!(
            "  {} {}: {} → {}",
            "≠".yellow(),
            path.join("/"),
            show(left, path).red(),
            show(right, path).green()
        );
    }
    println!();
    println!("   {} {}", "Differences:".yellow(), flagged.len());
}
