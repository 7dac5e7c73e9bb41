use super::{find_node, labels, open_file, open_workspace, print_notice};
use crate::config::Overrides;
use anyhow::{anyhow, Result};
use cfgtree_editor::{EditOutcome, ScriptedPrompt};
use cfgtree_model::value_at;
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct GetArgs {
    pub file: PathBuf,

    /// Field path, labels separated by '/'
    pub path: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    pub file: PathBuf,

    /// Field path, labels separated by '/'
    pub path: String,

    /// New value, validated against the field's type
    pub value: String,

    /// Print the result instead of saving it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn get(args: GetArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let mut ws = open_workspace(overrides, cwd)?;
    open_file(&mut ws, &args.file)?;

    let document = ws.current_document()?;
    let value = value_at(&document, &labels(&args.path))
        .ok_or_else(|| anyhow!("No field at '{}'", args.path))?;

    match value {
        Value::String(text) => println!("{}", text),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

pub fn set(args: SetArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let mut ws = open_workspace(overrides, cwd)?;
    let tab = open_file(&mut ws, &args.file)?;
    let node = find_node(&ws, &args.path)?;

    let mut prompt = ScriptedPrompt::new([Some(args.value.clone())]);
    match ws.edit_value(node, &mut prompt)? {
        EditOutcome::Changed(value) => {
            println!("{} {} = {}", "✓".green(), args.path, value.bright_white());
        }
        EditOutcome::Unchanged | EditOutcome::Cancelled => {
            println!("{} {} unchanged", "⚠️".yellow(), args.path);
            return Ok(());
        }
        EditOutcome::Rejected(reason) => return Err(anyhow!(reason)),
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&ws.current_document()?)?);
    } else {
        print_notice(&ws.save(tab)?);
    }
    Ok(())
}
