use super::open_workspace;
use crate::config::Overrides;
use anyhow::Result;
use cfgtree_model::FieldTypeRegistry;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Also print the options of dropdown and checkbox fields
    #[arg(short, long)]
    pub options: bool,

    /// Also list the parameter templates offered as presets
    #[arg(short, long)]
    pub templates: bool,
}

pub fn schema(args: SchemaArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let ws = open_workspace(overrides, cwd)?;
    let registry = ws.registry();

    println!("📐 {}", registry.title().bold());
    println!();

    for (address, entry) in registry.entries() {
        let default = entry
            .default
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        println!(
            "  {} {} {}",
            address.as_str(),
            format!("[{}]", entry.field_type.tag()).cyan(),
            default.dimmed()
        );
        if args.options {
            if let Some(options) = &entry.options {
                println!("      options: {}", options);
            }
        }
    }

    if args.templates {
        println!();
        println!("🧩 {}", "Templates".bold());
        let lines = template_lines(registry);
        if lines.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for line in lines {
            println!("  {}", line);
        }
    }
    Ok(())
}

/// One `name: content` line per parameter template
fn template_lines(registry: &FieldTypeRegistry) -> Vec<String> {
    registry
        .param_templates()
        .iter()
        .map(|(name, template)| format!("{}: {}", name, template))
        .collect()
}
