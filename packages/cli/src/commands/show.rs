use super::{open_file, open_workspace};
use crate::config::Overrides;
use anyhow::Result;
use cfgtree_model::FieldTypeRegistry;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Document to display (.json, .yaml, .yml)
    pub file: PathBuf,

    /// Only show fields matching these keywords (separated by space, comma or semicolon)
    #[arg(short, long)]
    pub filter: Option<String>,
}

pub fn show(args: ShowArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let mut ws = open_workspace(overrides, cwd)?;
    open_file(&mut ws, &args.file)?;

    let visible = match &args.filter {
        Some(keywords) => Some(ws.filter(keywords)?),
        None => None,
    };

    let registry = ws.registry();
    let Some(tab) = ws.current() else {
        return Ok(());
    };

    println!("📄 {}", tab.name.bold());
    if let Some(binding) = &tab.binding {
        println!("   Bound model: {}", binding.model_id.cyan());
    }
    println!();

    for id in tab.tree.walk() {
        if visible.as_ref().is_some_and(|v| !v.contains(&id)) {
            continue;
        }
        let Some(node) = tab.tree.get(id) else {
            continue;
        };
        let indent = "  ".repeat(tab.tree.depth(id) + 1);
        let lock = if node.data.locked { " 🔒" } else { "" };

        if node.is_container() {
            let label = display_label(registry, &node.data.label, tab.tree.depth(id));
            println!("{}{}{}", indent, label.bold(), lock);
        } else {
            let address = tab.tree.address_of(id)?;
            let field_type = registry.field_type(&address);
            println!(
                "{}{}: {} {}{}",
                indent,
                node.data.label,
                node.data.value.replace('\n', " | ").bright_white(),
                format!("[{}]", field_type.tag()).dimmed(),
                lock
            );
        }
    }

    Ok(())
}

/// Top-level groups are shown under their configured tab name
fn display_label(registry: &FieldTypeRegistry, label: &str, depth: usize) -> String {
    let shown = registry.tab_display_name(label);
    if depth == 0 && shown != label {
        format!("{} ({})", shown, label)
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgtree_model::SchemaFile;

    #[test]
    fn test_top_level_groups_use_tab_names() {
        let file = SchemaFile::from_yaml_str(
            "tab-names:\n  基本参数: 基本\nparam-structure:\n  基本参数:\n    type: group\n",
        )
        .unwrap();
        let registry = FieldTypeRegistry::from_schema_file(&file);

        assert_eq!(display_label(&registry, "基本参数", 0), "基本 (基本参数)");
        assert_eq!(display_label(&registry, "基本参数", 1), "基本参数");
        assert_eq!(display_label(&registry, "设备", 0), "设备");
    }
}
