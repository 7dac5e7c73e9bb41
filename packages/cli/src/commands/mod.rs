pub mod bind;
pub mod diff;
pub mod history;
pub mod query;
pub mod schema;
pub mod show;

pub use bind::{bind, models, unbind, BindArgs, ModelsArgs, UnbindArgs};
pub use diff::{diff, DiffArgs};
pub use history::{history, HistoryArgs};
pub use query::{get, set, GetArgs, SetArgs};
pub use schema::{schema, SchemaArgs};
pub use show::{show, ShowArgs};

use crate::config::Overrides;
use anyhow::{anyhow, Result};
use cfgtree_editor::{ConflictPolicy, DocumentWorkspace, Notice, NoticeLevel, TabId};
use cfgtree_model::NodeId;
use colored::Colorize;
use std::path::Path;

pub fn open_workspace(overrides: &Overrides, cwd: &Path) -> Result<DocumentWorkspace> {
    let config = overrides.resolve(cwd)?;
    Ok(DocumentWorkspace::from_config(config, cwd)?)
}

/// Open `file` as the active tab
pub fn open_file(ws: &mut DocumentWorkspace, file: &Path) -> Result<TabId> {
    ws.open(file, ConflictPolicy::Overwrite)?
        .ok_or_else(|| anyhow!("Could not open {}", file.display()))
}

/// Split `A/B/C` into labels
pub fn labels(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub fn find_node(ws: &DocumentWorkspace, path: &str) -> Result<NodeId> {
    let tab = ws.current().ok_or_else(|| anyhow!("No document open"))?;
    tab.tree
        .find_by_labels(&labels(path))
        .ok_or_else(|| anyhow!("No field at '{}'", path))
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => println!("{} {}", "✓".green(), notice.message),
        NoticeLevel::Warning => println!("{} {}", "⚠️".yellow(), notice.message),
        NoticeLevel::Error => eprintln!("{} {}", "✗".red(), notice.message),
    }
}
