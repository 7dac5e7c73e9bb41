use anyhow::Result;
use cfgtree_editor::EditorConfig;
use std::path::Path;

/// Config file settings replaced by command-line flags
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub schema: Option<String>,
    pub history: Option<String>,
}

impl Overrides {
    /// Load `cfgtree.config.json` from `cwd` and apply the flags on top
    pub fn resolve(&self, cwd: &Path) -> Result<EditorConfig> {
        let mut config = EditorConfig::load(cwd)?;
        if let Some(schema) = &self.schema {
            config.schema_path = schema.clone();
        }
        if let Some(history) = &self.history {
            config.history_path = history.clone();
        }
        Ok(config)
    }
}
