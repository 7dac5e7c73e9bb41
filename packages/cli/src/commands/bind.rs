use super::{open_file, open_workspace, print_notice};
use crate::config::Overrides;
use anyhow::{anyhow, Result};
use cfgtree_editor::NoticeLevel;
use cfgtree_tools::{JsonModelSource, ModelCatalog, ModelParamFetcher, Retrying};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct BindArgs {
    pub file: PathBuf,

    /// Model name
    pub model: String,

    /// Directory of `<model>.json` parameter files
    #[arg(short, long, default_value = "models")]
    pub source: PathBuf,
}

#[derive(Args, Debug)]
pub struct UnbindArgs {
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Directory of `<model>.json` parameter files
    #[arg(short, long, default_value = "models")]
    pub source: PathBuf,
}

pub async fn bind(args: BindArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let mut ws = open_workspace(overrides, cwd)?;
    let tab = open_file(&mut ws, &args.file)?;

    let source = Retrying::new(JsonModelSource::new(cwd.join(&args.source)));
    let prefix = ws.config().binding_prefix.clone();

    let notice = match source.fetch(&prefix, &args.model).await {
        Ok(fetched) => ws.bind_model(&args.model, fetched)?,
        Err(err) => ws.bind_failed(&args.model, &err),
    };
    print_notice(&notice);
    if notice.is_error() {
        return Err(anyhow!(notice.message));
    }

    print_notice(&ws.save(tab)?);
    Ok(())
}

pub fn unbind(args: UnbindArgs, overrides: &Overrides, cwd: &Path) -> Result<()> {
    let mut ws = open_workspace(overrides, cwd)?;
    let tab = open_file(&mut ws, &args.file)?;

    let notice = ws.unbind_model()?;
    print_notice(&notice);
    if notice.level == NoticeLevel::Info {
        print_notice(&ws.save(tab)?);
    }
    Ok(())
}

pub async fn models(args: ModelsArgs, cwd: &Path) -> Result<()> {
    let source = Retrying::new(JsonModelSource::new(cwd.join(&args.source)));
    let models = source.list_models().await?;

    if models.is_empty() {
        println!("{} No models in {}", "⚠️".yellow(), args.source.display());
    }
    for model in models {
        println!("   {}", model);
    }
    Ok(())
}
