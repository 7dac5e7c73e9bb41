mod commands;
mod config;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{
    bind, diff, get, history, models, schema, set, show, unbind, BindArgs, DiffArgs, GetArgs,
    HistoryArgs, ModelsArgs, SchemaArgs, SetArgs, ShowArgs, UnbindArgs,
};
use config::Overrides;
use tracing_subscriber::EnvFilter;

/// cfgtree - schema-driven editor for JSON/YAML configuration trees
#[derive(Parser, Debug)]
#[command(name = "cfgtree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Schema file (overrides schemaPath in cfgtree.config.json)
    #[arg(long, global = true)]
    schema: Option<String>,

    /// History log (overrides historyPath in cfgtree.config.json)
    #[arg(long, global = true)]
    history: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a document as a typed tree
    Show(ShowArgs),

    /// Print the value at a field path
    Get(GetArgs),

    /// Set a field through its type's editor and save
    Set(SetArgs),

    /// Compare two documents, or a document with a saved version
    Diff(DiffArgs),

    /// List saved versions
    History(HistoryArgs),

    /// Bind a model's parameters into a document
    Bind(BindArgs),

    /// Remove the bound model from a document
    Unbind(UnbindArgs),

    /// List models available for binding
    Models(ModelsArgs),

    /// Print the field types registered by the schema
    Schema(SchemaArgs),
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = Overrides {
        schema: cli.schema,
        history: cli.history,
    };

    let result = match std::env::current_dir() {
        Ok(cwd) => match cli.command {
            Command::Show(args) => show(args, &overrides, &cwd),
            Command::Get(args) => get(args, &overrides, &cwd),
            Command::Set(args) => set(args, &overrides, &cwd),
            Command::Diff(args) => diff(args, &overrides, &cwd),
            Command::History(args) => history(args, &overrides, &cwd),
            Command::Bind(args) => bind(args, &overrides, &cwd).await,
            Command::Unbind(args) => unbind(args, &overrides, &cwd),
            Command::Models(args) => models(args, &cwd).await,
            Command::Schema(args) => schema(args, &overrides, &cwd),
        },
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
