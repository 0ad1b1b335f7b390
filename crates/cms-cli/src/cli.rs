use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cms",
    about = "CMS asset store: upload, link and inspect assets",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Snapshot file holding the node store
    #[arg(long, global = true, default_value = "cms-store.json")]
    pub store: PathBuf,

    /// TOML file with asset layer settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a file as a real asset
    Put(PutArgs),
    /// Create a link to an existing asset
    Link(LinkArgs),
    /// List assets under a path
    Ls(LsArgs),
    /// Total content size under a path
    Du(DuArgs),
    /// Show one asset and its metadata
    Show(ShowArgs),
    /// Write an asset's content to stdout
    Cat(CatArgs),
    /// Delete a node and everything below it
    Rm(RmArgs),
}

#[derive(Args)]
pub struct PutArgs {
    pub file: PathBuf,
    pub path: String,
    /// Extra metadata as key=value, repeatable
    #[arg(short, long = "meta", value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,
    /// Mime type, guessed from the file extension when omitted
    #[arg(long)]
    pub mime_type: Option<String>,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Path or identity of the asset to link to
    pub target: String,
    pub path: String,
}

#[derive(Args)]
pub struct LsArgs {
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Args)]
pub struct DuArgs {
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Path or identity
    pub asset: String,
}

#[derive(Args)]
pub struct CatArgs {
    /// Path or identity
    pub asset: String,
}

#[derive(Args)]
pub struct RmArgs {
    pub path: String,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}
