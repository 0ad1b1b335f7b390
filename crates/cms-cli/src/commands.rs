use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use cms_assets::mime::mime_type_for_extension;
use cms_assets::schema::MIME_TYPE_PROPERTY;
use cms_assets::{
    Asset, AssetContext, AssetKind, AssetsConfig, AssetsRepository, StagedAssetLink,
    StagedAssetReal, UniversalAsset,
};
use cms_store::{InMemoryNodeStore, NodeStore};
use cms_types::{NodeId, NodePath};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = InMemoryNodeStore::load_or_new(&cli.store)
        .with_context(|| format!("loading store {}", cli.store.display()))?;
    let config = match &cli.config {
        Some(path) => AssetsConfig::load(path)?,
        None => AssetsConfig::default(),
    };
    let ctx = AssetContext::new(Arc::new(store.clone())).with_config(config)?;
    let format = cli.format;

    let mutated = match cli.command {
        Command::Put(args) => cmd_put(&ctx, args, format).map(|_| true),
        Command::Link(args) => cmd_link(&ctx, args, format).map(|_| true),
        Command::Ls(args) => cmd_ls(&ctx, args, format).map(|_| false),
        Command::Du(args) => cmd_du(&ctx, args, format).map(|_| false),
        Command::Show(args) => cmd_show(&ctx, args, format).map(|_| false),
        Command::Cat(args) => cmd_cat(&ctx, args).map(|_| false),
        Command::Rm(args) => cmd_rm(&store, args, format).map(|_| true),
    }?;

    if mutated {
        store
            .save_snapshot(&cli.store)
            .with_context(|| format!("saving store {}", cli.store.display()))?;
    }
    Ok(())
}

fn node_path(raw: &str) -> anyhow::Result<NodePath> {
    NodePath::parse(raw).with_context(|| format!("invalid path {raw:?}"))
}

/// Open an asset by absolute path, or by identity otherwise.
fn locate(ctx: &AssetContext, raw: &str) -> anyhow::Result<UniversalAsset> {
    if raw.starts_with('/') {
        return Ok(UniversalAsset::open(ctx, &node_path(raw)?)?);
    }
    let id = NodeId::parse(raw).with_context(|| format!("{raw:?} is neither a path nor an identity"))?;
    match AssetsRepository::new(ctx).find_by_id(&id)? {
        Some(asset) => Ok(asset),
        None => bail!("no asset with identity {id}"),
    }
}

#[derive(Serialize)]
struct AssetRow {
    path: String,
    id: String,
    kind: AssetKind,
    size: Option<u64>,
    mime_type: Option<String>,
}

impl AssetRow {
    /// Summarize `asset`. Read failures, such as a dangling link, leave the
    /// content fields empty.
    fn describe(asset: &UniversalAsset) -> anyhow::Result<Self> {
        let content = asset.content();
        let size = content.as_ref().ok().and_then(|c| c.size().ok()).map(|s| s.bytes());
        let mime_type = content.as_ref().ok().and_then(|c| c.mime_type().ok());
        Ok(Self {
            path: asset.path()?.to_string(),
            id: asset.identity().to_string(),
            kind: asset.kind(),
            size,
            mime_type,
        })
    }

    fn print(&self) {
        let size = match self.size {
            Some(bytes) => cms_types::DataSize::from_bytes(bytes).to_human(),
            None => "unresolved".red().to_string(),
        };
        println!(
            "{:<7} {}  {:>10}  {}",
            self.kind.to_string().cyan(),
            &self.id[self.id.len() - 8..].dimmed(),
            size,
            self.path.bold()
        );
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_put(ctx: &AssetContext, args: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = node_path(&args.path)?;
    let content = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;

    let mut metadata: BTreeMap<String, String> = args.meta.into_iter().collect();
    if let Some(name) = args.file.file_name().and_then(|n| n.to_str()) {
        metadata
            .entry("originalFileName".to_string())
            .or_insert_with(|| name.to_string());
    }
    if let Some(mime_type) = args.mime_type.or_else(|| guess_mime_type(&args.file)) {
        metadata.insert(MIME_TYPE_PROPERTY.to_string(), mime_type);
    }
    debug!(file = %args.file.display(), %path, keys = metadata.len(), "uploading");

    let asset = StagedAssetReal::new(ctx, content, metadata).save(&path)?;
    let row = AssetRow::describe(&asset)?;
    match format {
        OutputFormat::Json => print_json(&row),
        OutputFormat::Text => {
            println!("{} Saved {}", "✓".green().bold(), row.path.bold());
            println!("  Identity: {}", row.id.yellow());
            if let Some(mime_type) = &row.mime_type {
                println!("  Mime type: {}", mime_type.cyan());
            }
            Ok(())
        }
    }
}

fn guess_mime_type(file: &Path) -> Option<String> {
    file.extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_type_for_extension)
        .map(str::to_string)
}

fn cmd_link(ctx: &AssetContext, args: LinkArgs, format: OutputFormat) -> anyhow::Result<()> {
    let target = locate(ctx, &args.target)?;
    let path = node_path(&args.path)?;
    let link = StagedAssetLink::new(ctx, &target).save(&path)?;
    match format {
        OutputFormat::Json => print_json(&AssetRow::describe(&link)?),
        OutputFormat::Text => {
            println!(
                "{} Linked {} → {}",
                "✓".green().bold(),
                path.to_string().bold(),
                target.path()?.to_string().yellow()
            );
            println!("  Identity: {}", link.identity().to_string().yellow());
            Ok(())
        }
    }
}

fn cmd_ls(ctx: &AssetContext, args: LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = node_path(&args.path)?;
    let mut rows = AssetsRepository::new(ctx)
        .find(&path)?
        .iter()
        .map(AssetRow::describe)
        .collect::<anyhow::Result<Vec<_>>>()?;
    rows.sort_by(|a, b| a.path.cmp(&b.path));
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No assets under {}.", path);
            }
            rows.iter().for_each(AssetRow::print);
            Ok(())
        }
    }
}

fn cmd_du(ctx: &AssetContext, args: DuArgs, format: OutputFormat) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct Usage {
        path: String,
        bytes: u64,
        human: String,
    }

    let path = node_path(&args.path)?;
    let size = AssetsRepository::new(ctx).size_of(&path)?;
    let usage = Usage {
        path: path.to_string(),
        bytes: size.bytes(),
        human: size.to_human(),
    };
    match format {
        OutputFormat::Json => print_json(&usage),
        OutputFormat::Text => {
            println!("{}  {} ({})", usage.human.bold(), usage.path, size.to_string().dimmed());
            Ok(())
        }
    }
}

fn cmd_show(ctx: &AssetContext, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct Detail {
        #[serde(flatten)]
        row: AssetRow,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        metadata: BTreeMap<String, String>,
    }

    let asset = locate(ctx, &args.asset)?;
    let target = match asset.as_link() {
        Some(link) => Some(link.resolve()?.path()?.to_string()),
        None => None,
    };
    let detail = Detail {
        row: AssetRow::describe(&asset)?,
        target,
        metadata: asset.metadata()?.all()?,
    };

    match format {
        OutputFormat::Json => print_json(&detail),
        OutputFormat::Text => {
            println!("{} {}", detail.row.kind.to_string().cyan().bold(), detail.row.path.bold());
            println!("  Identity: {}", detail.row.id.yellow());
            if let Some(target) = &detail.target {
                println!("  Resolves to: {}", target.yellow());
            }
            if let Some(bytes) = detail.row.size {
                println!("  Size: {}", cms_types::DataSize::from_bytes(bytes).to_human());
            }
            if let Some(mime_type) = &detail.row.mime_type {
                println!("  Mime type: {}", mime_type);
            }
            let extension = asset.metadata()?.filename_extension()?;
            if !extension.is_empty() {
                println!("  Extension: {}", extension);
            }
            if !detail.metadata.is_empty() {
                println!("  Metadata:");
                for (key, value) in &detail.metadata {
                    println!("    {} = {}", key.dimmed(), value);
                }
            }
            Ok(())
        }
    }
}

fn cmd_cat(ctx: &AssetContext, args: CatArgs) -> anyhow::Result<()> {
    let asset = locate(ctx, &args.asset)?;
    let bytes = asset.content()?.bytes()?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_rm(store: &InMemoryNodeStore, args: RmArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = node_path(&args.path)?;
    if !store.open()?.remove(&path)? {
        bail!("nothing at {path}");
    }
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "removed": path.to_string() })),
        OutputFormat::Text => {
            println!("{} Removed {}", "✓".green().bold(), path.to_string().bold());
            Ok(())
        }
    }
}
