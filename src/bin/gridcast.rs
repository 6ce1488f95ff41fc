use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gridcast::{NewsItem, Studio, StudioConfig};

#[derive(Parser, Debug)]
#[command(name = "gridcast", version, about = "Branded motorsport news cards and digest reels")]
struct Cli {
    /// Studio config JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose one PNG card per news item.
    Card(ItemsArgs),
    /// Build a narrated MP4 digest (requires `ffmpeg` on PATH).
    Digest(DigestArgs),
    /// Print the team colors resolved for a headline.
    Colors {
        /// Headline or any text to resolve.
        text: String,
    },
    /// Build cards and a digest, then list the review queue with captions.
    Review(DigestArgs),
}

#[derive(Parser, Debug)]
struct ItemsArgs {
    /// JSON array of news items.
    #[arg(long)]
    items: PathBuf,
}

#[derive(Parser, Debug)]
struct DigestArgs {
    #[command(flatten)]
    items: ItemsArgs,

    /// Build the digest even with fewer than three items.
    #[arg(long, default_value_t = false)]
    force: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };

    match cli.cmd {
        Command::Card(args) => cmd_card(config, &args),
        Command::Digest(args) => cmd_digest(config, &args),
        Command::Colors { text } => {
            let pair = gridcast::brand::resolve(&text);
            println!("primary {}", pair.primary);
            println!("accent  {}", pair.accent);
            Ok(())
        }
        Command::Review(args) => cmd_review(config, &args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .try_init();
}

fn read_items(path: &Path) -> anyhow::Result<Vec<NewsItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read items '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse items '{}'", path.display()))
}

fn cmd_card(config: StudioConfig, args: &ItemsArgs) -> anyhow::Result<()> {
    let items = read_items(&args.items)?;
    let mut studio = Studio::new(config)?;
    let mut failed = 0usize;
    for item in &items {
        match studio.compose(item) {
            Ok(path) => eprintln!("wrote {}", path.display()),
            Err(err) => {
                failed += 1;
                eprintln!("card '{}' failed: {err}", item.id);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} cards failed", items.len());
    }
    Ok(())
}

fn cmd_digest(config: StudioConfig, args: &DigestArgs) -> anyhow::Result<()> {
    let items = read_items(&args.items.items)?;
    if items.len() < gridcast::MIN_DIGEST_ITEMS && !args.force {
        anyhow::bail!(
            "a digest needs at least {} items (got {}); pass --force to build anyway",
            gridcast::MIN_DIGEST_ITEMS,
            items.len()
        );
    }
    let mut studio = Studio::new(config)?;
    let path = studio
        .compose_digest(&items)
        .context("digest was not produced; see the log for the cause")?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_review(config: StudioConfig, args: &DigestArgs) -> anyhow::Result<()> {
    let items = read_items(&args.items.items)?;
    let mut studio = Studio::new(config)?;
    studio.queue_cards(&items);
    studio.queue_digest(&items, args.force);

    if studio.review().is_empty() {
        println!("review queue is empty");
        return Ok(());
    }
    for asset in studio.review().iter() {
        println!("[{}] {:?} {}", asset.id, asset.kind, asset.source.headline());
        for path in &asset.paths {
            println!("  {}", path.display());
        }
        if let Some(caption) = &asset.caption {
            for line in caption.lines() {
                println!("  | {line}");
            }
        }
    }
    Ok(())
}
