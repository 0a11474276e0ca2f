//! Glint CLI Binary
//!
//! Runs a full resolution pass over a tile list: resolves each tile's icon
//! through the fallback chain and derives its background gradient, printing
//! the outcome per tile.

use anyhow::{Context, Result};
use clap::Parser;
use glint::config::GlintConfig;
use glint::logging::init_logging;
use glint::resolver::ResourceResolver;
use glint::types::{parse_auth_groups, Tile};
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "glint",
    version,
    about = "Resolve dashboard tile icons and background gradients"
)]
struct Cli {
    /// TOML file containing the tile list
    #[arg(short, long, value_name = "FILE")]
    tiles: PathBuf,

    /// Engine configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only resolve tiles visible to these groups (comma-separated,
    /// `role:` entries ignored)
    #[arg(long, value_name = "GROUPS")]
    groups: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct TileFile {
    #[serde(default)]
    tiles: Vec<Tile>,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match GlintConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&cli, &config) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn run(cli: &Cli, config: &GlintConfig) -> Result<()> {
    let tiles = load_tiles(&cli.tiles)?;
    let tiles = match &cli.groups {
        Some(raw) => {
            let groups = parse_auth_groups(raw);
            tiles
                .into_iter()
                .filter(|tile| tile.visible_to(&groups))
                .collect()
        }
        None => tiles,
    };
    info!(count = tiles.len(), "starting resolution pass");

    let resolver = ResourceResolver::from_config(config)
        .context("failed to initialize resolution engine")?;

    for tile in &tiles {
        let resources = resolver.resolve_tile(tile).await;
        match (&resources.icon, &resources.gradient) {
            (Some(icon), Some(gradient)) => println!(
                "{} {} [{} | {}]",
                tile.id.green().bold(),
                icon.display(),
                gradient.left,
                gradient.right
            ),
            _ => println!("{} {}", tile.id.yellow().bold(), "no icon".dimmed()),
        }
    }

    resolver.flush().context("failed to flush engine store")?;
    Ok(())
}

fn load_tiles(path: &PathBuf) -> Result<Vec<Tile>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tile list {:?}", path))?;
    let file: TileFile =
        toml::from_str(&raw).with_context(|| format!("failed to parse tile list {:?}", path))?;
    Ok(file.tiles)
}
