//! ParaTool CLI - Merge item mods into an aggregator loot package.
//!
//! This is the main entry point for the ParaTool command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paratool::prelude::*;

/// ParaTool - loot table patcher for item mods
#[derive(Parser)]
#[command(name = "paratool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of a package
    List {
        /// Path to the package
        #[arg(short, long)]
        pak: PathBuf,

        /// Only show paths containing this text (`*` wildcards allowed)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract all files from a package
    Extract {
        /// Path to the package
        #[arg(short, long)]
        pak: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Pack a directory into a new package
    Pack {
        /// Input directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output package
        #[arg(short, long)]
        output: PathBuf,

        /// Load priority stored in the header
        #[arg(long, default_value_t = 0)]
        priority: u8,
    },

    /// Scan a mods directory and list the patchable items
    Scan {
        /// Directory holding the target package and the item mods
        #[arg(short, long, env = "PARATOOL_MODS_DIR")]
        mods: PathBuf,

        /// Directory of vanilla stat files used for inheritance
        #[arg(short, long, env = "PARATOOL_BASE_STATS")]
        base_stats: Option<PathBuf>,

        /// Write the scan result as a JSON catalog
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// Patch the target package with the scanned items
    Patch {
        /// Directory holding the target package and the item mods
        #[arg(short, long, env = "PARATOOL_MODS_DIR")]
        mods: PathBuf,

        /// Directory of vanilla stat files used for inheritance
        #[arg(short, long, env = "PARATOOL_BASE_STATS")]
        base_stats: Option<PathBuf>,

        /// Use an edited JSON catalog instead of scanning
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Stat IDs to leave out
        #[arg(short, long)]
        exclude: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List { pak, filter, detailed } => {
            cmd_list(&pak, filter.as_deref(), detailed)?;
        }
        Commands::Extract { pak, output } => {
            cmd_extract(&pak, &output)?;
        }
        Commands::Pack {
            input,
            output,
            priority,
        } => {
            cmd_pack(&input, &output, priority)?;
        }
        Commands::Scan {
            mods,
            base_stats,
            catalog,
        } => {
            cmd_scan(&mods, base_stats.as_deref(), catalog.as_deref())?;
        }
        Commands::Patch {
            mods,
            base_stats,
            catalog,
            exclude,
        } => {
            cmd_patch(&mods, base_stats.as_deref(), catalog.as_deref(), &exclude)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn cmd_list(pak_path: &Path, filter: Option<&str>, detailed: bool) -> Result<()> {
    let archive = LspkArchive::open(pak_path).context("Failed to open package")?;

    let mut count = 0;
    for record in archive.iter() {
        if let Some(pattern) = filter {
            if !path_matches(pattern, &record.path) {
                continue;
            }
        }

        if detailed {
            println!(
                "{:>12} {:>12} {:<4} {}",
                record.disk_size,
                record.uncompressed_size,
                record
                    .compression()
                    .map_or("?", |method| method.name()),
                record.path
            );
        } else {
            println!("{}", record.path);
        }
        count += 1;
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}

fn cmd_extract(pak_path: &Path, output: &Path) -> Result<()> {
    println!("Opening package: {}", pak_path.display());

    let start = Instant::now();
    let archive = LspkArchive::open(pak_path).context("Failed to open package")?;
    println!("Loaded {} entries in {:?}", archive.entry_count(), start.elapsed());

    let start = Instant::now();
    let count = archive
        .extract_all(output)
        .context("Failed to extract package")?;
    println!("Extracted {} files in {:?}", count, start.elapsed());

    Ok(())
}

fn cmd_pack(input: &Path, output: &Path, priority: u8) -> Result<()> {
    println!("Packing: {} -> {}", input.display(), output.display());

    let start = Instant::now();
    let writer = ArchiveWriter::new(WriterOptions { flags: 0, priority });
    let summary = writer
        .write_to_path(input, output)
        .context("Failed to write package")?;

    println!(
        "Packed {} files ({} bytes) in {:?}",
        summary.file_count,
        summary.package_size,
        start.elapsed()
    );

    Ok(())
}

fn cmd_scan(mods_dir: &Path, base_stats: Option<&Path>, catalog: Option<&Path>) -> Result<()> {
    let result = scan(mods_dir, base_stats)?;

    println!("Target: {}", result.target_archive.display());
    for descriptor in &result.mods {
        println!("\n{} ({})", descriptor.name, descriptor.uuid);
        for item in &descriptor.items {
            println!(
                "  {:<40} {:<12} {:<10} {:>5}",
                item.stat_id,
                item.effective_pool().as_str(),
                item.effective_rarity().as_str(),
                item.price()
            );
        }
    }
    println!(
        "\nTotal: {} items in {} mods",
        result.item_count(),
        result.mods.len()
    );

    if let Some(path) = catalog {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize catalog")?;
        fs::write(path, json).context("Failed to write catalog")?;
        println!("Catalog written to {}", path.display());
    }

    Ok(())
}

fn cmd_patch(
    mods_dir: &Path,
    base_stats: Option<&Path>,
    catalog: Option<&Path>,
    exclude: &[String],
) -> Result<()> {
    let mut result = match catalog {
        Some(path) => {
            let json = fs::read_to_string(path).context("Failed to read catalog")?;
            serde_json::from_str::<ScanResult>(&json).context("Failed to parse catalog")?
        }
        None => scan(mods_dir, base_stats)?,
    };

    for item in result.mods.iter_mut().flat_map(|m| m.items.iter_mut()) {
        if exclude.iter().any(|id| id.eq_ignore_ascii_case(&item.stat_id)) {
            item.enabled = false;
        }
    }

    println!("Patching: {}", result.target_archive.display());

    let start = Instant::now();
    let pb = progress_bar(100)?;
    let sink = |p: PatchProgress| {
        pb.set_position(u64::from(p.percent));
        pb.set_message(p.stage.label());
    };

    let summary = Patcher::default()
        .patch(
            &result.target_archive,
            &result.mods,
            &sink,
            &CancellationToken::new(),
        )
        .context("Patch failed")?;

    pb.finish_with_message("Done");
    println!(
        "Patched {} items ({} loot table references) in {:?}",
        summary.items_patched,
        summary.references_added,
        start.elapsed()
    );

    Ok(())
}

fn scan(mods_dir: &Path, base_stats: Option<&Path>) -> Result<ScanResult> {
    let base = match base_stats {
        Some(dir) => {
            let base = BaseStats::load_dir(dir).context("Failed to load base stats")?;
            info!("Loaded {} base stat entries", base.len());
            base
        }
        None => {
            warn!("No base stats directory; inherited properties will not resolve");
            BaseStats::empty()
        }
    };

    let start = Instant::now();
    let pb = progress_bar(0)?;
    let result = ModScanner::new(&base)
        .scan(mods_dir, |p| {
            pb.set_length(p.total as u64);
            pb.set_position(p.scanned as u64);
            pb.set_message(format!("{} mods", p.mods_found));
        })
        .context("Scan failed")?;
    pb.finish_and_clear();

    info!(
        "Scanned {} in {:?}",
        mods_dir.display(),
        start.elapsed()
    );
    Ok(result)
}

/// Case-insensitive path filter.
///
/// Without `*` the pattern matches as a substring, with it as a glob.
fn path_matches(pattern: &str, path: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let path = path.to_lowercase();

    if pattern.contains('*') {
        glob::Pattern::new(&pattern).is_ok_and(|p| p.matches(&path))
    } else {
        path.contains(&pattern)
    }
}
