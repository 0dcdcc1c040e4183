//! Fragment Linter: validates theme pack coverage and placeholder use.
//!
//! Usage: fragment_linter [<pack.ron | dir>...] [--builtin]

use adventure_engine::core::fragment::{FragmentTable, ThemePack};
use adventure_engine::core::lint::lint_table;
use adventure_engine::themes;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fragment_linter")]
#[command(about = "Check theme packs for missing roles, unknown placeholders and weak coverage")]
struct Cli {
    /// Theme pack files or directories to lint (searched recursively)
    paths: Vec<PathBuf>,

    /// Also lint the built-in theme packs
    #[arg(long)]
    builtin: bool,

    /// Exit non-zero on warnings too
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut table = FragmentTable::default();

    if cli.builtin || cli.paths.is_empty() {
        table.merge(themes::builtin_table().context("built-in theme packs failed to load")?);
    }

    let mut load_failures = 0;
    for path in &cli.paths {
        if path.is_file() {
            load_failures += load_pack(path, &mut table);
        } else if path.is_dir() {
            load_failures += load_packs_recursive(path, &mut table);
        } else {
            eprintln!("ERROR: Path '{}' does not exist", path.display());
            process::exit(1);
        }
    }

    println!("Loaded {} theme pack(s)", table.len());

    let report = lint_table(&table);

    println!("\n=== Fragment Lint Report ===\n");

    if report.is_clean() && load_failures == 0 {
        println!("All checks passed!");
    }

    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }

    for error in &report.errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings, {} files failed to load",
        report.errors.len(),
        report.warnings.len(),
        load_failures
    );

    let failed = !report.errors.is_empty()
        || load_failures > 0
        || (cli.strict && !report.warnings.is_empty());
    process::exit(if failed { 1 } else { 0 });
}

fn load_pack(path: &Path, table: &mut FragmentTable) -> usize {
    match ThemePack::load_from_ron(path) {
        Ok(pack) => {
            println!("  Loaded: {} ({})", path.display(), pack.theme);
            table.insert(pack);
            0
        }
        Err(e) => {
            eprintln!("  ERROR loading {}: {}", path.display(), e);
            1
        }
    }
}

fn load_packs_recursive(dir: &Path, table: &mut FragmentTable) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read directory");
            return 1;
        }
    };

    let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();

    let mut failures = 0;
    for path in paths {
        if path.is_dir() {
            failures += load_packs_recursive(&path, table);
        } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            failures += load_pack(&path, table);
        }
    }
    failures
}
