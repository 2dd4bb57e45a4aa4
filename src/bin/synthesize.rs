use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use gridiron_dataset::features::{FeatureTable, synthesize_seasons};
use gridiron_dataset::record_store;

const DEFAULT_INPUT_DIR: &str = "data/team_stats";
const DEFAULT_OUTPUT_PATH: &str = "data/features.csv";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let input = parse_path_arg("--input").unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
    let output = parse_path_arg("--output").unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

    let loaded = record_store::load_all(&input)
        .with_context(|| format!("load records from {}", input.display()))?;
    if loaded.records.is_empty() {
        return Err(anyhow!("no team records found in {}", input.display()));
    }

    let synthesis = synthesize_seasons(&loaded.records);
    let table = FeatureTable::from_examples(&synthesis.examples);
    table.write_csv(&output)?;

    let report = synthesis.report;
    println!("Feature synthesis complete");
    println!(
        "Records: {} ({} badly named, {} unreadable)",
        loaded.records.len(),
        loaded.skipped.len(),
        loaded.unreadable.len()
    );
    println!("Weeks with opponent: {}", report.weeks_with_opponent);
    println!("Examples: {}", report.examples);
    println!("Skipped, opponent not loaded: {}", report.skipped_missing_opponent);
    println!("Skipped, outcome missing: {}", report.skipped_missing_outcome);
    println!("Columns: {} + label", table.columns.len());
    println!("Output: {}", output.display());

    Ok(())
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
        {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
