use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use gridiron_dataset::config::Config;
use gridiron_dataset::fetch::HttpSource;
use gridiron_dataset::ingest;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let output = parse_output_arg().context("missing required --output <dir>")?;
    let year = parse_year_arg().ok_or_else(|| anyhow!("missing required --year <year>"))?;

    let config = Config::from_env();
    let source = HttpSource::new(&config)?;
    let summary = ingest::acquire_season(&config, &source, &output, year)?;
    let summary_path = ingest::write_summary(&summary)?;

    println!("Season {} acquisition complete", summary.year);
    println!("Output: {}", summary.output_dir.display());
    println!("Teams: {}/{}", summary.teams_succeeded, summary.teams_total);
    println!("Timeout retries: {}", summary.retries);
    println!("Summary: {}", summary_path.display());
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in &summary.errors {
            println!(" - {err}");
        }
    }

    Ok(())
}

fn parse_output_arg() -> Option<PathBuf> {
    arg_value(&["--output", "-o"])
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

fn parse_year_arg() -> Option<u16> {
    arg_value(&["--year", "-y"]).and_then(|raw| raw.trim().parse::<u16>().ok())
}

fn arg_value(names: &[&str]) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        for name in names {
            if let Some(value) = arg
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
            {
                return Some(value.to_string());
            }
            if arg.as_str() == *name
                && let Some(next) = args.get(idx + 1)
            {
                return Some(next.clone());
            }
        }
    }
    None
}
