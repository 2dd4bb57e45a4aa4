use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::Config;
use crate::extract::{ExtractOptions, extract_season};
use crate::fetch::{DocumentSource, fetch_season};
use crate::record_store::{record_path, save};
use crate::teams::{SeasonKey, TeamCode, all_teams};

#[derive(Debug, Clone, Serialize)]
pub struct AcquireSummary {
    pub year: u16,
    pub output_dir: PathBuf,
    pub started_at: String,
    pub finished_at: String,
    pub teams_total: usize,
    pub teams_succeeded: usize,
    /// Whole-season restarts caused by timeouts, across all teams.
    pub retries: u32,
    pub errors: Vec<String>,
}

struct TeamOutcome {
    retries: u32,
}

/// Fetch, extract and store one season for every team in the registry.
///
/// Teams run on a pool of `config.fetch_parallelism` workers. A failing team is
/// recorded in `errors` and does not affect the others.
pub fn acquire_season<S: DocumentSource>(
    config: &Config,
    source: &S,
    output_dir: &Path,
    year: u16,
) -> Result<AcquireSummary> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;

    let started_at = Utc::now().to_rfc3339();
    let teams = all_teams().collect::<Vec<_>>();

    let results: Vec<(TeamCode, Result<TeamOutcome>)> = with_fetch_pool(config, || {
        teams
            .par_iter()
            .map(|team| {
                let key = SeasonKey::new(*team, year);
                (*team, acquire_team(config, source, output_dir, key))
            })
            .collect()
    });

    let mut teams_succeeded = 0usize;
    let mut retries = 0u32;
    let mut errors = Vec::new();
    for (team, result) in results {
        match result {
            Ok(outcome) => {
                teams_succeeded += 1;
                retries = retries.saturating_add(outcome.retries);
            }
            Err(err) => {
                error!("{} {year} failed: {err:#}", team.name());
                errors.push(format!("{} {year}: {err:#}", team.name()));
            }
        }
    }

    Ok(AcquireSummary {
        year,
        output_dir: output_dir.to_path_buf(),
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        teams_total: teams.len(),
        teams_succeeded,
        retries,
        errors,
    })
}

fn acquire_team<S: DocumentSource>(
    config: &Config,
    source: &S,
    output_dir: &Path,
    key: SeasonKey,
) -> Result<TeamOutcome> {
    let fetched = fetch_season(source, &config.base_url, key, &config.retry)
        .with_context(|| format!("fetch {key}"))?;
    let options = ExtractOptions {
        extended_overall: config.extended_overall,
    };
    let record = extract_season(
        &fetched.documents.overview,
        &fetched.documents.advanced,
        options,
    )
    .with_context(|| format!("extract {key}"))?;

    let path = record_path(output_dir, key);
    save(&path, &record).with_context(|| format!("save {}", path.display()))?;
    info!(
        "{key}: {} fields written to {} ({} retries)",
        record.len(),
        path.display(),
        fetched.retries
    );
    Ok(TeamOutcome {
        retries: fetched.retries,
    })
}

fn with_fetch_pool<T>(config: &Config, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.fetch_parallelism.max(1))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

/// Persist the run summary next to the records. `load_all` ignores it.
pub fn write_summary(summary: &AcquireSummary) -> Result<PathBuf> {
    let path = summary
        .output_dir
        .join(format!("ingest_{}.json", summary.year));
    let json = serde_json::to_string_pretty(summary).context("serialize ingest summary")?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
