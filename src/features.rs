//! Team-vs-opponent training rows from a set of season records.
//!
//! Each week a team recorded an opponent for becomes one row: the team's season
//! aggregates, the opponent's aggregates under an opponent prefix, and the team's
//! result as the label. A game between two loaded teams therefore yields two rows,
//! one per perspective, with complementary labels. Those rows are correlated.
//!
//! Weeks whose opponent is not in the working set produce no row; they are counted
//! in `SynthesisReport` rather than raised.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use log::{debug, info};
use serde::Serialize;

use crate::record::{StatRecord, StatValue};
use crate::teams::{SeasonKey, TeamCode};

pub const OPPONENT_PREFIX: &str = "__opponent_";
pub const LABEL_FIELD: &str = "result";

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureExample {
    pub team: TeamCode,
    pub opponent: TeamCode,
    pub week: String,
    pub features: IndexMap<String, StatValue>,
    /// 1 if `team` won that week, else 0.
    pub label: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SynthesisReport {
    pub teams: usize,
    pub weeks_with_opponent: usize,
    pub examples: usize,
    /// Opponent code not in the working set (or not a known team).
    pub skipped_missing_opponent: usize,
    /// Opponent recorded but no usable outcome for the same week.
    pub skipped_missing_outcome: usize,
}

impl SynthesisReport {
    fn absorb(&mut self, other: SynthesisReport) {
        self.teams += other.teams;
        self.weeks_with_opponent += other.weeks_with_opponent;
        self.examples += other.examples;
        self.skipped_missing_opponent += other.skipped_missing_opponent;
        self.skipped_missing_outcome += other.skipped_missing_outcome;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub examples: Vec<FeatureExample>,
    pub report: SynthesisReport,
}

/// Synthesize one season's working set. Output is grouped by team in map order,
/// and by recorded week order within a team.
pub fn synthesize(records: &IndexMap<TeamCode, StatRecord>) -> Synthesis {
    let entries = records.iter().map(|(team, record)| (*team, record)).collect::<Vec<_>>();
    synthesize_entries(&entries)
}

/// Synthesize across seasons, resolving opponents only within the same year.
pub fn synthesize_seasons(records: &IndexMap<SeasonKey, StatRecord>) -> Synthesis {
    let mut by_year: IndexMap<u16, Vec<(TeamCode, &StatRecord)>> = IndexMap::new();
    for (key, record) in records {
        by_year.entry(key.year).or_default().push((key.team, record));
    }

    let mut out = Synthesis::default();
    for (year, entries) in &by_year {
        let season = synthesize_entries(entries);
        info!(
            "season {year}: {} examples from {} teams ({} weeks skipped, opponent missing)",
            season.report.examples, season.report.teams, season.report.skipped_missing_opponent
        );
        out.examples.extend(season.examples);
        out.report.absorb(season.report);
    }
    out
}

fn synthesize_entries(entries: &[(TeamCode, &StatRecord)]) -> Synthesis {
    let lookup: HashMap<TeamCode, &StatRecord> = entries.iter().copied().collect();
    let mut out = Synthesis::default();
    out.report.teams = entries.len();

    for (team, record) in entries {
        for (week, opponent_value) in record.opponent_weeks() {
            out.report.weeks_with_opponent += 1;

            let opponent = opponent_value
                .as_text()
                .and_then(TeamCode::from_code)
                .and_then(|code| lookup.get(&code).map(|r| (code, *r)));
            let Some((opponent, opponent_record)) = opponent else {
                debug!("{team} week {week}: opponent {opponent_value} not loaded, skipping");
                out.report.skipped_missing_opponent += 1;
                continue;
            };

            let Some(label) = record.week_won(week).and_then(outcome_label) else {
                debug!("{team} week {week}: no outcome recorded, skipping");
                out.report.skipped_missing_outcome += 1;
                continue;
            };

            out.examples.push(build_example(
                *team,
                record,
                opponent,
                opponent_record,
                week,
                label,
            ));
        }
    }
    out.report.examples = out.examples.len();
    out
}

fn build_example(
    team: TeamCode,
    record: &StatRecord,
    opponent: TeamCode,
    opponent_record: &StatRecord,
    week: &str,
    label: u8,
) -> FeatureExample {
    let mut features = IndexMap::new();
    for (name, value) in record.stat_fields() {
        features.insert(name.to_string(), value.clone());
    }
    for (name, value) in opponent_record.stat_fields() {
        features.insert(format!("{OPPONENT_PREFIX}{name}"), value.clone());
    }
    FeatureExample {
        team,
        opponent,
        week: week.to_string(),
        features,
        label,
    }
}

fn outcome_label(value: &StatValue) -> Option<u8> {
    match value.as_i64()? {
        0 => Some(0),
        1 => Some(1),
        _ => None,
    }
}

/// Tabular view handed to model training: feature columns plus a separate label.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    /// Union of every example's feature names, in first-seen order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<StatValue>>>,
    pub labels: Vec<u8>,
}

impl FeatureTable {
    pub fn from_examples(examples: &[FeatureExample]) -> Self {
        let columns = examples
            .iter()
            .flat_map(|example| example.features.keys().map(String::as_str))
            .collect::<IndexSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let rows = examples
            .iter()
            .map(|example| {
                columns
                    .iter()
                    .map(|col| example.features.get(col).cloned())
                    .collect()
            })
            .collect();
        let labels = examples.iter().map(|e| e.label).collect();
        Self {
            columns,
            rows,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write as CSV with the label column last. Missing cells are left empty.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("create output dir {}", dir.display()))?;
        }
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("open feature table {}", path.display()))?;

        let mut header = self.columns.clone();
        header.push(LABEL_FIELD.to_string());
        writer.write_record(&header).context("write header")?;

        for (row, label) in self.rows.iter().zip(&self.labels) {
            let mut line = row
                .iter()
                .map(|cell| cell.as_ref().map(ToString::to_string).unwrap_or_default())
                .collect::<Vec<_>>();
            line.push(label.to_string());
            writer.write_record(&line).context("write feature row")?;
        }
        writer.flush().context("flush feature table")?;
        Ok(())
    }
}
