use criterion::{Criterion, criterion_group, criterion_main};
use indexmap::IndexMap;
use std::hint::black_box;

use gridiron_dataset::extract::{ExtractOptions, extract_season};
use gridiron_dataset::features::{FeatureTable, synthesize};
use gridiron_dataset::record::StatRecord;
use gridiron_dataset::teams::{TeamCode, all_teams};

fn bench_extract_season(c: &mut Criterion) {
    c.bench_function("extract_season", |b| {
        b.iter(|| {
            let record = extract_season(
                black_box(OVERVIEW_HTML),
                black_box(ADVANCED_HTML),
                ExtractOptions::default(),
            )
            .unwrap();
            black_box(record.len());
        })
    });
}

/// A full league where every team plays the next team in the registry each week.
fn league_records(weeks: usize) -> IndexMap<TeamCode, StatRecord> {
    let teams = all_teams().collect::<Vec<_>>();
    let base = extract_season(OVERVIEW_HTML, ADVANCED_HTML, ExtractOptions::default())
        .expect("fixture season parses");
    teams
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            let mut record = StatRecord::new();
            for (name, value) in base.stat_fields() {
                record.insert(name, value.clone());
            }
            for week in 1..=weeks {
                let opponent = teams[(idx + week) % teams.len()];
                record.insert(format!("week_{week}_won"), ((idx + week) % 2) as i64);
                record.insert(format!("week_{week}_opponent"), opponent.as_str());
            }
            (*team, record)
        })
        .collect()
}

fn bench_synthesize_league(c: &mut Criterion) {
    let records = league_records(17);
    c.bench_function("synthesize_league", |b| {
        b.iter(|| {
            let out = synthesize(black_box(&records));
            black_box(out.examples.len());
        })
    });
}

fn bench_feature_table(c: &mut Criterion) {
    let examples = synthesize(&league_records(17)).examples;
    c.bench_function("feature_table_build", |b| {
        b.iter(|| {
            let table = FeatureTable::from_examples(black_box(&examples));
            black_box(table.len());
        })
    });
}

criterion_group!(
    perf,
    bench_extract_season,
    bench_synthesize_league,
    bench_feature_table
);
criterion_main!(perf);

static OVERVIEW_HTML: &str = include_str!("../tests/fixtures/overview_2021.htm");
static ADVANCED_HTML: &str = include_str!("../tests/fixtures/advanced_2021.htm");
