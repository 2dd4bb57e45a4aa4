use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use gridiron_dataset::config::Config;
use gridiron_dataset::errors::FetchError;
use gridiron_dataset::fetch::{DocumentSource, SeasonUrls, fetch_season};
use gridiron_dataset::ingest::{acquire_season, write_summary};
use gridiron_dataset::record_store::{load_all, record_path};
use gridiron_dataset::retry::RetryPolicy;
use gridiron_dataset::teams::{SeasonKey, TeamCode};

const BASE: &str = "https://stats.test";

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Serves the recorded fixtures for every team. Individual URLs can be scripted to
/// time out a number of times or to fail with an HTTP status.
struct ScriptedSource {
    overview: String,
    advanced: String,
    timeouts: Mutex<HashMap<String, u32>>,
    statuses: HashMap<String, u16>,
    calls: Mutex<HashMap<String, u32>>,
    /// Set if a request arrives while the record it feeds already exists on disk.
    watch: Option<(String, PathBuf)>,
    saw_record_early: AtomicBool,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            overview: read_fixture("overview_2021.htm"),
            advanced: read_fixture("advanced_2021.htm"),
            timeouts: Mutex::new(HashMap::new()),
            statuses: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
            watch: None,
            saw_record_early: AtomicBool::new(false),
        }
    }

    fn time_out(self, url: &str, times: u32) -> Self {
        self.timeouts
            .lock()
            .expect("timeouts lock")
            .insert(url.to_string(), times);
        self
    }

    fn fail_with(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    fn watch_record(mut self, url: &str, record: &Path) -> Self {
        self.watch = Some((url.to_string(), record.to_path_buf()));
        self
    }

    fn calls(&self, url: &str) -> u32 {
        self.calls
            .lock()
            .expect("calls lock")
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

impl DocumentSource for ScriptedSource {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry(url.to_string())
            .or_default() += 1;

        if let Some((watched, record)) = &self.watch
            && watched == url
            && record.exists()
        {
            self.saw_record_early.store(true, Ordering::SeqCst);
        }

        if let Some(left) = self.timeouts.lock().expect("timeouts lock").get_mut(url)
            && *left > 0
        {
            *left -= 1;
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }
        if let Some(status) = self.statuses.get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            });
        }
        if url.ends_with("_advanced.htm") {
            Ok(self.advanced.clone())
        } else {
            Ok(self.overview.clone())
        }
    }
}

fn key(name: &str, year: u16) -> SeasonKey {
    SeasonKey::new(TeamCode::from_name(name).expect("known team"), year)
}

fn test_config() -> Config {
    Config {
        base_url: BASE.to_string(),
        fetch_parallelism: 4,
        ..Config::default()
    }
}

#[test]
fn timeouts_restart_the_season_until_success() {
    let season = key("lions", 2021);
    let urls = SeasonUrls::new(BASE, season);
    let source = ScriptedSource::new().time_out(&urls.overview, 3);

    let fetched = fetch_season(&source, BASE, season, &RetryPolicy::unbounded())
        .expect("eventually succeeds");
    assert_eq!(fetched.retries, 3);
    // Every restart refetches both documents.
    assert_eq!(source.calls(&urls.overview), 4);
    assert_eq!(source.calls(&urls.advanced), 4);
    assert!(fetched.documents.advanced.contains("advanced_air_yards"));
    assert!(fetched.documents.overview.contains("team_stats"));
}

#[test]
fn success_on_first_try_has_no_retries() {
    let season = key("lions", 2021);
    let source = ScriptedSource::new();
    let fetched =
        fetch_season(&source, BASE, season, &RetryPolicy::unbounded()).expect("succeeds");
    assert_eq!(fetched.retries, 0);
}

#[test]
fn other_failures_are_not_retried() {
    let season = key("jets", 2021);
    let urls = SeasonUrls::new(BASE, season);
    let source = ScriptedSource::new().fail_with(&urls.advanced, 500);

    let err = fetch_season(&source, BASE, season, &RetryPolicy::unbounded())
        .expect_err("status error propagates");
    assert!(matches!(err, FetchError::Status { status: 500, .. }));
    assert_eq!(source.calls(&urls.advanced), 1);
    assert_eq!(source.calls(&urls.overview), 0);
}

#[test]
fn capped_policy_gives_up() {
    let season = key("jets", 2021);
    let urls = SeasonUrls::new(BASE, season);
    let source = ScriptedSource::new().time_out(&urls.advanced, 10);

    let err = fetch_season(&source, BASE, season, &RetryPolicy::capped(3))
        .expect_err("cap reached");
    assert!(matches!(err, FetchError::RetriesExhausted { attempts: 3 }));
    assert_eq!(source.calls(&urls.advanced), 3);
}

#[test]
fn acquisition_writes_every_team_and_survives_retries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let season = key("lions", 2021);
    let urls = SeasonUrls::new(BASE, season);
    let lions_record = record_path(dir.path(), season);
    let source = ScriptedSource::new()
        .time_out(&urls.overview, 2)
        .watch_record(&urls.overview, &lions_record);

    let summary = acquire_season(&test_config(), &source, dir.path(), 2021).expect("acquire");
    assert_eq!(summary.teams_total, 32);
    assert_eq!(summary.teams_succeeded, 32);
    assert_eq!(summary.retries, 2);
    assert!(summary.errors.is_empty());
    assert!(!source.saw_record_early.load(Ordering::SeqCst));
    assert!(lions_record.exists());

    let loaded = load_all(dir.path()).expect("reload");
    assert_eq!(loaded.records.len(), 32);
    assert!(loaded.skipped.is_empty());
    let lions = loaded.records.get(&season).expect("lions record");
    assert_eq!(
        lions.get("week_1_opponent").and_then(|v| v.as_text()),
        Some("sfo")
    );
}

#[test]
fn one_failing_team_does_not_block_the_rest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = key("texans", 2021);
    let urls = SeasonUrls::new(BASE, broken);
    let source = ScriptedSource::new().fail_with(&urls.overview, 404);

    let summary = acquire_season(&test_config(), &source, dir.path(), 2021).expect("acquire");
    assert_eq!(summary.teams_succeeded, 31);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("texans 2021"));
    assert!(!record_path(dir.path(), broken).exists());

    let summary_path = write_summary(&summary).expect("summary written");
    assert!(summary_path.ends_with("ingest_2021.json"));
    let loaded = load_all(dir.path()).expect("reload");
    assert_eq!(loaded.records.len(), 31);
}
