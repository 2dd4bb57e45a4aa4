use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use indexmap::IndexMap;
use log::warn;

use crate::errors::StoreError;
use crate::record::{StatRecord, StatValue};
use crate::teams::{SeasonKey, TeamCode};

const RECORD_EXTENSION: &str = "csv";

/// Write `record` to `path`, replacing any existing file. The write goes through a
/// temporary sibling so an interrupted save never leaves a partial record.
pub fn save(path: &Path, record: &StatRecord) -> Result<(), StoreError> {
    if record.is_empty() {
        return Err(malformed(path, "refusing to save an empty record"));
    }
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }

    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_path(&tmp)?;
        writer.write_record(record.names())?;
        writer.write_record(record.iter().map(|(_, value)| value.to_string()))?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load(path: &Path) -> Result<StatRecord, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = reader.records();
    let values = match rows.next() {
        Some(row) => row?,
        None => return Err(malformed(path, "missing value line")),
    };
    if rows.next().is_some() {
        return Err(malformed(path, "more than one value line"));
    }
    if values.len() != headers.len() {
        return Err(malformed(
            path,
            &format!("{} names but {} values", headers.len(), values.len()),
        ));
    }

    Ok(headers
        .iter()
        .zip(values.iter())
        .map(|(name, raw)| (name.to_string(), StatValue::parse(raw)))
        .collect())
}

#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: IndexMap<SeasonKey, StatRecord>,
    /// Files skipped because their name is not `<team>_<year>.csv` for a known team.
    pub skipped: Vec<PathBuf>,
    /// Correctly named files whose contents failed to load.
    pub unreadable: Vec<PathBuf>,
}

/// Load every `*.csv` record in `dir`, in file name order. Files that cannot be
/// read are reported and skipped; only a failure to list `dir` is an error.
pub fn load_all(dir: &Path) -> Result<LoadedRecords, StoreError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_record = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == RECORD_EXTENSION);
        if is_record {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loaded = LoadedRecords::default();
    for path in paths {
        let key = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_file_name);
        let Some(key) = key else {
            warn!(
                "Bad team filename: {}. Should be in format \"[team name]_[year].csv\".",
                path.display()
            );
            loaded.skipped.push(path);
            continue;
        };
        match load(&path) {
            Ok(record) => {
                loaded.records.insert(key, record);
            }
            Err(err) => {
                warn!("Unreadable team file {}: {err}. Skipping.", path.display());
                loaded.unreadable.push(path);
            }
        }
    }
    Ok(loaded)
}

/// `<team name>_<year>.csv` -> season key, for names in the registry.
pub fn parse_file_name(file_name: &str) -> Option<SeasonKey> {
    let stem = file_name.strip_suffix(".csv")?;
    let (name, year) = stem.rsplit_once('_')?;
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = year.parse::<u16>().ok()?;
    let team = TeamCode::from_name(name)?;
    Some(SeasonKey::new(team, year))
}

pub fn record_path(dir: &Path, key: SeasonKey) -> PathBuf {
    dir.join(key.file_name())
}

fn malformed(path: &Path, reason: &str) -> StoreError {
    StoreError::Malformed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_file_name;
    use crate::teams::TeamCode;

    #[test]
    fn parses_conventional_names() {
        let key = parse_file_name("49ers_2021.csv").expect("valid name");
        assert_eq!(key.team, TeamCode::from_code("sfo").expect("known"));
        assert_eq!(key.year, 2021);
    }

    #[test]
    fn rejects_unconventional_names() {
        assert_eq!(parse_file_name("49ers.csv"), None);
        assert_eq!(parse_file_name("49ers_20x1.csv"), None);
        assert_eq!(parse_file_name("oilers_1990.csv"), None);
        assert_eq!(parse_file_name("bears_2021.txt"), None);
        assert_eq!(parse_file_name("bears_.csv"), None);
    }
}
