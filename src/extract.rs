//! Season stat extraction from a team's overview and advanced pages.
//!
//! Every lookup is positional. The overview aggregates are described by a
//! declarative cell schema; the schedule and the advanced tables use fixed
//! column constants. Any layout drift surfaces as an `ExtractError`.

use scraper::Html;

use crate::errors::ExtractError;
use crate::html_table::{CellScope, TableGrid, unwrap_fragment};
use crate::record::{StatRecord, StatValue, week_opponent_field, week_won_field};
use crate::teams::TeamCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Int,
    Float,
}

/// One directly copied cell: row and column inside a table grid.
#[derive(Debug, Clone, Copy)]
pub struct CellSpec {
    pub row: usize,
    pub col: usize,
    pub kind: CellKind,
    pub field: &'static str,
}

/// A field derived as numerator cell / denominator cell.
#[derive(Debug, Clone, Copy)]
pub struct RatioSpec {
    pub field: &'static str,
    pub numerator: (usize, usize),
    pub denominator: (usize, usize),
}

const TEAM_STATS_TABLE: &str = "team_stats";
// Rows of #team_stats (header rows included): 2 team, 3 opponents, 4/5 league ranks.
pub const OVERALL_SCHEMA: &[CellSpec] = &[
    CellSpec {
        row: 3,
        col: 17,
        kind: CellKind::Float,
        field: "allowed_yards_per_carry",
    },
    CellSpec {
        row: 4,
        col: 0,
        kind: CellKind::Int,
        field: "offense_rank",
    },
    CellSpec {
        row: 5,
        col: 0,
        kind: CellKind::Int,
        field: "defense_rank",
    },
];

pub const EXTENDED_OVERALL_RATIOS: &[RatioSpec] = &[
    RatioSpec {
        field: "turnovers_given_per_play",
        numerator: (2, 4),
        denominator: (2, 0),
    },
    RatioSpec {
        field: "turnovers_taken_per_play",
        numerator: (3, 4),
        denominator: (3, 0),
    },
    RatioSpec {
        field: "penalties_per_play",
        numerator: (2, 19),
        denominator: (2, 0),
    },
];

pub const EXTENDED_OVERALL_SCHEMA: &[CellSpec] = &[
    CellSpec {
        row: 2,
        col: 29,
        kind: CellKind::Float,
        field: "pts_per_drive",
    },
    CellSpec {
        row: 3,
        col: 29,
        kind: CellKind::Float,
        field: "allowed_pts_per_drive",
    },
];

const GAMES_TABLE: &str = "games";
const GAMES_HEADER_ROWS: usize = 2;
const GAME_WEEK_COL: usize = 0;
const GAME_OUTCOME_COL: usize = 5;
const GAME_OPPONENT_COL: usize = 9;
const WIN_SYMBOL: &str = "W";
const TEAMS_PATH_SEGMENT: &str = "teams";

const AIR_YARDS_TABLE: &str = "advanced_air_yards";
const AIR_YARDS_HEADER_ROWS: usize = 2;
const AIR_CMP_COL: usize = 5;
const AIR_ATT_COL: usize = 6;
const AIR_YDS_COL: usize = 7;

const RUSHING_CONTAINER: &str = "all_advanced_rushing";
const RUSH_ATT_COL: usize = 5;
const RUSH_YDS_COL: usize = 6;

const DEFENSE_CONTAINER: &str = "all_advanced_defense";
const DEF_INT_COL: usize = 5;
const DEF_ATT_COL: usize = 6;
const DEF_CMP_COL: usize = 7;
const DEF_SACKS_COL: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Append the extended overall group (turnover, penalty and scoring rates).
    pub extended_overall: bool,
}

/// Parse both documents and merge the groups in canonical order:
/// overall, passing, rushing, defensive, then the weekly schedule fields.
pub fn extract_season(
    overview_html: &str,
    advanced_html: &str,
    options: ExtractOptions,
) -> Result<StatRecord, ExtractError> {
    let overview = Html::parse_document(overview_html);
    let advanced = Html::parse_document(advanced_html);

    let mut record = extract_overall(&overview, options)?;
    record.merge(extract_passing(&advanced)?);
    record.merge(extract_rushing(&advanced)?);
    record.merge(extract_defensive(&advanced)?);
    record.merge(extract_record(&overview)?);
    Ok(record)
}

pub fn extract_overall(doc: &Html, options: ExtractOptions) -> Result<StatRecord, ExtractError> {
    let grid = TableGrid::by_id(doc, TEAM_STATS_TABLE, CellScope::Data)?;
    let mut record = read_cells(&grid, OVERALL_SCHEMA)?;
    if options.extended_overall {
        for spec in EXTENDED_OVERALL_RATIOS {
            let numerator = grid.float(spec.numerator.0, spec.numerator.1)?;
            let denominator = grid.float(spec.denominator.0, spec.denominator.1)?;
            record.insert(spec.field, ratio(spec.field, numerator, denominator)?);
        }
        record.merge(read_cells(&grid, EXTENDED_OVERALL_SCHEMA)?);
    }
    Ok(record)
}

/// Weekly outcomes from the schedule table.
///
/// Rows with an empty outcome (byes, unplayed games) are skipped. The opponent
/// code is taken from the opponent cell's link; when it cannot be resolved only
/// the outcome is kept for that week.
pub fn extract_record(doc: &Html) -> Result<StatRecord, ExtractError> {
    let grid = TableGrid::by_id(doc, GAMES_TABLE, CellScope::All)?;
    let mut record = StatRecord::new();
    for (row, _) in grid.rows_from(GAMES_HEADER_ROWS) {
        let week = grid.text(row, GAME_WEEK_COL)?;
        let outcome = grid.text(row, GAME_OUTCOME_COL)?;
        if outcome.is_empty() {
            continue;
        }
        let won = if outcome == WIN_SYMBOL { 1 } else { 0 };
        record.insert(week_won_field(week), won);

        let opponent = grid
            .cell(row, GAME_OPPONENT_COL)
            .ok()
            .and_then(|cell| cell.href.as_deref())
            .and_then(opponent_code_from_href);
        if let Some(code) = opponent {
            record.insert(week_opponent_field(week), code.as_str());
        }
    }
    Ok(record)
}

/// `/teams/<code>/<year>.htm` -> `<code>`, for codes in the registry only.
fn opponent_code_from_href(href: &str) -> Option<TeamCode> {
    let mut segments = href.trim().split('/');
    if !segments.next()?.is_empty() || segments.next()? != TEAMS_PATH_SEGMENT {
        return None;
    }
    TeamCode::from_code(segments.next()?)
}

/// Completion rate and yards per attempt over season sums of the per-game rows.
pub fn extract_passing(doc: &Html) -> Result<StatRecord, ExtractError> {
    let grid = TableGrid::by_id(doc, AIR_YARDS_TABLE, CellScope::Data)?;
    let mut completions = 0i64;
    let mut attempts = 0i64;
    let mut yards = 0i64;
    for (row, _) in grid.rows_from(AIR_YARDS_HEADER_ROWS) {
        completions += grid.int(row, AIR_CMP_COL)?;
        attempts += grid.int(row, AIR_ATT_COL)?;
        yards += grid.int(row, AIR_YDS_COL)?;
    }

    let mut record = StatRecord::new();
    record.insert(
        "completion_percent",
        ratio("completion_percent", completions as f64, attempts as f64)?,
    );
    record.insert(
        "yards_per_pass",
        ratio("yards_per_pass", yards as f64, attempts as f64)?,
    );
    Ok(record)
}

/// Yards per carry from the season-total footer of the hidden rushing table.
pub fn extract_rushing(doc: &Html) -> Result<StatRecord, ExtractError> {
    let totals = hidden_footer(doc, RUSHING_CONTAINER)?;
    let attempts = totals.int(0, RUSH_ATT_COL)?;
    let yards = totals.int(0, RUSH_YDS_COL)?;

    let mut record = StatRecord::new();
    record.insert(
        "yards_per_carry",
        ratio("yards_per_carry", yards as f64, attempts as f64)?,
    );
    Ok(record)
}

/// Rates over opponent pass attempts from the hidden defense table footer.
pub fn extract_defensive(doc: &Html) -> Result<StatRecord, ExtractError> {
    let totals = hidden_footer(doc, DEFENSE_CONTAINER)?;
    let interceptions = totals.int(0, DEF_INT_COL)? as f64;
    let attempts = totals.int(0, DEF_ATT_COL)? as f64;
    let completions = totals.int(0, DEF_CMP_COL)? as f64;
    let sacks = totals.float(0, DEF_SACKS_COL)?;

    let mut record = StatRecord::new();
    record.insert(
        "taken_ints_per_pass",
        ratio("taken_ints_per_pass", interceptions, attempts)?,
    );
    record.insert(
        "allowed_completion_percent",
        ratio("allowed_completion_percent", completions, attempts)?,
    );
    record.insert(
        "inflicted_sacks_per_pass",
        ratio("inflicted_sacks_per_pass", sacks, attempts)?,
    );
    Ok(record)
}

fn hidden_footer(doc: &Html, container_id: &str) -> Result<TableGrid, ExtractError> {
    let fragment = unwrap_fragment(doc, container_id)?;
    TableGrid::footer(&fragment, container_id, CellScope::Data)
}

fn read_cells(grid: &TableGrid, schema: &[CellSpec]) -> Result<StatRecord, ExtractError> {
    let mut record = StatRecord::new();
    for spec in schema {
        let value = match spec.kind {
            CellKind::Int => StatValue::Int(grid.int(spec.row, spec.col)?),
            CellKind::Float => StatValue::Float(grid.float(spec.row, spec.col)?),
        };
        record.insert(spec.field, value);
    }
    Ok(record)
}

fn ratio(field: &'static str, numerator: f64, denominator: f64) -> Result<f64, ExtractError> {
    if denominator == 0.0 {
        return Err(ExtractError::ZeroDenominator { field });
    }
    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::opponent_code_from_href;
    use crate::teams::TeamCode;

    #[test]
    fn opponent_code_comes_from_team_links() {
        assert_eq!(
            opponent_code_from_href("/teams/sfo/2021.htm"),
            TeamCode::from_code("sfo")
        );
        assert_eq!(opponent_code_from_href("/boxscores/"), None);
        assert_eq!(opponent_code_from_href("/boxscores/202109120crd.htm"), None);
        assert_eq!(opponent_code_from_href("/players/1234"), None);
        assert_eq!(opponent_code_from_href("/teams/stl/1994.htm"), None);
        assert_eq!(opponent_code_from_href("sfo"), None);
    }
}
