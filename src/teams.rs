use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy)]
pub struct TeamInfo {
    /// Lowercase nickname, also used in stored record file names.
    pub name: &'static str,
    /// Path code the stats site uses to address the team's pages.
    pub code: &'static str,
}

const fn team(name: &'static str, code: &'static str) -> TeamInfo {
    TeamInfo { name, code }
}

pub const TEAMS: &[TeamInfo] = &[
    team("cardinals", "crd"),
    team("falcons", "atl"),
    team("ravens", "rav"),
    team("bills", "buf"),
    team("panthers", "car"),
    team("bears", "chi"),
    team("bengals", "cin"),
    team("browns", "cle"),
    team("cowboys", "dal"),
    team("broncos", "den"),
    team("lions", "det"),
    team("packers", "gnb"),
    team("texans", "htx"),
    team("colts", "clt"),
    team("jaguars", "jax"),
    team("chiefs", "kan"),
    team("raiders", "rai"),
    team("chargers", "sdg"),
    team("rams", "ram"),
    team("dolphins", "mia"),
    team("vikings", "min"),
    team("patriots", "nwe"),
    team("saints", "nor"),
    team("giants", "nyg"),
    team("jets", "nyj"),
    team("eagles", "phi"),
    team("steelers", "pit"),
    team("49ers", "sfo"),
    team("seahawks", "sea"),
    team("buccaneers", "tam"),
    team("titans", "oti"),
    team("commanders", "was"),
];

static BY_CODE: Lazy<HashMap<&'static str, TeamCode>> = Lazy::new(|| {
    TEAMS
        .iter()
        .enumerate()
        .map(|(idx, team)| (team.code, TeamCode(idx)))
        .collect()
});

static BY_NAME: Lazy<HashMap<&'static str, TeamCode>> = Lazy::new(|| {
    TEAMS
        .iter()
        .enumerate()
        .map(|(idx, team)| (team.name, TeamCode(idx)))
        .collect()
});

/// A team from the fixed roster. Only obtainable through the registry lookups,
/// so every value refers to a known team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamCode(usize);

impl TeamCode {
    pub fn from_code(code: &str) -> Option<Self> {
        BY_CODE.get(code.trim()).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name.trim()).copied()
    }

    pub fn as_str(self) -> &'static str {
        TEAMS[self.0].code
    }

    pub fn name(self) -> &'static str {
        TEAMS[self.0].name
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn all_teams() -> impl Iterator<Item = TeamCode> {
    (0..TEAMS.len()).map(TeamCode)
}

pub fn team_count() -> usize {
    TEAMS.len()
}

/// One unit of acquisition: a team's documents for a single season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonKey {
    pub team: TeamCode,
    pub year: u16,
}

impl SeasonKey {
    pub fn new(team: TeamCode, year: u16) -> Self {
        Self { team, year }
    }

    pub fn file_name(&self) -> String {
        format!("{self}.csv")
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.team.name(), self.year)
    }
}
