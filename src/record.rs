use std::fmt;

use indexmap::IndexMap;

const WEEK_PREFIX: &str = "week_";
const WON_SUFFIX: &str = "_won";
const OPPONENT_SUFFIX: &str = "_opponent";

#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl StatValue {
    /// Infer the value type from its stored text: integer, then float, then text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return StatValue::Int(n);
        }
        let numeric_start = raw
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.' || c == '+');
        if numeric_start && let Ok(f) = raw.parse::<f64>() {
            return StatValue::Float(f);
        }
        StatValue::Text(raw.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StatValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(n) => write!(f, "{n}"),
            // Debug keeps a trailing ".0" on whole floats so they reload as floats.
            StatValue::Float(x) => write!(f, "{x:?}"),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for StatValue {
    fn from(value: i64) -> Self {
        StatValue::Int(value)
    }
}

impl From<i32> for StatValue {
    fn from(value: i32) -> Self {
        StatValue::Int(i64::from(value))
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Float(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Text(value.to_string())
    }
}

/// How a record field participates in synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind<'a> {
    /// Season aggregate, carried into feature rows.
    Stat,
    WeekWon(&'a str),
    WeekOpponent(&'a str),
    /// Any other `week_` field; treated as schedule data and never a feature.
    WeekOther,
}

pub fn classify_field(name: &str) -> FieldKind<'_> {
    let Some(rest) = name.strip_prefix(WEEK_PREFIX) else {
        return FieldKind::Stat;
    };
    if let Some(week) = rest.strip_suffix(WON_SUFFIX)
        && !week.is_empty()
    {
        return FieldKind::WeekWon(week);
    }
    if let Some(week) = rest.strip_suffix(OPPONENT_SUFFIX)
        && !week.is_empty()
    {
        return FieldKind::WeekOpponent(week);
    }
    FieldKind::WeekOther
}

pub fn week_won_field(week: &str) -> String {
    format!("{WEEK_PREFIX}{week}{WON_SUFFIX}")
}

pub fn week_opponent_field(week: &str) -> String {
    format!("{WEEK_PREFIX}{week}{OPPONENT_SUFFIX}")
}

/// Season stats for one team. Field order is insertion order and is the column
/// order used on disk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatRecord {
    fields: IndexMap<String, StatValue>,
}

impl StatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwrite keeps the field's original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StatValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Append every field of `other`; later values win on a name clash.
    pub fn merge(&mut self, other: StatRecord) {
        for (name, value) in other.fields {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&StatValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Season aggregates only, in record order.
    pub fn stat_fields(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.iter()
            .filter(|(name, _)| classify_field(name) == FieldKind::Stat)
    }

    /// Weeks that recorded an opponent, in the order the opponent fields appear.
    pub fn opponent_weeks(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.iter().filter_map(|(name, value)| match classify_field(name) {
            FieldKind::WeekOpponent(week) => Some((week, value)),
            _ => None,
        })
    }

    pub fn week_won(&self, week: &str) -> Option<&StatValue> {
        self.get(&week_won_field(week))
    }
}

impl FromIterator<(String, StatValue)> for StatRecord {
    fn from_iter<T: IntoIterator<Item = (String, StatValue)>>(iter: T) -> Self {
        let mut record = StatRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldKind, StatRecord, StatValue, classify_field};

    #[test]
    fn values_round_trip_through_text() {
        for value in [
            StatValue::Int(7),
            StatValue::Int(-3),
            StatValue::Float(1.0),
            StatValue::Float(0.5),
            StatValue::Float(230.0 / 30.0),
            StatValue::Text("sfo".to_string()),
        ] {
            assert_eq!(StatValue::parse(&value.to_string()), value);
        }
    }

    #[test]
    fn codes_parse_as_text() {
        assert_eq!(StatValue::parse("nan"), StatValue::Text("nan".to_string()));
        assert_eq!(StatValue::parse("inf"), StatValue::Text("inf".to_string()));
    }

    #[test]
    fn classifies_week_fields() {
        assert_eq!(classify_field("yards_per_carry"), FieldKind::Stat);
        assert_eq!(classify_field("week_3_won"), FieldKind::WeekWon("3"));
        assert_eq!(
            classify_field("week_WildCard_opponent"),
            FieldKind::WeekOpponent("WildCard")
        );
        assert_eq!(classify_field("week_notes"), FieldKind::WeekOther);
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut record = StatRecord::new();
        record.insert("a", 1);
        record.insert("b", 2);
        record.insert("a", 3);
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&StatValue::Int(3)));
    }

    #[test]
    fn stat_fields_exclude_schedule() {
        let mut record = StatRecord::new();
        record.insert("offense_rank", 4);
        record.insert("week_1_won", 1);
        record.insert("week_1_opponent", "sfo");
        record.insert("yards_per_pass", 7.1);
        let names = record.stat_fields().map(|(n, _)| n).collect::<Vec<_>>();
        assert_eq!(names, vec!["offense_rank", "yards_per_pass"]);
        let weeks = record.opponent_weeks().map(|(w, _)| w).collect::<Vec<_>>();
        assert_eq!(weeks, vec!["1"]);
    }
}
