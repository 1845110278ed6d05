//! Fixture model: one scheduled or in-progress match between two teams.
//!
//! Fixtures are materialized fresh from every API response and never
//! persisted; ownership stays with the call stack that fetched them.

use chrono::{DateTime, Utc};

/// Match status, mapped from the api-sports short status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStatus {
    NotStarted,
    TimeToBeDefined,
    FirstHalf,
    HalfTime,
    SecondHalf,
    ExtraTime,
    BreakTime,
    PenaltyShootout,
    LiveUnspecified,
    Interrupted,
    Suspended,
    FullTime,
    AfterExtraTime,
    PenaltiesFinished,
    Postponed,
    Cancelled,
    Abandoned,
    Awarded,
    Walkover,
    Other(String),
}

impl MatchStatus {
    /// Parse the api-sports `status.short` code. Unknown codes are preserved
    /// as `Other` so they can still be logged.
    pub fn from_short(code: &str) -> Self {
        match code {
            "NS" => MatchStatus::NotStarted,
            "TBD" => MatchStatus::TimeToBeDefined,
            "1H" => MatchStatus::FirstHalf,
            "HT" => MatchStatus::HalfTime,
            "2H" => MatchStatus::SecondHalf,
            "ET" => MatchStatus::ExtraTime,
            "BT" => MatchStatus::BreakTime,
            "P" => MatchStatus::PenaltyShootout,
            "LIVE" => MatchStatus::LiveUnspecified,
            "INT" => MatchStatus::Interrupted,
            "SUSP" => MatchStatus::Suspended,
            "FT" => MatchStatus::FullTime,
            "AET" => MatchStatus::AfterExtraTime,
            "PEN" => MatchStatus::PenaltiesFinished,
            "PST" => MatchStatus::Postponed,
            "CANC" => MatchStatus::Cancelled,
            "ABD" => MatchStatus::Abandoned,
            "AWD" => MatchStatus::Awarded,
            "WO" => MatchStatus::Walkover,
            other => MatchStatus::Other(other.to_string()),
        }
    }

    /// Match completed normally (full time, possibly after extra time or
    /// penalties). These get an "FT:" result post.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            MatchStatus::FullTime | MatchStatus::AfterExtraTime | MatchStatus::PenaltiesFinished
        )
    }

    /// Match ended permanently without reaching full time (postponed,
    /// cancelled, abandoned, awarded, walkover). Never posts a result.
    pub fn is_terminal_non_final(&self) -> bool {
        matches!(
            self,
            MatchStatus::Postponed
                | MatchStatus::Cancelled
                | MatchStatus::Abandoned
                | MatchStatus::Awarded
                | MatchStatus::Walkover
        )
    }

    /// Match has not kicked off yet (scheduled or time to be defined).
    pub fn is_unstarted(&self) -> bool {
        matches!(self, MatchStatus::NotStarted | MatchStatus::TimeToBeDefined)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            MatchStatus::NotStarted => "NS",
            MatchStatus::TimeToBeDefined => "TBD",
            MatchStatus::FirstHalf => "1H",
            MatchStatus::HalfTime => "HT",
            MatchStatus::SecondHalf => "2H",
            MatchStatus::ExtraTime => "ET",
            MatchStatus::BreakTime => "BT",
            MatchStatus::PenaltyShootout => "P",
            MatchStatus::LiveUnspecified => "LIVE",
            MatchStatus::Interrupted => "INT",
            MatchStatus::Suspended => "SUSP",
            MatchStatus::FullTime => "FT",
            MatchStatus::AfterExtraTime => "AET",
            MatchStatus::PenaltiesFinished => "PEN",
            MatchStatus::Postponed => "PST",
            MatchStatus::Cancelled => "CANC",
            MatchStatus::Abandoned => "ABD",
            MatchStatus::Awarded => "AWD",
            MatchStatus::Walkover => "WO",
            MatchStatus::Other(code) => code,
        };
        write!(f, "{code}")
    }
}

/// Current score. Goals can be unknown early in a match or for unstarted
/// fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self {
            home: Some(home),
            away: Some(away),
        }
    }

    /// Stable key for score-based deduplication, e.g. "1-0" or "?-?".
    pub fn key(&self) -> String {
        format!("{}-{}", display_goals(self.home), display_goals(self.away))
    }
}

pub(crate) fn display_goals(goals: Option<u32>) -> String {
    goals.map_or_else(|| "?".to_string(), |g| g.to_string())
}

/// What kind of match event this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Goal,
    Card,
    Other(String),
}

impl EventKind {
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "Goal" => EventKind::Goal,
            "Card" => EventKind::Card,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// One event belonging to a fixture. Immutable once returned by the data
/// source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    pub minute: Option<i64>,
    pub kind: EventKind,
    pub detail: String,
    pub team: String,
    pub player: String,
}

/// A single match instance as reported by the fixture data source.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub id: u64,
    pub league_id: u32,
    pub kickoff_utc: DateTime<Utc>,
    pub home: String,
    pub away: String,
    pub status: MatchStatus,
    pub score: Score,
    pub events: Vec<MatchEvent>,
}

impl Fixture {
    /// Dedup key for live posting: one post per (fixture, score) pair.
    pub fn score_key(&self) -> (u64, String) {
        (self.id, self.score.key())
    }
}
