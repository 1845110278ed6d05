//! Domain types: fixtures, scores, match events, competitions.

pub mod fixture;
pub mod leagues;

pub use fixture::{EventKind, Fixture, MatchEvent, MatchStatus, Score};
pub use leagues::{league_name, DEFAULT_TRACKED_LEAGUES};
