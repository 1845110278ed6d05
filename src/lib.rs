//! Matchday: football match notifications for a Discord channel.
//!
//! Watches a configurable set of competitions through the api-sports
//! fixture API and posts goal, red-card and full-time updates to one
//! Discord channel. A daily scheduler anchored to a civil timezone
//! fetches the day's fixtures, sleeps until the first kickoff and then
//! polls live matches until local midnight.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod scheduler;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::AppConfig;
pub use error::{MatchdayError, Result};

pub use adapters::{ChannelSink, DiscordChannel, FixtureSource, FootballApi};
pub use domain::{Fixture, MatchStatus, Score};
pub use scheduler::{Clock, Daemon};
