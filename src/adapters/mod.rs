//! External collaborators: the fixture data source and the Discord channel.

pub mod discord;
pub mod football_api;

pub use discord::{ChannelMessage, ChannelSink, DiscordChannel, MessageId};
pub use football_api::{FixtureSource, FootballApi};
