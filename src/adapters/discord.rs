//! Discord REST channel adapter.
//!
//! Talks to a single text channel over the Discord HTTP API (v10). The bot's
//! own user id is resolved once at connect time so history counting can
//! distinguish foreign messages from our own.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::DiscordConfig;
use crate::error::{MatchdayError, Result};

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Discord caps channel-history pages at 100 messages per request. Counting
/// policies cannot see further than this in one call.
pub const HISTORY_PAGE_LIMIT: usize = 100;

/// Discord message id (snowflake)
pub type MessageId = u64;

/// A channel message as seen by the posting policy
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: MessageId,
    pub content: String,
}

/// Notification sink: one text channel that can send, edit and list
/// messages.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    /// Post a new message.
    async fn send(&self, content: &str) -> Result<ChannelMessage>;

    /// Edit an existing message in place.
    async fn edit(&self, id: MessageId, content: &str) -> Result<ChannelMessage>;

    /// Retrieve a message by id.
    async fn fetch(&self, id: MessageId) -> Result<ChannelMessage>;

    /// Count messages authored by others that arrived after `id`, looking at
    /// most `limit` messages ahead.
    async fn count_after(&self, id: MessageId, limit: usize) -> Result<usize>;
}

/// Discord REST client bound to one channel
#[derive(Clone)]
pub struct DiscordChannel {
    http: Client,
    token: String,
    channel_id: u64,
    bot_user_id: u64,
}

impl DiscordChannel {
    /// Build the client and resolve the bot's own user id.
    pub async fn connect(config: &DiscordConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("matchday/0.1")
            .build()
            .map_err(|e| {
                MatchdayError::Internal(format!("failed to build Discord HTTP client: {}", e))
            })?;

        let channel = Self {
            http,
            token: config.token.clone(),
            channel_id: config.channel_id,
            bot_user_id: 0,
        };

        let me: DiscordUser = channel
            .request(reqwest::Method::GET, &format!("{}/users/@me", DISCORD_API_BASE), None, None)
            .await?;
        let bot_user_id = parse_snowflake(&me.id)?;
        debug!("connected to Discord as user {}", bot_user_id);

        Ok(Self {
            bot_user_id,
            ..channel
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", DISCORD_API_BASE, self.channel_id)
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&MessagePayload>,
        not_found_id: Option<MessageId>,
    ) -> Result<T> {
        let mut req = self
            .http
            .request(method, url)
            .header("Authorization", format!("Bot {}", self.token));
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.as_u16() == 404 {
            return Err(MatchdayError::MessageNotFound(not_found_id.unwrap_or(0)));
        }
        if status.as_u16() == 403 {
            return Err(MatchdayError::Channel(format!(
                "missing permissions for channel {} (HTTP 403)",
                self.channel_id
            )));
        }
        if status.as_u16() == 429 {
            return Err(MatchdayError::RateLimited(format!(
                "Discord rate limited for {}",
                url
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MatchdayError::Channel(format!(
                "HTTP {} for {}: {}",
                status,
                url,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl ChannelSink for DiscordChannel {
    async fn send(&self, content: &str) -> Result<ChannelMessage> {
        let payload = MessagePayload {
            content: content.to_string(),
        };
        let msg: DiscordMessage = self
            .request(reqwest::Method::POST, &self.messages_url(), Some(&payload), None)
            .await?;
        msg.into_channel_message()
    }

    async fn edit(&self, id: MessageId, content: &str) -> Result<ChannelMessage> {
        let payload = MessagePayload {
            content: content.to_string(),
        };
        let url = format!("{}/{}", self.messages_url(), id);
        let msg: DiscordMessage = self
            .request(reqwest::Method::PATCH, &url, Some(&payload), Some(id))
            .await?;
        msg.into_channel_message()
    }

    async fn fetch(&self, id: MessageId) -> Result<ChannelMessage> {
        let url = format!("{}/{}", self.messages_url(), id);
        let msg: DiscordMessage = self
            .request(reqwest::Method::GET, &url, None, Some(id))
            .await?;
        msg.into_channel_message()
    }

    async fn count_after(&self, id: MessageId, limit: usize) -> Result<usize> {
        let page = limit.clamp(1, HISTORY_PAGE_LIMIT);
        let url = format!("{}?after={}&limit={}", self.messages_url(), id, page);
        let messages: Vec<DiscordMessage> = self
            .request(reqwest::Method::GET, &url, None, Some(id))
            .await?;

        let mut foreign = 0usize;
        for msg in &messages {
            match parse_snowflake(&msg.author.id) {
                Ok(author_id) if author_id != self.bot_user_id => foreign += 1,
                Ok(_) => {}
                Err(e) => error!("unparseable author id in channel history: {}", e),
            }
        }
        Ok(foreign)
    }
}

fn parse_snowflake(raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| MatchdayError::Channel(format!("invalid snowflake: {}", raw)))
}

// ====================================================================
// Wire types (Discord HTTP API v10)
// ====================================================================

#[derive(Debug, Serialize)]
struct MessagePayload {
    content: String,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: String,
    #[serde(default)]
    content: String,
    author: DiscordUser,
}

impl DiscordMessage {
    fn into_channel_message(self) -> Result<ChannelMessage> {
        Ok(ChannelMessage {
            id: parse_snowflake(&self.id)?,
            content: self.content,
        })
    }
}
