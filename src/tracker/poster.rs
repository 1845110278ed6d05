//! Upsert posting policy: edit the controlled message or send a new one.
//!
//! Live updates are consolidated into one visible message while the channel
//! stays quiet. Once enough foreign conversation has pushed the controlled
//! message out of easy visibility, a fresh message is posted instead so the
//! update is not lost to scroll-back.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::adapters::{ChannelMessage, ChannelSink, MessageId};
use crate::config::PostingConfig;

/// Single-slot edit-or-send poster for one channel.
pub struct UpsertPoster {
    sink: Arc<dyn ChannelSink>,
    edit_threshold: usize,
    history_lookback: usize,
    last_message: Option<MessageId>,
}

impl UpsertPoster {
    pub fn new(sink: Arc<dyn ChannelSink>, posting: &PostingConfig) -> Self {
        // Lookback below the threshold would undercount intervening messages
        // and keep editing a message nobody can see anymore.
        let history_lookback = posting.history_lookback.max(posting.edit_threshold);
        Self {
            sink,
            edit_threshold: posting.edit_threshold,
            history_lookback,
            last_message: None,
        }
    }

    /// Edit the controlled message when the channel is quiet, otherwise send
    /// a new one. Transport failures degrade (edit failure falls back to a
    /// new message, send failure returns `None`) and never propagate.
    pub async fn upsert(&mut self, content: &str) -> Option<ChannelMessage> {
        if content.trim().is_empty() {
            warn!("upsert called with empty content, nothing to post");
            return None;
        }

        if let Some(id) = self.last_message {
            match self.sink.fetch(id).await {
                Ok(_) => {
                    if self.should_edit(id).await {
                        match self.sink.edit(id, content).await {
                            Ok(message) => {
                                debug!("edited controlled message {}", id);
                                return Some(message);
                            }
                            Err(e) => {
                                warn!("edit of message {} failed, sending new: {}", id, e);
                            }
                        }
                    }
                }
                Err(e) if e.is_message_not_found() => {
                    debug!("controlled message {} is gone, discarding id", id);
                    self.last_message = None;
                }
                Err(e) => {
                    warn!("fetch of controlled message {} failed, sending new: {}", id, e);
                }
            }
        }

        self.send_new(content).await
    }

    /// Post a brand-new message and take control of it.
    pub async fn send_new(&mut self, content: &str) -> Option<ChannelMessage> {
        match self.sink.send(content).await {
            Ok(message) => {
                self.last_message = Some(message.id);
                Some(message)
            }
            Err(e) => {
                error!("failed to send message: {}", e);
                None
            }
        }
    }

    async fn should_edit(&self, id: MessageId) -> bool {
        match self.sink.count_after(id, self.history_lookback).await {
            Ok(foreign) if foreign < self.edit_threshold => true,
            Ok(foreign) => {
                debug!(
                    "{} foreign messages since {} (threshold {}), posting new",
                    foreign, id, self.edit_threshold
                );
                false
            }
            Err(e) => {
                warn!("history count after {} failed, posting new: {}", id, e);
                false
            }
        }
    }

    /// Drop the controlled-message reference at the start of a new day.
    pub fn reset_for_new_day(&mut self) {
        self.last_message = None;
    }

    pub fn last_message_id(&self) -> Option<MessageId> {
        self.last_message
    }
}
