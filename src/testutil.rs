//! In-memory fakes for the external collaborators, shared across unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::adapters::{ChannelMessage, ChannelSink, MessageId};
use crate::adapters::football_api::FixtureSource;
use crate::domain::Fixture;
use crate::error::{MatchdayError, Result};

/// Fake notification sink backed by a message list.
#[derive(Default)]
pub struct FakeSink {
    messages: Mutex<Vec<ChannelMessage>>,
    next_id: AtomicU64,
    foreign_after: AtomicUsize,
    send_failures: AtomicBool,
    edit_failures: AtomicBool,
}

impl FakeSink {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Pretend `n` messages by other authors arrived after any message.
    pub fn set_foreign_after(&self, n: usize) {
        self.foreign_after.store(n, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.send_failures.store(fail, Ordering::SeqCst);
    }

    pub fn fail_edits(&self, fail: bool) {
        self.edit_failures.store(fail, Ordering::SeqCst);
    }

    /// Remove a message, as if deleted by a moderator.
    pub fn delete(&self, id: MessageId) {
        self.messages.lock().unwrap().retain(|m| m.id != id);
    }

    /// Number of messages ever sent (edits not counted).
    pub fn sent_count(&self) -> usize {
        self.next_id.load(Ordering::SeqCst) as usize - 1
    }

    pub fn content_of(&self, id: MessageId) -> Option<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.content.clone())
    }

    /// Contents of all live messages, oldest first.
    pub fn contents(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.content.clone())
            .collect()
    }
}

#[async_trait]
impl ChannelSink for FakeSink {
    async fn send(&self, content: &str) -> Result<ChannelMessage> {
        if self.send_failures.load(Ordering::SeqCst) {
            return Err(MatchdayError::Channel("send failed".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = ChannelMessage {
            id,
            content: content.to_string(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn edit(&self, id: MessageId, content: &str) -> Result<ChannelMessage> {
        if self.edit_failures.load(Ordering::SeqCst) {
            return Err(MatchdayError::Channel("edit failed".to_string()));
        }
        let mut messages = self.messages.lock().unwrap();
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(MatchdayError::MessageNotFound(id))?;
        message.content = content.to_string();
        Ok(message.clone())
    }

    async fn fetch(&self, id: MessageId) -> Result<ChannelMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(MatchdayError::MessageNotFound(id))
    }

    async fn count_after(&self, _id: MessageId, limit: usize) -> Result<usize> {
        Ok(self.foreign_after.load(Ordering::SeqCst).min(limit))
    }
}

/// Fake fixture source fed by tests.
#[derive(Default)]
pub struct FakeSource {
    day_fixtures: Mutex<Vec<Fixture>>,
    live: Mutex<Vec<Fixture>>,
    by_id: Mutex<HashMap<u64, Fixture>>,
    fail_day: AtomicBool,
    fail_live: AtomicBool,
    fail_by_id: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_day_fixtures(&self, fixtures: Vec<Fixture>) {
        *self.day_fixtures.lock().unwrap() = fixtures;
    }

    pub fn set_live(&self, fixtures: Vec<Fixture>) {
        *self.live.lock().unwrap() = fixtures;
    }

    pub fn set_fixture(&self, fixture: Fixture) {
        self.by_id.lock().unwrap().insert(fixture.id, fixture);
    }

    pub fn fail_day(&self, fail: bool) {
        self.fail_day.store(fail, Ordering::SeqCst);
    }

    pub fn fail_live(&self, fail: bool) {
        self.fail_live.store(fail, Ordering::SeqCst);
    }

    pub fn fail_by_id(&self, fail: bool) {
        self.fail_by_id.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FixtureSource for FakeSource {
    async fn fixtures_for_date(&self, _date: &str) -> Result<Vec<Fixture>> {
        if self.fail_day.load(Ordering::SeqCst) {
            return Err(MatchdayError::Api("day fetch failed".to_string()));
        }
        Ok(self.day_fixtures.lock().unwrap().clone())
    }

    async fn live_fixtures(&self) -> Result<Vec<Fixture>> {
        if self.fail_live.load(Ordering::SeqCst) {
            return Err(MatchdayError::Api("live fetch failed".to_string()));
        }
        Ok(self.live.lock().unwrap().clone())
    }

    async fn fixture_by_id(&self, id: u64) -> Result<Option<Fixture>> {
        if self.fail_by_id.load(Ordering::SeqCst) {
            return Err(MatchdayError::Api("fixture fetch failed".to_string()));
        }
        Ok(self.by_id.lock().unwrap().get(&id).cloned())
    }

    async fn next_fixture_for_team(
        &self,
        _team_id: u32,
        _season: Option<i32>,
    ) -> Result<Option<Fixture>> {
        Ok(None)
    }
}

/// Convenience fixture builder for tests.
pub fn fixture(id: u64, home: &str, away: &str) -> Fixture {
    use crate::domain::{MatchStatus, Score};
    Fixture {
        id,
        league_id: 135,
        kickoff_utc: chrono::Utc::now(),
        home: home.to_string(),
        away: away.to_string(),
        status: MatchStatus::FirstHalf,
        score: Score::new(0, 0),
        events: Vec::new(),
    }
}
