//! Full-time tracker: posts a result once a tracked match is confirmed
//! final.
//!
//! Every live fixture gets an expected-final time of kickoff plus a fixed
//! offset (default 112 minutes: 90 of play plus stoppage and interruption
//! buffer). Once that passes, the fixture is re-fetched until its status is
//! conclusive.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::adapters::ChannelSink;
use crate::adapters::football_api::FixtureSource;
use crate::config::ScheduleConfig;
use crate::domain::Fixture;
use crate::tracker::format;

/// Tracks matches expected to finish soon. At most one entry per fixture id,
/// keyed to the expected full-time instant.
pub struct FullTimeTracker {
    source: Arc<dyn FixtureSource>,
    ft_offset: Duration,
    entries: HashMap<u64, DateTime<Utc>>,
}

impl FullTimeTracker {
    pub fn new(source: Arc<dyn FixtureSource>, schedule: &ScheduleConfig) -> Self {
        Self {
            source,
            ft_offset: Duration::minutes(schedule.ft_offset_min),
            entries: HashMap::new(),
        }
    }

    /// Register (or refresh) a fixture for full-time checking.
    pub fn track(&mut self, fixture: &Fixture) {
        let expected_ft = fixture.kickoff_utc + self.ft_offset;
        let fresh = self.entries.insert(fixture.id, expected_ft).is_none();
        if fresh {
            info!(
                "tracking {} vs {} for full time (expected around {})",
                fixture.home,
                fixture.away,
                expected_ft.format("%H:%M UTC")
            );
        }
    }

    /// Check every tracked match past its expected-final time.
    ///
    /// Confirmed-final matches get exactly one result post and are dropped
    /// whether or not the post succeeds. Matches that ended in a terminal
    /// non-final state (postponed, abandoned, ...) are dropped silently.
    /// Everything else stays tracked for the next tick.
    pub async fn check_due(&mut self, sink: &dyn ChannelSink, now: DateTime<Utc>) {
        let due: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, expected_ft)| now >= **expected_ft)
            .map(|(id, _)| *id)
            .collect();

        for id in due {
            debug!("full-time check for fixture {}", id);

            let fixture = match self.source.fixture_by_id(id).await {
                Ok(Some(fixture)) => fixture,
                Ok(None) => {
                    warn!("fixture {} returned no payload, will retry", id);
                    continue;
                }
                Err(e) => {
                    warn!("fixture {} re-fetch failed, will retry: {}", id, e);
                    continue;
                }
            };

            if fixture.status.is_terminal_non_final() {
                info!(
                    "fixture {} ended {} without reaching full time, dropping",
                    id, fixture.status
                );
                self.entries.remove(&id);
                continue;
            }

            if !fixture.status.is_final() {
                debug!("fixture {} still {} at expected full time", id, fixture.status);
                continue;
            }

            // Full-time results are permanent records, always a new message.
            let line = format::ft_line(&fixture);
            match sink.send(&line).await {
                Ok(_) => info!("posted full-time result: {}", line),
                Err(e) => error!("failed to post full-time result for {}: {}", id, e),
            }
            // At most one posting attempt per fixture.
            self.entries.remove(&id);
        }
    }

    /// Post results for fixtures already final in the day list, straight from
    /// the list data. Covers matches that finished before this process got a
    /// chance to track them live. Does not touch the tracked set.
    pub async fn post_already_finished(&self, fixtures: &[Fixture], sink: &dyn ChannelSink) {
        for fixture in fixtures.iter().filter(|f| f.status.is_final()) {
            let line = format::ft_line(fixture);
            match sink.send(&line).await {
                Ok(_) => info!("posted initial full-time result: {}", line),
                Err(e) => error!(
                    "failed to post initial full-time result for {}: {}",
                    fixture.id, e
                ),
            }
        }
    }

    /// Drop yesterday's unresolved matches at the start of a new day.
    pub fn reset_for_new_day(&mut self) {
        self.entries.clear();
    }

    pub fn is_tracked(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventKind, MatchEvent, MatchStatus, Score};
    use crate::testutil::{fixture, FakeSink, FakeSource};

    fn setup() -> (Arc<FakeSource>, FakeSink, FullTimeTracker) {
        let source = Arc::new(FakeSource::new());
        let tracker = FullTimeTracker::new(
            source.clone() as Arc<dyn FixtureSource>,
            &ScheduleConfig::default(),
        );
        (source, FakeSink::new(), tracker)
    }

    fn kicked_off_at(f: &mut Fixture, minutes_ago: i64) {
        f.kickoff_utc = Utc::now() - Duration::minutes(minutes_ago);
    }

    #[tokio::test]
    async fn test_check_before_expected_ft_keeps_entry_and_posts_nothing() {
        let (_source, sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 10);
        tracker.track(&f);

        tracker.check_due(&sink, Utc::now()).await;

        assert!(tracker.is_tracked(1));
        assert_eq!(sink.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_due_match_still_live_stays_tracked() {
        let (source, sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 120);
        tracker.track(&f);

        f.status = MatchStatus::SecondHalf;
        source.set_fixture(f);

        tracker.check_due(&sink, Utc::now()).await;
        assert!(tracker.is_tracked(1));
        assert_eq!(sink.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_due_match_at_ft_posts_once_and_drops() {
        let (source, sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 120);
        tracker.track(&f);

        f.status = MatchStatus::FullTime;
        f.score = Score::new(2, 1);
        f.events.push(MatchEvent {
            minute: Some(23),
            kind: EventKind::Goal,
            detail: "Normal Goal".to_string(),
            team: "AC Milan".to_string(),
            player: "Leão".to_string(),
        });
        source.set_fixture(f);

        tracker.check_due(&sink, Utc::now()).await;
        assert!(!tracker.is_tracked(1));
        assert_eq!(
            sink.contents(),
            vec!["FT: AC Milan 2 – 1 Torino (23' - Leão (H))".to_string()]
        );

        // Entry is gone, so a second pass cannot post again.
        tracker.check_due(&sink, Utc::now()).await;
        assert_eq!(sink.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_postponed_match_dropped_without_post() {
        let (source, sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 120);
        tracker.track(&f);

        f.status = MatchStatus::Postponed;
        source.set_fixture(f);

        tracker.check_due(&sink, Utc::now()).await;
        assert!(!tracker.is_tracked(1));
        assert_eq!(sink.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_entry_for_retry() {
        let (source, sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 120);
        tracker.track(&f);

        source.fail_by_id(true);
        tracker.check_due(&sink, Utc::now()).await;
        assert!(tracker.is_tracked(1));

        // No payload either: still tracked.
        source.fail_by_id(false);
        tracker.check_due(&sink, Utc::now()).await;
        assert!(tracker.is_tracked(1));
        assert_eq!(sink.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_entry_dropped_even_when_post_fails() {
        let (source, sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 120);
        tracker.track(&f);

        f.status = MatchStatus::FullTime;
        source.set_fixture(f);
        sink.fail_sends(true);

        tracker.check_due(&sink, Utc::now()).await;
        assert!(!tracker.is_tracked(1));
    }

    #[tokio::test]
    async fn test_track_overwrites_existing_entry() {
        let (_source, _sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 30);
        tracker.track(&f);
        tracker.track(&f);
        assert_eq!(tracker.tracked_count(), 1);
    }

    #[tokio::test]
    async fn test_post_already_finished_only_posts_final_fixtures() {
        let (_source, sink, tracker) = setup();

        let mut done = fixture(1, "AC Milan", "Torino");
        done.status = MatchStatus::FullTime;
        done.score = Score::new(3, 0);
        let mut upcoming = fixture(2, "Lazio", "Roma");
        upcoming.status = MatchStatus::NotStarted;

        tracker
            .post_already_finished(&[done, upcoming], &sink)
            .await;

        assert_eq!(sink.contents(), vec!["FT: AC Milan 3 – 0 Torino".to_string()]);
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_clears_tracked_matches() {
        let (_source, _sink, mut tracker) = setup();
        let mut f = fixture(1, "AC Milan", "Torino");
        kicked_off_at(&mut f, 30);
        tracker.track(&f);

        tracker.reset_for_new_day();
        assert_eq!(tracker.tracked_count(), 0);
    }
}
