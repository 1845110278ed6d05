//! One notification day: fetch the schedule, wait for the first kickoff,
//! then poll live matches until local midnight.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::football_api::FixtureSource;
use crate::adapters::ChannelSink;
use crate::config::{PostingConfig, ScheduleConfig};
use crate::domain::Fixture;
use crate::scheduler::clock::Clock;
use crate::tracker::{FullTimeTracker, LivePoller, UpsertPoster};

/// What the cycle should do before its first live pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickoffPlan {
    /// A match is already underway (or kickoff has passed), poll immediately.
    PollNow,
    /// Nothing started yet, sleep until the earliest kickoff.
    WaitUntil(DateTime<chrono_tz::Tz>),
}

/// Pick the first action of the day from the fetched schedule.
///
/// With no unstarted fixture to wait for, the answer is always an immediate
/// live pass. The day list can lag the live endpoint, so even a list with
/// every entry settled still gets polled until end of day.
pub fn plan_first_kickoff(
    fixtures: &[Fixture],
    now: DateTime<chrono_tz::Tz>,
    clock: &Clock,
) -> KickoffPlan {
    let in_progress = fixtures.iter().any(|f| {
        !f.status.is_unstarted() && !f.status.is_final() && !f.status.is_terminal_non_final()
    });
    if in_progress {
        return KickoffPlan::PollNow;
    }

    let earliest = fixtures
        .iter()
        .filter(|f| f.status.is_unstarted())
        .map(|f| f.kickoff_utc)
        .min();

    match earliest {
        Some(kickoff) => {
            let kickoff_local = clock.to_local(kickoff);
            if kickoff_local <= now {
                KickoffPlan::PollNow
            } else {
                KickoffPlan::WaitUntil(kickoff_local)
            }
        }
        None => KickoffPlan::PollNow,
    }
}

/// Runs the live and full-time loops for a single local day.
pub struct DailyCycle {
    source: Arc<dyn FixtureSource>,
    sink: Arc<dyn ChannelSink>,
    clock: Clock,
    poll_interval: Duration,
    live: LivePoller,
    ft: FullTimeTracker,
    poster: UpsertPoster,
}

impl DailyCycle {
    pub fn new(
        source: Arc<dyn FixtureSource>,
        sink: Arc<dyn ChannelSink>,
        clock: Clock,
        schedule: &ScheduleConfig,
        posting: &PostingConfig,
    ) -> Self {
        Self {
            live: LivePoller::new(source.clone()),
            ft: FullTimeTracker::new(source.clone(), schedule),
            poster: UpsertPoster::new(sink.clone(), posting),
            poll_interval: Duration::from_secs(schedule.poll_interval_secs),
            source,
            sink,
            clock,
        }
    }

    /// Reset per-day state, fetch today's schedule, post results for matches
    /// that finished before we started, and decide what to do next.
    ///
    /// Returns `None` when the day needs no polling (no tracked matches, or
    /// the schedule could not be fetched).
    pub async fn start_of_day(&mut self) -> Option<KickoffPlan> {
        self.live.reset_for_new_day();
        self.ft.reset_for_new_day();
        self.poster.reset_for_new_day();

        let today = self.clock.today_string();
        let fixtures = match self.source.fixtures_for_date(&today).await {
            Ok(fixtures) => fixtures,
            Err(e) => {
                warn!("schedule fetch for {} failed: {}", today, e);
                return None;
            }
        };

        if fixtures.is_empty() {
            info!("no tracked matches on {}", today);
            return None;
        }

        for fixture in &fixtures {
            info!(
                "{}: {} vs {} at {} ({})",
                today,
                fixture.home,
                fixture.away,
                self.clock.to_local(fixture.kickoff_utc).format("%H:%M"),
                fixture.status
            );
        }

        self.ft.post_already_finished(&fixtures, self.sink.as_ref()).await;

        Some(plan_first_kickoff(&fixtures, self.clock.now(), &self.clock))
    }

    /// Run one full day: wait for kickoff, then poll until local midnight.
    pub async fn run_day(&mut self) {
        let plan = match self.start_of_day().await {
            Some(plan) => plan,
            None => return,
        };

        if let KickoffPlan::WaitUntil(kickoff) = plan {
            let wait = (kickoff - self.clock.now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            info!(
                "first kickoff at {}, sleeping {}s",
                kickoff.format("%H:%M"),
                wait.as_secs()
            );
            tokio::time::sleep(wait).await;
        }

        let end_of_day = self.clock.end_of_day(self.clock.now());
        loop {
            self.live.poll_once(&mut self.ft, &mut self.poster).await;
            self.ft.check_due(self.sink.as_ref(), Utc::now()).await;

            if self.clock.now() >= end_of_day {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        info!("daily cycle complete, {} scores posted", self.live.posted_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchStatus, Score};
    use crate::testutil::{fixture, FakeSink, FakeSource};
    use chrono::Duration as ChronoDuration;

    fn cycle(source: &Arc<FakeSource>, sink: &Arc<FakeSink>) -> DailyCycle {
        DailyCycle::new(
            source.clone() as Arc<dyn FixtureSource>,
            sink.clone() as Arc<dyn ChannelSink>,
            Clock::new("Europe/Rome").unwrap(),
            &ScheduleConfig::default(),
            &PostingConfig::default(),
        )
    }

    fn upcoming(id: u64, home: &str, away: &str, in_minutes: i64) -> Fixture {
        let mut f = fixture(id, home, away);
        f.status = MatchStatus::NotStarted;
        f.kickoff_utc = Utc::now() + ChronoDuration::minutes(in_minutes);
        f
    }

    #[test]
    fn test_plan_waits_for_future_kickoff() {
        let clock = Clock::new("Europe/Rome").unwrap();
        let f = upcoming(1, "AC Milan", "Torino", 120);
        let plan = plan_first_kickoff(&[f.clone()], clock.now(), &clock);
        assert_eq!(plan, KickoffPlan::WaitUntil(clock.to_local(f.kickoff_utc)));
    }

    #[test]
    fn test_plan_polls_when_match_in_progress() {
        let clock = Clock::new("Europe/Rome").unwrap();
        let live = fixture(1, "AC Milan", "Torino"); // FirstHalf
        let later = upcoming(2, "Lazio", "Roma", 120);
        let plan = plan_first_kickoff(&[later, live], clock.now(), &clock);
        assert_eq!(plan, KickoffPlan::PollNow);
    }

    #[test]
    fn test_plan_polls_when_kickoff_already_passed() {
        let clock = Clock::new("Europe/Rome").unwrap();
        let f = upcoming(1, "AC Milan", "Torino", -5);
        let plan = plan_first_kickoff(&[f], clock.now(), &clock);
        assert_eq!(plan, KickoffPlan::PollNow);
    }

    #[test]
    fn test_plan_polls_when_everything_settled() {
        let clock = Clock::new("Europe/Rome").unwrap();
        let mut done = fixture(1, "AC Milan", "Torino");
        done.status = MatchStatus::FullTime;
        let mut off = fixture(2, "Lazio", "Roma");
        off.status = MatchStatus::Postponed;
        let plan = plan_first_kickoff(&[done, off], clock.now(), &clock);
        assert_eq!(plan, KickoffPlan::PollNow);
    }

    #[tokio::test]
    async fn test_settled_day_list_still_runs_live_passes() {
        let source = Arc::new(FakeSource::new());
        let sink = Arc::new(FakeSink::new());
        let mut cycle = cycle(&source, &sink);

        // The day list only knows about a postponed match, but the live
        // endpoint has one in progress (rescheduled, or a stale list).
        let mut off = fixture(1, "AC Milan", "Torino");
        off.status = MatchStatus::Postponed;
        source.set_day_fixtures(vec![off]);
        let mut live = fixture(2, "Lazio", "Roma");
        live.score = Score::new(1, 0);
        source.set_live(vec![live]);

        let plan = cycle.start_of_day().await.unwrap();
        assert_eq!(plan, KickoffPlan::PollNow);

        cycle.live.poll_once(&mut cycle.ft, &mut cycle.poster).await;
        assert_eq!(sink.contents(), vec!["Lazio 1 - 0 Roma".to_string()]);
    }

    #[tokio::test]
    async fn test_start_of_day_posts_finished_and_waits_for_upcoming() {
        let source = Arc::new(FakeSource::new());
        let sink = Arc::new(FakeSink::new());
        let mut cycle = cycle(&source, &sink);

        let mut done = fixture(1, "AC Milan", "Torino");
        done.status = MatchStatus::FullTime;
        done.score = Score::new(2, 0);
        let later = upcoming(2, "Lazio", "Roma", 120);
        source.set_day_fixtures(vec![done, later]);

        let plan = cycle.start_of_day().await.unwrap();
        assert!(matches!(plan, KickoffPlan::WaitUntil(_)));
        assert_eq!(sink.contents(), vec!["FT: AC Milan 2 – 0 Torino".to_string()]);
    }

    #[tokio::test]
    async fn test_start_of_day_none_on_empty_schedule() {
        let source = Arc::new(FakeSource::new());
        let sink = Arc::new(FakeSink::new());
        let mut cycle = cycle(&source, &sink);

        assert!(cycle.start_of_day().await.is_none());
        assert_eq!(sink.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_start_of_day_none_on_fetch_failure() {
        let source = Arc::new(FakeSource::new());
        let sink = Arc::new(FakeSink::new());
        let mut cycle = cycle(&source, &sink);
        source.fail_day(true);

        assert!(cycle.start_of_day().await.is_none());
    }

    #[tokio::test]
    async fn test_start_of_day_resets_yesterdays_state() {
        let source = Arc::new(FakeSource::new());
        let sink = Arc::new(FakeSink::new());
        let mut cycle = cycle(&source, &sink);

        // Yesterday: a live match got posted and tracked.
        source.set_live(vec![fixture(1, "AC Milan", "Torino")]);
        cycle.live.poll_once(&mut cycle.ft, &mut cycle.poster).await;
        assert_eq!(cycle.live.posted_count(), 1);
        assert!(cycle.ft.is_tracked(1));

        // New day with the same match still listed: state starts clean.
        source.set_day_fixtures(vec![upcoming(3, "Lazio", "Roma", 60)]);
        cycle.start_of_day().await.unwrap();
        assert_eq!(cycle.live.posted_count(), 0);
        assert!(!cycle.ft.is_tracked(1));
        assert_eq!(cycle.poster.last_message_id(), None);
    }
}
