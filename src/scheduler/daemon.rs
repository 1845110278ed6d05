//! Long-running scheduler: fires one [`DailyCycle`] per local day.
//!
//! A new trigger replaces the running cycle. The old task is aborted and
//! awaited before the next one spawns, so two cycles never poll at once.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::football_api::FixtureSource;
use crate::adapters::ChannelSink;
use crate::config::AppConfig;
use crate::error::{MatchdayError, Result};
use crate::scheduler::clock::Clock;
use crate::scheduler::day::DailyCycle;

pub struct Daemon {
    cycle: Arc<Mutex<DailyCycle>>,
    sink: Arc<dyn ChannelSink>,
    clock: Clock,
    trigger: chrono::NaiveTime,
    run_on_startup: bool,
    current: Option<JoinHandle<()>>,
    last_cycle_date: Option<chrono::NaiveDate>,
}

impl Daemon {
    pub fn new(
        source: Arc<dyn FixtureSource>,
        sink: Arc<dyn ChannelSink>,
        config: &AppConfig,
    ) -> Result<Self> {
        let clock = Clock::new(&config.schedule.timezone)?;
        let trigger = config.schedule.daily_trigger_time().ok_or_else(|| {
            MatchdayError::Internal(format!(
                "unparseable daily trigger: {}",
                config.schedule.daily_trigger
            ))
        })?;
        let cycle = DailyCycle::new(
            source,
            sink.clone(),
            clock,
            &config.schedule,
            &config.posting,
        );
        Ok(Self {
            cycle: Arc::new(Mutex::new(cycle)),
            sink,
            clock,
            trigger,
            run_on_startup: config.schedule.run_on_startup,
            current: None,
            last_cycle_date: None,
        })
    }

    /// Run until cancelled. Never returns on its own.
    pub async fn run(&mut self) {
        if let Err(e) = self.sink.send("⚽ Match notifier online").await {
            warn!("startup notification failed: {}", e);
        }

        if self.run_on_startup {
            info!("running first daily cycle immediately");
            self.launch_cycle().await;
        }

        loop {
            let now = self.clock.now();
            let next = self.next_cycle_start(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(
                "next daily cycle at {} ({}s from now)",
                next.format("%Y-%m-%d %H:%M %Z"),
                wait.as_secs()
            );
            tokio::time::sleep(wait).await;
            self.launch_cycle().await;
        }
    }

    /// When the next trigger falls on a day that already had a cycle (a
    /// startup cycle before trigger time), the trigger rolls to the day
    /// after. One cycle per civil day, no mid-day state reset.
    fn next_cycle_start(
        &self,
        now: chrono::DateTime<chrono_tz::Tz>,
    ) -> chrono::DateTime<chrono_tz::Tz> {
        let next = self.clock.next_trigger(now, self.trigger);
        if self.last_cycle_date == Some(next.date_naive()) {
            self.clock.next_trigger(next, self.trigger)
        } else {
            next
        }
    }

    /// Replace any running cycle with a fresh one.
    ///
    /// Aborting before awaiting guarantees the old task has released the
    /// cycle lock before the new task tries to take it.
    async fn launch_cycle(&mut self) {
        if let Some(handle) = self.current.take() {
            if !handle.is_finished() {
                info!("aborting previous daily cycle");
            }
            handle.abort();
            let _ = handle.await;
        }

        self.last_cycle_date = Some(self.clock.now().date_naive());
        let cycle = self.cycle.clone();
        self.current = Some(tokio::spawn(async move {
            cycle.lock().await.run_day().await;
        }));
    }

    /// Abort the in-flight cycle, if any. Called on shutdown.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}
