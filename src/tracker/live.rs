//! Live-match poller: posts goal and red-card updates once per score.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::football_api::FixtureSource;
use crate::tracker::format;
use crate::tracker::ft::FullTimeTracker;
use crate::tracker::poster::UpsertPoster;

/// Polls the live endpoint and deduplicates updates by (fixture, score).
pub struct LivePoller {
    source: Arc<dyn FixtureSource>,
    posted: HashSet<(u64, String)>,
}

impl LivePoller {
    pub fn new(source: Arc<dyn FixtureSource>) -> Self {
        Self {
            source,
            posted: HashSet::new(),
        }
    }

    /// One live pass: fetch in-progress fixtures, post updates for unseen
    /// scores, and register every live fixture for full-time checking.
    ///
    /// A failed fetch makes this tick a no-op; the next scheduled tick
    /// retries.
    pub async fn poll_once(&mut self, ft: &mut FullTimeTracker, poster: &mut UpsertPoster) {
        let fixtures = match self.source.live_fixtures().await {
            Ok(fixtures) => fixtures,
            Err(e) => {
                warn!("live fixture fetch failed, skipping tick: {}", e);
                return;
            }
        };

        debug!("{} tracked fixtures currently live", fixtures.len());

        for fixture in fixtures {
            let key = fixture.score_key();
            if self.posted.contains(&key) {
                continue;
            }
            // Mark before any I/O so a retry within this tick cannot
            // double-post the same score.
            self.posted.insert(key);

            // Even 0-0 matches get registered so their FT is eventually
            // checked.
            ft.track(&fixture);

            let line = format::live_line(&fixture);
            if poster.upsert(&line).await.is_some() {
                info!("posted live update: {}", line);
            }
        }
    }

    /// Forget yesterday's posted scores at the start of a new day.
    pub fn reset_for_new_day(&mut self) {
        self.posted.clear();
    }

    pub fn posted_count(&self) -> usize {
        self.posted.len()
    }
}
