//! api-sports `v3.football` REST adapter.
//!
//! All payload-to-entity parsing lives here so malformed-field handling is
//! written once. Fixtures that fail to parse are logged and skipped; the
//! rest of the batch is still processed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ApiConfig, TrackingConfig};
use crate::domain::{EventKind, Fixture, MatchEvent, MatchStatus, Score};
use crate::error::{MatchdayError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Read-only fixture data source.
///
/// `fixtures_for_date` and `live_fixtures` return only fixtures in the
/// tracked-competition allowlist.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// All fixtures on a civil date (`YYYY-MM-DD`).
    async fn fixtures_for_date(&self, date: &str) -> Result<Vec<Fixture>>;

    /// All fixtures currently in progress.
    async fn live_fixtures(&self) -> Result<Vec<Fixture>>;

    /// One fixture by id, `None` when the API has no payload for it.
    async fn fixture_by_id(&self, id: u64) -> Result<Option<Fixture>>;

    /// A team's next scheduled fixture, `None` when nothing is scheduled.
    async fn next_fixture_for_team(&self, team_id: u32, season: Option<i32>)
        -> Result<Option<Fixture>>;
}

/// HTTP client for the api-sports football API
#[derive(Clone)]
pub struct FootballApi {
    http: Client,
    base_url: String,
    api_key: String,
    league_allowlist: Vec<u32>,
}

impl FootballApi {
    pub fn new(api: &ApiConfig, tracking: &TrackingConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("matchday/0.1")
            .build()
            .map_err(|e| {
                MatchdayError::Internal(format!("failed to build fixture HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api.key.clone(),
            league_allowlist: tracking.league_ids.clone(),
        })
    }

    async fn get(&self, query: &str) -> Result<Envelope> {
        let url = format!("{}/fixtures?{}", self.base_url, query);
        debug!("fixture API request: {}", url);

        let resp = self
            .http
            .get(&url)
            .header("x-apisports-key", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(MatchdayError::RateLimited(format!(
                "fixture API rate limited for {}",
                url
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MatchdayError::Api(format!(
                "HTTP {} for {}: {}",
                status,
                url,
                body.chars().take(200).collect::<String>()
            )));
        }

        let envelope: Envelope = resp.json().await?;

        // The API reports semantic errors in-band with a 200 status.
        if let Some(errors) = envelope.api_errors() {
            return Err(MatchdayError::Api(format!(
                "API error for {}: {}",
                url, errors
            )));
        }

        if envelope.response.is_none() {
            warn!("fixture API payload missing 'response' key for {}", url);
        }

        Ok(envelope)
    }

    fn in_allowlist(&self, fixture: &Fixture) -> bool {
        self.league_allowlist.contains(&fixture.league_id)
    }
}

#[async_trait]
impl FixtureSource for FootballApi {
    async fn fixtures_for_date(&self, date: &str) -> Result<Vec<Fixture>> {
        let envelope = self.get(&format!("date={}", date)).await?;
        Ok(envelope
            .into_fixtures()
            .into_iter()
            .filter(|f| self.in_allowlist(f))
            .collect())
    }

    async fn live_fixtures(&self) -> Result<Vec<Fixture>> {
        let envelope = self.get("live=all").await?;
        Ok(envelope
            .into_fixtures()
            .into_iter()
            .filter(|f| self.in_allowlist(f))
            .collect())
    }

    async fn fixture_by_id(&self, id: u64) -> Result<Option<Fixture>> {
        let envelope = self.get(&format!("id={}", id)).await?;
        Ok(envelope.into_fixtures().into_iter().next())
    }

    async fn next_fixture_for_team(
        &self,
        team_id: u32,
        season: Option<i32>,
    ) -> Result<Option<Fixture>> {
        let query = match season {
            Some(season) => format!("team={}&season={}&next=1", team_id, season),
            None => format!("team={}&next=1", team_id),
        };
        let envelope = self.get(&query).await?;
        Ok(envelope.into_fixtures().into_iter().next())
    }
}

// ====================================================================
// API response types (api-sports v3 schema)
// ====================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    errors: serde_json::Value,
    response: Option<Vec<ApiFixture>>,
}

impl Envelope {
    /// In-band API errors arrive as a non-empty array or object.
    fn api_errors(&self) -> Option<String> {
        match &self.errors {
            serde_json::Value::Array(items) if !items.is_empty() => {
                Some(serde_json::Value::Array(items.clone()).to_string())
            }
            serde_json::Value::Object(map) if !map.is_empty() => {
                Some(serde_json::Value::Object(map.clone()).to_string())
            }
            _ => None,
        }
    }

    /// Convert every parseable fixture, logging and skipping malformed ones.
    fn into_fixtures(self) -> Vec<Fixture> {
        self.response
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| match raw.into_fixture() {
                Ok(fixture) => Some(fixture),
                Err(e) => {
                    warn!("skipping malformed fixture payload: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ApiFixture {
    fixture: ApiFixtureCore,
    #[serde(default)]
    league: ApiLeague,
    #[serde(default)]
    teams: ApiTeams,
    #[serde(default)]
    goals: ApiGoals,
    #[serde(default)]
    events: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiFixtureCore {
    id: Option<u64>,
    date: Option<String>,
    #[serde(default)]
    status: ApiStatus,
}

#[derive(Debug, Default, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    short: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiLeague {
    #[serde(default)]
    id: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ApiTeams {
    #[serde(default)]
    home: ApiTeam,
    #[serde(default)]
    away: ApiTeam,
}

#[derive(Debug, Default, Deserialize)]
struct ApiTeam {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiGoals {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    #[serde(default)]
    time: ApiEventTime,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    team: ApiTeam,
    #[serde(default)]
    player: ApiPlayer,
}

#[derive(Debug, Default, Deserialize)]
struct ApiEventTime {
    elapsed: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPlayer {
    name: Option<String>,
}

impl ApiFixture {
    fn into_fixture(self) -> Result<Fixture> {
        let id = self
            .fixture
            .id
            .ok_or_else(|| MatchdayError::InvalidPayload("fixture missing id".to_string()))?;

        let date = self.fixture.date.ok_or_else(|| {
            MatchdayError::InvalidPayload(format!("fixture {} missing kickoff date", id))
        })?;

        let kickoff_utc: DateTime<Utc> = DateTime::parse_from_rfc3339(&date)
            .map_err(|e| {
                MatchdayError::InvalidPayload(format!(
                    "fixture {} has unparseable kickoff '{}': {}",
                    id, date, e
                ))
            })?
            .with_timezone(&Utc);

        let events = self
            .events
            .into_iter()
            .map(|e| MatchEvent {
                minute: e.time.elapsed,
                kind: EventKind::from_api(&e.kind),
                detail: e.detail,
                team: e.team.name,
                player: e.player.name.unwrap_or_default(),
            })
            .collect();

        Ok(Fixture {
            id,
            league_id: self.league.id,
            kickoff_utc,
            home: self.teams.home.name,
            away: self.teams.away.name,
            status: MatchStatus::from_short(&self.fixture.status.short),
            score: Score {
                home: self.goals.home,
                away: self.goals.away,
            },
            events,
        })
    }
}
