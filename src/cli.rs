//! One-shot console commands next to the long-running daemon.

use crate::adapters::football_api::FixtureSource;
use crate::domain::{league_name, Fixture};
use crate::error::Result;
use crate::scheduler::Clock;

/// Print today's tracked fixtures with their local kickoff times.
pub async fn show_today(source: &dyn FixtureSource, clock: &Clock) -> Result<()> {
    let today = clock.today_string();
    let fixtures = source.fixtures_for_date(&today).await?;

    if fixtures.is_empty() {
        println!("No tracked matches on {}.", today);
        return Ok(());
    }

    println!("Matches on {}:", today);
    for fixture in &fixtures {
        println!("  {}", day_summary(fixture, clock));
    }
    Ok(())
}

fn day_summary(fixture: &Fixture, clock: &Clock) -> String {
    let league = league_name(fixture.league_id).unwrap_or("unknown competition");
    if fixture.status.is_unstarted() {
        format!(
            "{} - {} vs {} [{}]",
            clock.to_local(fixture.kickoff_utc).format("%H:%M"),
            fixture.home,
            fixture.away,
            league
        )
    } else if fixture.status.is_final() {
        format!(
            "FT: {} {} {} [{}]",
            fixture.home,
            fixture.score.key().replace('-', " - "),
            fixture.away,
            league
        )
    } else {
        format!(
            "LIVE: {} {} {} [{}]",
            fixture.home,
            fixture.score.key().replace('-', " - "),
            fixture.away,
            league
        )
    }
}

/// Print a team's next scheduled fixture.
pub async fn show_next(
    source: &dyn FixtureSource,
    clock: &Clock,
    team_id: u32,
    season: Option<i32>,
) -> Result<()> {
    match source.next_fixture_for_team(team_id, season).await? {
        Some(fixture) => {
            let kickoff = clock.to_local(fixture.kickoff_utc);
            println!(
                "Next match: {} vs {} on {} at {}",
                fixture.home,
                fixture.away,
                kickoff.format("%A %d %B %Y"),
                kickoff.format("%H:%M %Z")
            );
        }
        None => println!("No upcoming fixture found for team {}.", team_id),
    }
    Ok(())
}

/// Print the tracked competitions.
pub fn show_competitions(league_ids: &[u32]) {
    println!("Tracked competitions:");
    for id in league_ids {
        match league_name(*id) {
            Some(name) => println!("  {:>4}  {}", id, name),
            None => println!("  {:>4}  (unknown)", id),
        }
    }
}
