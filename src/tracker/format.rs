//! Message formatting for live updates and full-time results.

use crate::domain::fixture::display_goals;
use crate::domain::{EventKind, Fixture, MatchEvent};

/// Live update line: `"AC Milan 1 - 0 Torino (23' - Leão (H))"`.
pub fn live_line(fixture: &Fixture) -> String {
    let mut line = format!(
        "{} {} - {} {}",
        fixture.home,
        display_goals(fixture.score.home),
        display_goals(fixture.score.away),
        fixture.away
    );
    append_events(&mut line, fixture);
    line
}

/// Full-time result line: `"FT: AC Milan 2 – 0 Torino (…)"`.
///
/// Uses an en dash in the score to visually set results apart from the
/// rolling live updates.
pub fn ft_line(fixture: &Fixture) -> String {
    let mut line = format!(
        "FT: {} {} – {} {}",
        fixture.home,
        display_goals(fixture.score.home),
        display_goals(fixture.score.away),
        fixture.away
    );
    append_events(&mut line, fixture);
    line
}

fn append_events(line: &mut String, fixture: &Fixture) {
    let events = event_lines(fixture);
    if !events.is_empty() {
        line.push_str(" (");
        line.push_str(&events.join("; "));
        line.push(')');
    }
}

/// Human-readable lines for the goal and red-card events of a fixture.
///
/// Goals carry their sub-type in parentheses unless it is a normal goal;
/// red cards are tagged explicitly. Other event kinds (substitutions,
/// yellow cards, VAR) are not worth a notification.
pub fn event_lines(fixture: &Fixture) -> Vec<String> {
    fixture
        .events
        .iter()
        .filter_map(|event| event_line(fixture, event))
        .collect()
}

fn event_line(fixture: &Fixture, event: &MatchEvent) -> Option<String> {
    let minute = event
        .minute
        .map_or_else(|| "?".to_string(), |m| m.to_string());
    let side = side_tag(fixture, &event.team);

    match &event.kind {
        EventKind::Goal => {
            let sub_type = if event.detail.is_empty() || event.detail == "Normal Goal" {
                String::new()
            } else {
                format!(" ({})", event.detail)
            };
            Some(format!("{}' - {}{} {}", minute, event.player, sub_type, side))
        }
        EventKind::Card if event.detail == "Red Card" => {
            Some(format!("{}' - {} (Red Card) {}", minute, event.player, side))
        }
        _ => None,
    }
}

fn side_tag(fixture: &Fixture, team: &str) -> &'static str {
    if team == fixture.home {
        "(H)"
    } else {
        "(A)"
    }
}
