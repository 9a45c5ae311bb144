use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::models::{EventKind, SessionEvent};

/// One calendar day of the landing → create-click → invite-created funnel.
/// Days are UTC for deterministic cross-day comparison regardless of client
/// time zones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelRow {
    pub day: NaiveDate,
    pub landing_sessions: i64,
    pub create_click_sessions: i64,
    pub invites_created: i64,
    /// create_click_sessions / landing_sessions; None (not zero) when there
    /// were no landings that day.
    pub conversion_rate: Option<f64>,
}

fn event_day(event: &SessionEvent) -> Option<NaiveDate> {
    event
        .occurred_at
        .parse::<DateTime<Utc>>()
        .ok()
        .map(|t| t.date_naive())
}

/// Aggregate one calendar day of raw events. Sessions are counted distinctly
/// per kind; invite creations are plain counts.
pub fn aggregate_day(day: NaiveDate, events: &[SessionEvent]) -> FunnelRow {
    let mut landing_sessions: HashSet<&str> = HashSet::new();
    let mut create_click_sessions: HashSet<&str> = HashSet::new();
    let mut invites_created = 0i64;

    for event in events {
        if event_day(event) != Some(day) {
            continue;
        }
        match event.kind {
            EventKind::LandingView => {
                landing_sessions.insert(event.session_id.as_str());
            }
            EventKind::CreateClick => {
                create_click_sessions.insert(event.session_id.as_str());
            }
            EventKind::InviteCreated => invites_created += 1,
        }
    }

    let landings = landing_sessions.len() as i64;
    let clicks = create_click_sessions.len() as i64;
    let conversion_rate = if landings > 0 {
        Some(clicks as f64 / landings as f64)
    } else {
        None
    };

    FunnelRow {
        day,
        landing_sessions: landings,
        create_click_sessions: clicks,
        invites_created,
        conversion_rate,
    }
}

/// One row per day of the trailing window, oldest first, zero-filled.
pub fn aggregate_daily(
    events: &[SessionEvent],
    window_days: i64,
    now: DateTime<Utc>,
) -> Vec<FunnelRow> {
    let today = now.date_naive();
    (0..window_days)
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
        .map(|day| aggregate_day(day, events))
        .collect()
}
