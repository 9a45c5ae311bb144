use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use std::collections::{BTreeMap, HashSet};

use crate::funnel::{self, FunnelRow};
use crate::models::{RsvpState, SessionEvent};
use crate::window;

pub const DEFAULT_HERO_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_DAILY_WINDOW_DAYS: i64 = 14;

/// Headline statistics for the engagement dashboard. Ratios are in [0, 1];
/// None means undefined (no data), never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroMetrics {
    pub invites_created: i64,
    pub new_creators: i64,
    pub invites_with_rsvp_percent: Option<f64>,
    pub median_time_to_first_response_minutes: Option<f64>,
    pub invite_expiry_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InviteMetricRow {
    pub day: NaiveDate,
    pub invites_created: i64,
    pub with_rsvp: i64,
    pub unanswered_by_open_mark: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsvpBreakdownRow {
    pub day: NaiveDate,
    pub joins: i64,
    pub maybes: i64,
    pub declines: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTables {
    pub funnel: Vec<FunnelRow>,
    pub invite_metrics: Vec<InviteMetricRow>,
    pub rsvp_breakdown: Vec<RsvpBreakdownRow>,
}

/// Raw rollup input: one row per in-window invite with its earliest ledger
/// timestamp and response count.
#[derive(Debug, FromRow)]
struct InviteRollupRow {
    creator_id: String,
    starts_at: String,
    created_at: String,
    first_rsvp_at: Option<String>,
    rsvp_count: i64,
}

#[derive(Debug)]
struct InviteSample {
    creator_id: String,
    starts_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    first_rsvp_at: Option<DateTime<Utc>>,
    has_rsvp: bool,
}

impl InviteRollupRow {
    fn parse(self) -> Option<InviteSample> {
        Some(InviteSample {
            creator_id: self.creator_id,
            starts_at: self.starts_at.parse().ok()?,
            created_at: self.created_at.parse().ok()?,
            first_rsvp_at: match self.first_rsvp_at {
                Some(raw) => Some(raw.parse().ok()?),
                None => None,
            },
            has_rsvp: self.rsvp_count > 0,
        })
    }
}

async fn fetch_invite_samples(
    db: &SqlitePool,
    cutoff: DateTime<Utc>,
) -> sqlx::Result<Vec<InviteSample>> {
    let rows: Vec<InviteRollupRow> = sqlx::query_as(
        r#"
        SELECT i.creator_id, i.starts_at, i.created_at,
               MIN(r.created_at) AS first_rsvp_at,
               COUNT(r.email) AS rsvp_count
        FROM invites i
        LEFT JOIN rsvps r ON r.invite_id = i.id
        WHERE i.created_at >= ?
        GROUP BY i.id
        "#,
    )
    .bind(cutoff.to_rfc3339())
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().filter_map(InviteRollupRow::parse).collect())
}

pub async fn compute_hero(
    db: &SqlitePool,
    window_days: i64,
    now: DateTime<Utc>,
) -> sqlx::Result<HeroMetrics> {
    let samples = fetch_invite_samples(db, now - Duration::days(window_days)).await?;
    Ok(hero_from_samples(&samples, now))
}

pub async fn compute_daily_tables(
    db: &SqlitePool,
    window_days: i64,
    now: DateTime<Utc>,
) -> sqlx::Result<DailyTables> {
    let cutoff = now - Duration::days(window_days);

    let samples = fetch_invite_samples(db, cutoff).await?;

    let events: Vec<SessionEvent> =
        sqlx::query_as("SELECT * FROM session_events WHERE occurred_at >= ?")
            .bind(cutoff.to_rfc3339())
            .fetch_all(db)
            .await?;

    let rsvps: Vec<(RsvpState, String)> =
        sqlx::query_as("SELECT state, created_at FROM rsvps WHERE created_at >= ?")
            .bind(cutoff.to_rfc3339())
            .fetch_all(db)
            .await?;

    Ok(DailyTables {
        funnel: funnel::aggregate_daily(&events, window_days, now),
        invite_metrics: invite_metrics_by_day(&samples, window_days, now),
        rsvp_breakdown: rsvp_breakdown_by_day(&rsvps, window_days, now),
    })
}

fn hero_from_samples(samples: &[InviteSample], now: DateTime<Utc>) -> HeroMetrics {
    let invites_created = samples.len() as i64;

    let new_creators = samples
        .iter()
        .map(|s| s.creator_id.as_str())
        .collect::<HashSet<_>>()
        .len() as i64;

    let with_rsvp = samples.iter().filter(|s| s.has_rsvp).count() as i64;
    let invites_with_rsvp_percent = if invites_created > 0 {
        Some(with_rsvp as f64 / invites_created as f64)
    } else {
        None
    };

    // Latency from invite creation to the earliest response; negative samples
    // are clock skew, dropped rather than clamped.
    let latencies: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.first_rsvp_at.map(|first| (first - s.created_at).num_seconds()))
        .filter(|&seconds| seconds >= 0)
        .map(|seconds| seconds as f64 / 60.0)
        .collect();

    // Expiry rate only over invites the 30-minute rule can already judge.
    let verdicts: Vec<bool> = samples
        .iter()
        .filter_map(|s| window::unanswered_by_open_mark(s.starts_at, s.first_rsvp_at, now))
        .collect();
    let invite_expiry_rate = if verdicts.is_empty() {
        None
    } else {
        Some(verdicts.iter().filter(|&&unanswered| unanswered).count() as f64 / verdicts.len() as f64)
    };

    HeroMetrics {
        invites_created,
        new_creators,
        invites_with_rsvp_percent,
        median_time_to_first_response_minutes: median(latencies),
        invite_expiry_rate,
    }
}

/// Standard even/odd median; empty input is undefined, not zero.
pub fn median(mut samples: Vec<f64>) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_by(f64::total_cmp);
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        Some(samples[mid])
    } else {
        Some((samples[mid - 1] + samples[mid]) / 2.0)
    }
}

fn window_day_range(window_days: i64, now: DateTime<Utc>) -> Vec<NaiveDate> {
    let today = now.date_naive();
    (0..window_days)
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
        .collect()
}

fn invite_metrics_by_day(
    samples: &[InviteSample],
    window_days: i64,
    now: DateTime<Utc>,
) -> Vec<InviteMetricRow> {
    let mut by_day: BTreeMap<NaiveDate, (i64, i64, i64)> = BTreeMap::new();
    for sample in samples {
        let entry = by_day.entry(sample.created_at.date_naive()).or_default();
        entry.0 += 1;
        if sample.has_rsvp {
            entry.1 += 1;
        }
        if window::unanswered_by_open_mark(sample.starts_at, sample.first_rsvp_at, now)
            == Some(true)
        {
            entry.2 += 1;
        }
    }

    window_day_range(window_days, now)
        .into_iter()
        .map(|day| {
            let (created, with_rsvp, unanswered) = by_day.get(&day).copied().unwrap_or_default();
            InviteMetricRow {
                day,
                invites_created: created,
                with_rsvp,
                unanswered_by_open_mark: unanswered,
            }
        })
        .collect()
}

fn rsvp_breakdown_by_day(
    rsvps: &[(RsvpState, String)],
    window_days: i64,
    now: DateTime<Utc>,
) -> Vec<RsvpBreakdownRow> {
    let mut by_day: BTreeMap<NaiveDate, (i64, i64, i64)> = BTreeMap::new();
    for (state, created_at) in rsvps {
        let Ok(created) = created_at.parse::<DateTime<Utc>>() else {
            continue;
        };
        let entry = by_day.entry(created.date_naive()).or_default();
        match state {
            RsvpState::Join => entry.0 += 1,
            RsvpState::Maybe => entry.1 += 1,
            RsvpState::Decline => entry.2 += 1,
        }
    }

    window_day_range(window_days, now)
        .into_iter()
        .map(|day| {
            let (joins, maybes, declines) = by_day.get(&day).copied().unwrap_or_default();
            RsvpBreakdownRow { day, joins, maybes, declines }
        })
        .collect()
}
