use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long after an invite opens before it counts as unanswered for the
/// engagement metric. Measured from window start, not window end: urgency is
/// about how fast people respond once the invite is live, while hard expiry
/// is about the window closing.
pub const OPEN_MARK_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InviteStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "expired_with_response")]
    ExpiredWithResponse,
    #[serde(rename = "expired_without_response")]
    ExpiredWithoutResponse,
}

/// Classify an invite at `now`. Responses can only be recorded while the
/// window is open, so any ledger row at all counts as a pre-expiry response.
pub fn classify(
    ends_at: DateTime<Utc>,
    first_response_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> InviteStatus {
    if now <= ends_at {
        InviteStatus::Active
    } else if first_response_at.is_some() {
        InviteStatus::ExpiredWithResponse
    } else {
        InviteStatus::ExpiredWithoutResponse
    }
}

pub fn open_mark(starts_at: DateTime<Utc>) -> DateTime<Utc> {
    starts_at + Duration::minutes(OPEN_MARK_MINUTES)
}

/// Whether the invite went unanswered through its first 30 minutes.
///
/// `Some(false)` once a response exists at or before the mark, `Some(true)`
/// once the mark has passed with no such response, and `None` while the
/// invite cannot be judged yet (no qualifying response, mark not reached) —
/// callers must exclude `None` invites from both sides of the rate.
pub fn unanswered_by_open_mark(
    starts_at: DateTime<Utc>,
    first_response_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<bool> {
    let mark = open_mark(starts_at);
    match first_response_at {
        Some(responded_at) if responded_at <= mark => Some(false),
        _ if now > mark => Some(true),
        _ => None,
    }
}
