use chrono::{DateTime, Duration, Utc};

/// The [start, end) interval during which an invite is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WindowParseError(pub String);

impl std::fmt::Display for WindowParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not parse time window: {}", self.0)
    }
}

impl std::error::Error for WindowParseError {}

/// Turn free text into an absolute window, or fail. Invite creation must be
/// rejected on failure, never defaulted. Accepted forms:
///
///   "<rfc3339>..<rfc3339>"   explicit range
///   "until <rfc3339>"        [now, end)
///   "for 2h" / "90m"         [now, now + duration)
pub fn parse_window(text: &str, now: DateTime<Utc>) -> Result<Window, WindowParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WindowParseError("empty window".to_string()));
    }

    let window = if let Some((start, end)) = text.split_once("..") {
        Window {
            starts_at: parse_instant(start)?,
            ends_at: parse_instant(end)?,
        }
    } else if let Some(end) = text.strip_prefix("until ") {
        Window {
            starts_at: now,
            ends_at: parse_instant(end)?,
        }
    } else {
        let token = text.strip_prefix("for ").unwrap_or(text);
        Window {
            starts_at: now,
            ends_at: now + parse_duration(token)?,
        }
    };

    if window.ends_at <= window.starts_at {
        return Err(WindowParseError(format!("window end must be after start: {text}")));
    }

    Ok(window)
}

fn parse_instant(text: &str) -> Result<DateTime<Utc>, WindowParseError> {
    text.trim()
        .parse::<DateTime<Utc>>()
        .map_err(|_| WindowParseError(format!("not a timestamp: {}", text.trim())))
}

fn parse_duration(token: &str) -> Result<Duration, WindowParseError> {
    let token = token.trim();
    let (digits, hours) = if let Some(digits) = token.strip_suffix('h') {
        (digits, true)
    } else if let Some(digits) = token.strip_suffix('m') {
        (digits, false)
    } else {
        return Err(WindowParseError(format!("not a duration: {token}")));
    };
    let amount: i64 = digits
        .parse()
        .map_err(|_| WindowParseError(format!("not a duration: {token}")))?;
    if amount <= 0 {
        return Err(WindowParseError(format!("not a duration: {token}")));
    }
    Ok(if hours {
        Duration::hours(amount)
    } else {
        Duration::minutes(amount)
    })
}
