use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::CircleMember;

/// A submission's identity before resolution: a signed-in host (email already
/// verified by the identity provider) or a self-declared guest. The ledger
/// only ever sees the canonical email this resolves to.
pub enum Respondent {
    Host { email: String, name: String },
    Guest { email: String, name: Option<String> },
}

pub struct ResolvedIdentity {
    pub email: String,
    pub display_name: Option<String>,
    pub is_guest: bool,
}

/// Resolve a respondent to its canonical dedup key. Guest emails are
/// validated; host emails are trusted but still canonicalized so a guest who
/// later signs in with the same address lands on the same ledger row.
pub fn resolve(respondent: Respondent) -> Result<ResolvedIdentity, AppError> {
    match respondent {
        Respondent::Host { email, name } => Ok(ResolvedIdentity {
            email: canonicalize(&email),
            display_name: Some(name),
            is_guest: false,
        }),
        Respondent::Guest { email, name } => {
            let email = canonicalize(&email);
            if !is_valid_email(&email) {
                return Err(AppError::Validation("invalid email address".to_string()));
            }
            let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
            Ok(ResolvedIdentity {
                email,
                display_name: name,
                is_guest: true,
            })
        }
    }
}

pub fn canonicalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Address syntax check on an already-canonicalized address: one `@`,
/// restricted local-part charset, domain with at least one dot and no
/// empty labels.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c));
    if !local_ok {
        return false;
    }
    if !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

/// Ensure a membership row exists in every circle the invite targets.
/// Best-effort: each circle is attempted independently, failures are logged
/// and never surfaced, and existing rows are left untouched (names are not
/// overwritten). Runs outside the RSVP write path.
pub async fn reconcile_circles(db: &SqlitePool, invite_id: &str, email: &str, name: Option<String>) {
    let circles: Vec<(String,)> =
        match sqlx::query_as("SELECT circle_id FROM invite_circles WHERE invite_id = ?")
            .bind(invite_id)
            .fetch_all(db)
            .await
        {
            Ok(circles) => circles,
            Err(e) => {
                tracing::warn!("circle lookup failed for invite {invite_id}: {e}");
                return;
            }
        };

    for (circle_id,) in circles {
        let member = CircleMember::new(circle_id.clone(), email.to_string(), name.clone());
        let result = sqlx::query(
            "INSERT OR IGNORE INTO circle_members (circle_id, email, name, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&member.circle_id)
        .bind(&member.email)
        .bind(&member.name)
        .bind(&member.joined_at)
        .execute(db)
        .await;

        if let Err(e) = result {
            tracing::warn!("circle reconciliation failed for circle {circle_id}: {e}");
        }
    }
}
