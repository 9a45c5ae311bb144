use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{Invite, Rsvp};

pub type NotifyError = Box<dyn std::error::Error + Send + Sync>;

/// Seam for the transactional email dispatcher. Invoked after a response is
/// committed, with the invite and the full current ledger snapshot; a failed
/// dispatch is logged and never rolls back or retries the RSVP write.
#[async_trait]
pub trait RosterNotifier: Send + Sync {
    async fn roster_changed(&self, invite: &Invite, roster: &[Rsvp]) -> Result<(), NotifyError>;
}

pub type SharedNotifier = Arc<dyn RosterNotifier>;

/// Default dispatcher: records the send instead of delivering mail.
pub struct LogNotifier;

#[async_trait]
impl RosterNotifier for LogNotifier {
    async fn roster_changed(&self, invite: &Invite, roster: &[Rsvp]) -> Result<(), NotifyError> {
        tracing::info!(
            invite_id = %invite.id,
            responses = roster.len(),
            "dispatching roster update to host"
        );
        Ok(())
    }
}
