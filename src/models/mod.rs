pub mod circle;
pub mod event;
pub mod host;
pub mod invite;
pub mod rsvp;

pub use circle::{Circle, CircleMember};
pub use event::{EventKind, SessionEvent};
pub use host::Host;
pub use invite::Invite;
pub use rsvp::{Rsvp, RsvpState};
