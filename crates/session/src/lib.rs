//! Per-identity conversation sessions with a fixed membership snapshot.
//!
//! A session is created on the first turn (or an explicit `start`), carries
//! the directory-membership flag captured at creation for its whole
//! lifetime, and records each turn's intent and message. Persistence is
//! fail-open throughout: a broken store degrades the turn to sessionless
//! guest mode instead of failing it.

mod error;
mod manager;
mod phone;
mod session;
mod store;

pub use error::{Result, SessionError};
pub use manager::{SessionManager, TurnSession};
pub use phone::{matches_variant, phone_variants};
pub use session::{HistoryEntry, Session, SessionContext};
pub use store::{MembershipRoster, MemorySessionStore, SessionStore};

use std::time::Duration;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
