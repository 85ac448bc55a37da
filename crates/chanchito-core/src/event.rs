//! Session events
//!
//! Published by [`SessionStore`](crate::session::SessionStore) on a tokio
//! broadcast channel; front ends subscribe and decide where to navigate. The
//! store itself never touches routing.

use crate::session::Role;

/// Buffered events per subscriber before it starts lagging
pub const SESSION_EVENT_CAPACITY: usize = 16;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// Explicit logout
    Logout,
    /// The server rejected the token (401/403)
    Expired,
}

/// Events emitted by the session store. Never carries the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new session was stored after a successful login
    SignedIn { role: Role, user_id: Option<String> },
    /// The session was cleared
    SignedOut { reason: SignOutReason },
}
