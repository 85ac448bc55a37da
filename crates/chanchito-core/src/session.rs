//! Session store
//!
//! Holds the credential bundle (token, role, user id) for the signed-in
//! user. The value is only ever replaced as a whole; readers get a cloned
//! snapshot and always observe the last committed value. Every change is
//! broadcast as a [`SessionEvent`] so front ends can react (navigate, redraw)
//! without the store knowing about routing.

use crate::error::CoreError;
use crate::event::{SessionEvent, SignOutReason, SESSION_EVENT_CAPACITY};
use crate::storage::{SessionStorage, StoredSession};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Role hint returned by the server alongside the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Empleado,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Empleado]
    }

    /// Wire and storage form
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Empleado => "empleado",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Empleado => "Employee",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for role strings other than `admin` / `empleado`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "empleado" => Ok(Role::Empleado),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Authenticated identity held by the client
///
/// The token is an opaque bearer credential. It is never decoded or
/// verified here; the role is trusted as sent by the server.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user_id: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role, user_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            role,
            user_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Build a session from a persisted record. Missing, blank or
    /// unrecognised required fields yield `None`.
    pub fn from_stored(record: &StoredSession) -> Option<Self> {
        let role = record.role.as_deref()?.trim().parse::<Role>().ok()?;
        Self::normalized(record.token.as_deref()?, role, record.user_id.as_deref())
    }

    /// Trimmed token and user id; a blank user id becomes `None`.
    /// `None` when the token is blank. Applied on save and on load so a
    /// stored session reads back unchanged.
    fn normalized(token: &str, role: Role, user_id: Option<&str>) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Some(Self::new(token, role, user_id))
    }

    fn to_stored(&self) -> StoredSession {
        StoredSession {
            token: Some(self.token.clone()),
            role: Some(self.role.as_str().to_string()),
            user_id: self.user_id.clone(),
        }
    }
}

// Keep the bearer token out of logs and panic messages
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Owner of the current session and its persisted copy
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Create an empty store. Call [`SessionStore::hydrate`] to pick up a
    /// previously persisted session.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            storage: Box::new(storage),
            current: RwLock::new(None),
            events,
        }
    }

    /// Create a store and hydrate it immediately
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Load the persisted session into memory.
    ///
    /// Never fails: unreadable storage, corrupt JSON, and missing or
    /// unrecognised fields all count as "no session".
    pub fn hydrate(&self) -> Option<Session> {
        let session = match self.storage.load() {
            Ok(Some(record)) => {
                let session = Session::from_stored(&record);
                if session.is_none() {
                    warn!("Persisted session is incomplete, ignoring it");
                }
                session
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session, starting signed out");
                None
            }
        };

        *self.current.write() = session.clone();
        session
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Store a new session after login.
    ///
    /// Token and user id are trimmed and a blank user id dropped; a blank
    /// token is rejected. Persists the whole record first; memory is only
    /// swapped when the write succeeded, so storage and memory never
    /// disagree. Publishes [`SessionEvent::SignedIn`].
    pub fn set(
        &self,
        token: impl AsRef<str>,
        role: Role,
        user_id: Option<String>,
    ) -> Result<Session, CoreError> {
        let session = Session::normalized(token.as_ref(), role, user_id.as_deref())
            .ok_or_else(|| CoreError::InvalidSession {
                message: "token is empty".to_string(),
            })?;

        {
            let mut current = self.current.write();
            self.storage.save(&session.to_stored())?;
            *current = Some(session.clone());
        }

        info!(role = %session.role, user_id = ?session.user_id, "Signed in");
        self.publish(SessionEvent::SignedIn {
            role: session.role,
            user_id: session.user_id.clone(),
        });
        Ok(session)
    }

    /// Log out: drop the persisted record and the in-memory session.
    ///
    /// The in-memory session is always cleared and
    /// [`SessionEvent::SignedOut`] always published; a storage failure is
    /// reported afterwards.
    pub fn clear(&self) -> Result<(), CoreError> {
        let result = {
            let mut current = self.current.write();
            *current = None;
            self.storage.remove()
        };

        info!("Signed out");
        self.publish(SessionEvent::SignedOut {
            reason: SignOutReason::Logout,
        });
        result
    }

    /// Clear the session because the server rejected `token`.
    ///
    /// Only clears when the current session still carries that token, so
    /// several calls failing with the same stale token produce a single
    /// sign-out. Returns whether this call cleared the session.
    pub fn expire(&self, token: &str) -> bool {
        {
            let mut current = self.current.write();
            match current.as_ref() {
                Some(session) if session.token == token => {}
                _ => return false,
            }
            *current = None;
            if let Err(e) = self.storage.remove() {
                warn!(error = %e, "Failed to remove persisted session after expiry");
            }
        }

        warn!("Session rejected by the server, signed out");
        self.publish(SessionEvent::SignedOut {
            reason: SignOutReason::Expired,
        });
        true
    }

    /// Subscribe to session events published from now on. Nothing is
    /// replayed; read [`SessionStore::current`] for the starting state.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers (CLI mode) is fine
        let _ = self.events.send(event);
    }
}
