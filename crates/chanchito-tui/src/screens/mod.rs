//! One screen per route

pub mod crud;
pub mod home;
pub mod login;

pub use crud::{CrudMsg, CrudScreen, Mutation};
pub use home::HomeScreen;
pub use login::{LoginAction, LoginScreen};

use crate::app::TaskResult;
use crate::components::{Toast, ToastManager};
use chanchito_core::{ApiClient, ApiError, UserOutcome};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// What a screen needs from the app to start calls and report back
pub struct Ctx<'a> {
    pub client: &'a Arc<ApiClient>,
    pub tx: &'a UnboundedSender<TaskResult>,
    pub toasts: &'a mut ToastManager,
}

impl Ctx<'_> {
    /// Show a failed call the way its outcome asks for. Returns the inline
    /// message, if any, for the caller to place next to its form.
    ///
    /// Redirects are not handled here: the session store already published
    /// the sign-out and the app reacts to that event.
    pub fn report(&mut self, err: &ApiError) -> Option<String> {
        match err.outcome() {
            UserOutcome::RedirectToLogin => {
                debug!(error = %err, "Call failed for lack of a session");
                None
            }
            UserOutcome::Notify(message) => {
                self.toasts.push(Toast::error(message));
                None
            }
            UserOutcome::Inline(message) => Some(message),
        }
    }
}
