//! Auth gate: decides whether a route may render for the current session
//!
//! Pure and synchronous. Evaluated on every navigation; nothing is cached
//! because the session can change between two navigations.

use crate::navigation::{RouteDescriptor, RouteId};
use crate::session::Session;

/// Minimum privilege a route requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthLevel {
    /// Reachable without a session
    Public,
    /// Any signed-in user
    Authenticated,
    /// Signed-in user with the admin role
    Admin,
}

/// Outcome of checking a session against an auth level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No session, route is not public
    Unauthenticated,
    /// Session present but the route is admin-only
    InsufficientRole,
    Authorized,
}

/// What the router should do with a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Render,
    Redirect { to: RouteId, state: GateState },
}

/// Classify `session` against `level`
pub fn check(session: Option<&Session>, level: AuthLevel) -> GateState {
    match (session, level) {
        (_, AuthLevel::Public) => GateState::Authorized,
        (None, _) => GateState::Unauthenticated,
        (Some(session), AuthLevel::Admin) if !session.is_admin() => GateState::InsufficientRole,
        (Some(_), _) => GateState::Authorized,
    }
}

/// Decide whether `route` renders or where to redirect.
///
/// Unauthenticated access goes to the login view; an insufficient role is a
/// silent downgrade to the authenticated landing view.
pub fn evaluate(session: Option<&Session>, route: &RouteDescriptor) -> Access {
    match check(session, route.auth_level) {
        GateState::Authorized => Access::Render,
        state @ GateState::Unauthenticated => Access::Redirect {
            to: RouteId::LOGIN,
            state,
        },
        state @ GateState::InsufficientRole => Access::Redirect {
            to: RouteId::LANDING,
            state,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::ROUTES;
    use crate::session::Role;

    fn admin() -> Session {
        Session::new("abc", Role::Admin, Some("1".into()))
    }

    fn empleado() -> Session {
        Session::new("def", Role::Empleado, Some("2".into()))
    }

    #[test]
    fn test_public_always_authorized() {
        assert_eq!(check(None, AuthLevel::Public), GateState::Authorized);
        assert_eq!(check(Some(&empleado()), AuthLevel::Public), GateState::Authorized);
    }

    #[test]
    fn test_no_session_redirects_to_login_for_every_protected_route() {
        for route in ROUTES.iter().filter(|r| r.auth_level != AuthLevel::Public) {
            assert_eq!(
                evaluate(None, route),
                Access::Redirect {
                    to: RouteId::Login,
                    state: GateState::Unauthenticated
                },
                "route {}",
                route.path
            );
        }
    }

    #[test]
    fn test_non_admin_never_renders_admin_routes() {
        let session = empleado();
        for route in ROUTES.iter().filter(|r| r.auth_level == AuthLevel::Admin) {
            assert_eq!(
                evaluate(Some(&session), route),
                Access::Redirect {
                    to: RouteId::Home,
                    state: GateState::InsufficientRole
                },
                "route {}",
                route.path
            );
        }
    }

    #[test]
    fn test_admin_renders_everything() {
        let session = admin();
        for route in ROUTES.iter() {
            assert_eq!(evaluate(Some(&session), route), Access::Render);
        }
    }

    #[test]
    fn test_empleado_renders_authenticated_routes() {
        let session = empleado();
        assert_eq!(
            evaluate(Some(&session), RouteId::Productos.descriptor()),
            Access::Render
        );
        assert_eq!(
            evaluate(Some(&session), RouteId::Home.descriptor()),
            Access::Render
        );
    }
}
