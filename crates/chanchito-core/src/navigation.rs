//! Navigation model: route table, sidebar entries and the navigator
//!
//! Sidebar visibility is computed by running the auth gate over the same
//! route descriptors the navigator enforces, so the two cannot drift apart.
//! Hiding an entry is cosmetic; every navigation is gated regardless.

use crate::gate::{self, Access, AuthLevel, GateState};
use crate::session::Session;
use tracing::debug;

/// Redirect hops followed before giving up on a navigation
const MAX_REDIRECTS: usize = 4;

/// Known views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteId {
    Login,
    Home,
    Usuarios,
    Productos,
    Categorias,
}

impl RouteId {
    /// Public landing view (where unauthenticated users are sent)
    pub const LOGIN: RouteId = RouteId::Login;
    /// Authenticated landing view
    pub const LANDING: RouteId = RouteId::Home;

    pub fn all() -> &'static [RouteId] {
        &[
            RouteId::Login,
            RouteId::Home,
            RouteId::Usuarios,
            RouteId::Productos,
            RouteId::Categorias,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            RouteId::Login => 0,
            RouteId::Home => 1,
            RouteId::Usuarios => 2,
            RouteId::Productos => 3,
            RouteId::Categorias => 4,
        }
    }

    pub fn descriptor(&self) -> &'static RouteDescriptor {
        &ROUTES[self.index()]
    }

    pub fn path(&self) -> &'static str {
        self.descriptor().path
    }

    pub fn label(&self) -> &'static str {
        self.descriptor().label
    }
}

/// Static description of a route and the privilege it requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub id: RouteId,
    pub path: &'static str,
    pub auth_level: AuthLevel,
    pub label: &'static str,
    /// Shown as a sidebar entry when the gate allows it
    pub in_sidebar: bool,
}

/// Route table. Order is sidebar order and must match [`RouteId::index`].
pub static ROUTES: [RouteDescriptor; 5] = [
    RouteDescriptor {
        id: RouteId::Login,
        path: "/login",
        auth_level: AuthLevel::Public,
        label: "Login",
        in_sidebar: false,
    },
    RouteDescriptor {
        id: RouteId::Home,
        path: "/home",
        auth_level: AuthLevel::Authenticated,
        label: "Home",
        in_sidebar: true,
    },
    RouteDescriptor {
        id: RouteId::Usuarios,
        path: "/usuarios",
        auth_level: AuthLevel::Admin,
        label: "Users",
        in_sidebar: true,
    },
    RouteDescriptor {
        id: RouteId::Productos,
        path: "/productos",
        auth_level: AuthLevel::Authenticated,
        label: "Products",
        in_sidebar: true,
    },
    RouteDescriptor {
        id: RouteId::Categorias,
        path: "/categorias",
        auth_level: AuthLevel::Admin,
        label: "Categories",
        in_sidebar: true,
    },
];

/// Paths that are plain aliases of a route
const ALIASES: &[(&str, RouteId)] = &[("/", RouteId::Login)];

/// Look up a route by path. Trailing slashes and case are ignored.
pub fn resolve(path: &str) -> Option<&'static RouteDescriptor> {
    let trimmed = path.trim();
    let normalized = if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    };

    ROUTES
        .iter()
        .find(|route| route.path.eq_ignore_ascii_case(normalized))
}

fn alias(path: &str) -> Option<RouteId> {
    let trimmed = path.trim();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, id)| *id)
}

/// Sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub route: RouteId,
    pub label: &'static str,
    pub path: &'static str,
}

/// Ordered sidebar entries the session may see. Empty without a session.
pub fn visible_entries(session: Option<&Session>) -> Vec<NavEntry> {
    if session.is_none() {
        return Vec::new();
    }

    ROUTES
        .iter()
        .filter(|route| route.in_sidebar)
        .filter(|route| gate::check(session, route.auth_level) == GateState::Authorized)
        .map(|route| NavEntry {
            route: route.id,
            label: route.label,
            path: route.path,
        })
        .collect()
}

/// Why a navigation was redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// The path is an alias of another route
    Alias,
    Unauthenticated,
    InsufficientRole,
}

/// One redirect hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub from: String,
    pub to: RouteId,
    pub reason: RedirectReason,
}

/// Result of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render `route`; `redirects` lists the hops taken to get there
    Render {
        route: RouteId,
        redirects: Vec<Redirect>,
    },
    NotFound { path: String },
}

impl Navigation {
    /// Route that ends up rendered, if any
    pub fn route(&self) -> Option<RouteId> {
        match self {
            Navigation::Render { route, .. } => Some(*route),
            Navigation::NotFound { .. } => None,
        }
    }

    pub fn was_redirected(&self) -> bool {
        matches!(self, Navigation::Render { redirects, .. } if !redirects.is_empty())
    }
}

/// Resolve `path` and run the auth gate, following redirects.
pub fn navigate(path: &str, session: Option<&Session>) -> Navigation {
    let mut redirects = Vec::new();
    let mut current = path.to_string();

    for _ in 0..=MAX_REDIRECTS {
        if let Some(target) = alias(&current) {
            redirects.push(Redirect {
                from: current.clone(),
                to: target,
                reason: RedirectReason::Alias,
            });
            current = target.path().to_string();
            continue;
        }

        let Some(route) = resolve(&current) else {
            debug!(path = %current, "No route for path");
            return Navigation::NotFound { path: current };
        };

        match gate::evaluate(session, route) {
            Access::Render => {
                debug!(path = %path, route = ?route.id, hops = redirects.len(), "Navigation resolved");
                return Navigation::Render {
                    route: route.id,
                    redirects,
                };
            }
            Access::Redirect { to, state } => {
                let reason = match state {
                    GateState::InsufficientRole => RedirectReason::InsufficientRole,
                    _ => RedirectReason::Unauthenticated,
                };
                redirects.push(Redirect {
                    from: route.path.to_string(),
                    to,
                    reason,
                });
                current = to.path().to_string();
            }
        }
    }

    // Unreachable with the static table (login is public); fall back to it
    Navigation::Render {
        route: RouteId::LOGIN,
        redirects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_route_table_matches_index() {
        for id in RouteId::all() {
            assert_eq!(id.descriptor().id, *id);
        }
    }

    #[test]
    fn test_resolve_normalizes() {
        assert_eq!(resolve("/home").map(|r| r.id), Some(RouteId::Home));
        assert_eq!(resolve("/home/").map(|r| r.id), Some(RouteId::Home));
        assert_eq!(resolve("/Usuarios").map(|r| r.id), Some(RouteId::Usuarios));
        assert!(resolve("/nope").is_none());
    }

    #[test]
    fn test_no_session_has_no_entries() {
        assert!(visible_entries(None).is_empty());
    }

    #[test]
    fn test_admin_entries() {
        let session = Session::new("abc", Role::Admin, Some("1".into()));
        let routes: Vec<_> = visible_entries(Some(&session))
            .into_iter()
            .map(|e| e.route)
            .collect();
        assert_eq!(
            routes,
            vec![
                RouteId::Home,
                RouteId::Usuarios,
                RouteId::Productos,
                RouteId::Categorias
            ]
        );
    }

    #[test]
    fn test_empleado_entries() {
        let session = Session::new("abc", Role::Empleado, None);
        let routes: Vec<_> = visible_entries(Some(&session))
            .into_iter()
            .map(|e| e.route)
            .collect();
        assert_eq!(routes, vec![RouteId::Home, RouteId::Productos]);
    }

    #[test]
    fn test_root_redirects_to_login() {
        let nav = navigate("/", None);
        assert_eq!(nav.route(), Some(RouteId::Login));
        assert!(nav.was_redirected());
    }

    #[test]
    fn test_direct_url_without_session_goes_to_login() {
        for path in ["/home", "/productos", "/usuarios", "/categorias"] {
            let nav = navigate(path, None);
            match nav {
                Navigation::Render { route, redirects } => {
                    assert_eq!(route, RouteId::Login);
                    assert_eq!(redirects[0].reason, RedirectReason::Unauthenticated);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_empleado_direct_url_to_users_goes_home() {
        let session = Session::new("abc", Role::Empleado, None);
        let nav = navigate("/usuarios", Some(&session));
        assert_eq!(
            nav,
            Navigation::Render {
                route: RouteId::Home,
                redirects: vec![Redirect {
                    from: "/usuarios".to_string(),
                    to: RouteId::Home,
                    reason: RedirectReason::InsufficientRole,
                }],
            }
        );
    }

    #[test]
    fn test_unknown_path_not_found() {
        let session = Session::new("abc", Role::Admin, None);
        assert_eq!(
            navigate("/reportes", Some(&session)),
            Navigation::NotFound {
                path: "/reportes".to_string()
            }
        );
    }

    #[test]
    fn test_login_renders_when_signed_in() {
        let session = Session::new("abc", Role::Admin, None);
        assert_eq!(navigate("/login", Some(&session)).route(), Some(RouteId::Login));
    }
}
