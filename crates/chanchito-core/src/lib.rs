//! chanchito-core - Core library for the Chanchito Feliz admin client
//!
//! Provides the session store, auth gate, navigation model and the remote
//! call wrapper for the inventory REST API.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod filter;
pub mod gate;
pub mod navigation;
pub mod resources;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use dashboard::{load_dashboard, Dashboard};
pub use error::{ApiError, CoreError, UserOutcome, ValidationError};
pub use event::{SessionEvent, SignOutReason};
pub use filter::ListFilter;
pub use gate::{Access, AuthLevel, GateState};
pub use navigation::{navigate, visible_entries, NavEntry, Navigation, RouteId};
pub use resources::{Categoria, FormMode, FormValues, Producto, Resource, Usuario};
pub use session::{Role, Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
