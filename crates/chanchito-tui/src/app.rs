//! TUI application state
//!
//! The app never decides on its own who may see what: every route change
//! goes through [`chanchito_core::navigate`], and sign-in/sign-out are
//! reactions to [`SessionEvent`]s published by the session store.

use crate::components::{FormAction, FormModal, Spinner, Toast, ToastManager};
use crate::screens::{CrudMsg, CrudScreen, Ctx, HomeScreen, LoginAction, LoginScreen};
use chanchito_core::api::save_report;
use chanchito_core::navigation::RedirectReason;
use chanchito_core::resources::{FieldKind, FieldSpec};
use chanchito_core::{
    navigate, visible_entries, ApiClient, ApiError, Categoria, Dashboard, FormMode, FormValues,
    NavEntry, Navigation, Producto, RouteId, Session, SessionEvent, SignOutReason, UserOutcome,
    Usuario,
};
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Completion of a spawned call, delivered back to the event loop
#[derive(Debug)]
pub enum TaskResult {
    Login(Result<Session, ApiError>),
    Dashboard {
        epoch: u64,
        result: Result<Dashboard, ApiError>,
    },
    Productos(CrudMsg<Producto>),
    Categorias(CrudMsg<Categoria>),
    Usuarios(CrudMsg<Usuario>),
    Report {
        epoch: u64,
        result: Result<PathBuf, ApiError>,
    },
    Alert {
        epoch: u64,
        result: Result<(), ApiError>,
    },
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Products at or below this quantity count as low stock
    pub low_stock_threshold: i64,
    /// Where downloaded reports are written
    pub report_dir: PathBuf,
}

pub struct App {
    pub client: Arc<ApiClient>,
    session_rx: broadcast::Receiver<SessionEvent>,
    task_tx: mpsc::UnboundedSender<TaskResult>,
    task_rx: mpsc::UnboundedReceiver<TaskResult>,

    pub route: RouteId,
    pub login: LoginScreen,
    pub home: HomeScreen,
    pub productos: CrudScreen<Producto>,
    pub categorias: CrudScreen<Categoria>,
    pub usuarios: CrudScreen<Usuario>,

    /// Low-stock alert prompt (products view)
    pub alert: Option<FormModal>,
    report_busy: bool,
    alert_busy: bool,
    /// Bumped on sign-out so app-level results of the old session are dropped
    epoch: u64,

    pub toasts: ToastManager,
    pub spinner: Spinner,
    pub should_quit: bool,
    pub options: AppOptions,
}

impl App {
    pub fn new(client: Arc<ApiClient>, options: AppOptions) -> Self {
        let session_rx = client.session().subscribe();
        let (task_tx, task_rx) = mpsc::unbounded_channel();

        Self {
            client,
            session_rx,
            task_tx,
            task_rx,
            route: RouteId::LOGIN,
            login: LoginScreen::new(),
            home: HomeScreen::new(),
            productos: CrudScreen::new(TaskResult::Productos),
            categorias: CrudScreen::new(TaskResult::Categorias),
            usuarios: CrudScreen::new(TaskResult::Usuarios),
            alert: None,
            report_busy: false,
            alert_busy: false,
            epoch: 0,
            toasts: ToastManager::new(),
            spinner: Spinner::new(),
            should_quit: false,
            options,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.client.session().current()
    }

    pub fn entries(&self) -> Vec<NavEntry> {
        visible_entries(self.session().as_ref())
    }

    pub fn is_busy(&self) -> bool {
        self.report_busy || self.alert_busy
    }

    /// Open the first view; unknown paths fall back to the landing view
    pub fn start(&mut self, path: &str) {
        if navigate(path, self.session().as_ref()).route().is_none() {
            self.toasts
                .push(Toast::warning(format!("No view at {}", path.trim())));
            self.go(RouteId::LANDING.path());
        } else {
            self.go(path);
        }
    }

    /// Navigate to `path` through the auth gate
    pub fn go(&mut self, path: &str) {
        let session = self.session();
        match navigate(path, session.as_ref()) {
            Navigation::Render { route, redirects } => {
                for hop in &redirects {
                    debug!(from = %hop.from, to = hop.to.path(), reason = ?hop.reason, "Redirected");
                }
                if redirects
                    .iter()
                    .any(|hop| hop.reason == RedirectReason::InsufficientRole)
                {
                    self.toasts
                        .push(Toast::warning("That view is for administrators only"));
                }
                self.enter(route);
            }
            Navigation::NotFound { path } => {
                self.toasts.push(Toast::warning(format!("No view at {}", path)));
            }
        }
    }

    /// Show `route` and fetch its data
    fn enter(&mut self, route: RouteId) {
        self.route = route;
        let mut ctx = Ctx {
            client: &self.client,
            tx: &self.task_tx,
            toasts: &mut self.toasts,
        };
        match route {
            RouteId::Login => {}
            RouteId::Home => self.home.load(&mut ctx, self.options.low_stock_threshold),
            RouteId::Productos => self.productos.load(&mut ctx),
            RouteId::Categorias => self.categorias.load(&mut ctx),
            RouteId::Usuarios => self.usuarios.load(&mut ctx),
        }
    }

    /// Move through the sidebar entries the session may see
    fn cycle_route(&mut self, delta: isize) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }
        let current = entries
            .iter()
            .position(|e| e.route == self.route)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(entries.len() as isize) as usize;
        self.go(entries[next].path);
    }

    fn jump_to(&mut self, index: usize) {
        if let Some(entry) = self.entries().get(index) {
            self.go(entry.path);
        }
    }

    fn content_captures_input(&self) -> bool {
        match self.route {
            RouteId::Productos => self.productos.captures_input(),
            RouteId::Categorias => self.categorias.captures_input(),
            RouteId::Usuarios => self.usuarios.captures_input(),
            RouteId::Login | RouteId::Home => false,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.route == RouteId::Login {
            match self.login.handle_key(code) {
                Some(LoginAction::Submit { username, password }) => {
                    self.spawn_login(username, password)
                }
                Some(LoginAction::Quit) => self.should_quit = true,
                None => {}
            }
            return;
        }

        if let Some(form) = self.alert.as_mut() {
            match form.handle_key(code) {
                Some(FormAction::Submit) => self.submit_alert(),
                Some(FormAction::Cancel) => self.alert = None,
                None => {}
            }
            return;
        }

        if self.content_captures_input() {
            self.delegate(code);
            return;
        }

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.cycle_route(1),
            KeyCode::BackTab => self.cycle_route(-1),
            KeyCode::Char(c @ '1'..='9') => self.jump_to(c as usize - '1' as usize),
            KeyCode::Char('L') => self.logout(),
            KeyCode::F(5) => self.enter(self.route),
            KeyCode::Char('p') if self.route == RouteId::Productos => self.download_report(),
            KeyCode::Char('m') if self.route == RouteId::Productos => self.open_alert(),
            _ => self.delegate(code),
        }
    }

    fn delegate(&mut self, code: KeyCode) {
        let mut ctx = Ctx {
            client: &self.client,
            tx: &self.task_tx,
            toasts: &mut self.toasts,
        };
        match self.route {
            RouteId::Productos => {
                self.productos.handle_key(code, &mut ctx);
            }
            RouteId::Categorias => {
                self.categorias.handle_key(code, &mut ctx);
            }
            RouteId::Usuarios => {
                self.usuarios.handle_key(code, &mut ctx);
            }
            RouteId::Home => {
                if code == KeyCode::Char('r') {
                    self.home.load(&mut ctx, self.options.low_stock_threshold);
                }
            }
            RouteId::Login => {}
        }
    }

    fn spawn_login(&mut self, username: String, password: String) {
        let client = self.client.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = client.login(&username, &password).await;
            let _ = tx.send(TaskResult::Login(result));
        });
    }

    pub fn logout(&mut self) {
        // Memory is cleared and SignedOut published even if the file survives
        if let Err(e) = self.client.logout() {
            warn!(error = %e, "Stored session could not be removed");
            self.toasts
                .push(Toast::warning("Signed out, but the stored session could not be removed"));
        }
    }

    fn download_report(&mut self) {
        if self.report_busy {
            return;
        }
        self.report_busy = true;
        self.toasts.push(Toast::info("Generating low-stock report..."));

        let epoch = self.epoch;
        let client = self.client.clone();
        let tx = self.task_tx.clone();
        let dir = self.options.report_dir.clone();
        tokio::spawn(async move {
            let result = fetch_report(&client, &dir).await;
            let _ = tx.send(TaskResult::Report { epoch, result });
        });
    }

    fn open_alert(&mut self) {
        self.alert = Some(FormModal::new(
            "Low-stock alert",
            FormMode::Create,
            vec![FieldSpec::new("mensaje", "Message", FieldKind::Text)],
            FormValues::new(),
        ));
    }

    fn submit_alert(&mut self) {
        if self.alert_busy {
            return;
        }
        let Some(form) = self.alert.as_mut() else {
            return;
        };
        let message = form.values.get("mensaje").trim().to_string();
        if message.is_empty() {
            form.error = Some("Message is required".to_string());
            return;
        }
        form.error = None;
        self.alert_busy = true;

        let epoch = self.epoch;
        let client = self.client.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = client.report_low_stock(&message).await;
            let _ = tx.send(TaskResult::Alert { epoch, result });
        });
    }

    /// Drain session events and finished calls. Called once per frame.
    pub fn poll_events(&mut self) {
        loop {
            match self.session_rx.try_recv() {
                Ok(event) => self.on_session_event(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    // Re-run the gate on the current view against the current session
                    warn!(skipped, "Session events lagged");
                    self.go(self.route.path());
                }
                Err(_) => break,
            }
        }

        while let Ok(result) = self.task_rx.try_recv() {
            self.apply(result);
        }
    }

    fn on_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn { role, .. } => {
                info!(role = %role, "Signed in");
                // May replace a live session (signing in again from /login)
                self.reset_screens();
                self.login.reset();
                self.go(RouteId::LANDING.path());
            }
            SessionEvent::SignedOut { reason } => {
                info!(?reason, "Signed out");
                self.reset_screens();
                self.go(RouteId::LOGIN.path());
                match reason {
                    SignOutReason::Expired => self
                        .toasts
                        .push(Toast::warning("Your session expired. Please sign in again.")),
                    SignOutReason::Logout => self.toasts.push(Toast::info("Signed out")),
                }
            }
        }
    }

    fn reset_screens(&mut self) {
        self.epoch += 1;
        self.home.reset();
        self.productos.reset();
        self.categorias.reset();
        self.usuarios.reset();
        self.alert = None;
        self.report_busy = false;
        self.alert_busy = false;
    }

    pub fn apply(&mut self, result: TaskResult) {
        let mut ctx = Ctx {
            client: &self.client,
            tx: &self.task_tx,
            toasts: &mut self.toasts,
        };

        match result {
            TaskResult::Login(result) => {
                let message = match result {
                    Ok(_) => None,
                    Err(e) => match e.outcome() {
                        UserOutcome::Inline(message) | UserOutcome::Notify(message) => {
                            Some(message)
                        }
                        UserOutcome::RedirectToLogin => None,
                    },
                };
                self.login.finish(message);
            }
            TaskResult::Dashboard { epoch, result } => self.home.apply(epoch, result, &mut ctx),
            TaskResult::Productos(msg) => self.productos.apply(msg, &mut ctx),
            TaskResult::Categorias(msg) => self.categorias.apply(msg, &mut ctx),
            TaskResult::Usuarios(msg) => self.usuarios.apply(msg, &mut ctx),
            TaskResult::Report { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                self.report_busy = false;
                match result {
                    Ok(path) => ctx
                        .toasts
                        .push(Toast::success(format!("Report saved to {}", path.display()))),
                    Err(e) => {
                        if let Some(message) = ctx.report(&e) {
                            ctx.toasts.push(Toast::error(message));
                        }
                    }
                }
            }
            TaskResult::Alert { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                self.alert_busy = false;
                match result {
                    Ok(()) => {
                        self.alert = None;
                        ctx.toasts.push(Toast::success("Low-stock alert sent"));
                    }
                    Err(e) => match (ctx.report(&e), self.alert.as_mut()) {
                        (Some(message), Some(form)) => form.error = Some(message),
                        (Some(message), None) => ctx.toasts.push(Toast::error(message)),
                        (None, _) => {}
                    },
                }
            }
        }
    }
}

async fn fetch_report(client: &ApiClient, dir: &Path) -> Result<PathBuf, ApiError> {
    let bytes = client.low_stock_report().await?;
    Ok(save_report(&bytes, dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ToastType;
    use chanchito_core::storage::MemoryStorage;
    use chanchito_core::{ClientConfig, Role, SessionStore};

    fn app_with(role: Option<Role>) -> App {
        let session = Arc::new(SessionStore::new(MemoryStorage::new()));
        if let Some(role) = role {
            session.set("tok", role, Some("1".to_string())).unwrap();
        }
        // Nothing listens here; spawned calls fail quietly
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .unwrap();
        let client = Arc::new(ApiClient::new(&config, session).unwrap());
        App::new(
            client,
            AppOptions {
                low_stock_threshold: 5,
                report_dir: std::env::temp_dir(),
            },
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(code, KeyModifiers::NONE);
    }

    #[tokio::test]
    async fn test_no_session_lands_on_login() {
        let mut app = app_with(None);
        app.start("/productos");
        assert_eq!(app.route, RouteId::Login);
    }

    #[tokio::test]
    async fn test_empleado_is_kept_out_of_admin_views() {
        let mut app = app_with(Some(Role::Empleado));
        app.start("/usuarios");
        assert_eq!(app.route, RouteId::Home);
        assert_eq!(
            app.toasts.latest().map(|t| t.toast_type),
            Some(ToastType::Warning)
        );

        // Number keys only reach entries in the sidebar
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.route, RouteId::Productos);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.route, RouteId::Productos);
    }

    #[tokio::test]
    async fn test_tab_cycles_through_visible_entries() {
        let mut app = app_with(Some(Role::Admin));
        app.start("/home");

        let mut seen = Vec::new();
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
            seen.push(app.route);
        }
        assert_eq!(
            seen,
            vec![
                RouteId::Usuarios,
                RouteId::Productos,
                RouteId::Categorias,
                RouteId::Home
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_start_path_falls_back() {
        let mut app = app_with(Some(Role::Admin));
        app.start("/nope");
        assert_eq!(app.route, RouteId::Home);
        assert!(app
            .toasts
            .latest()
            .is_some_and(|t| t.message.contains("/nope")));
    }

    #[tokio::test]
    async fn test_expired_session_returns_to_login_once() {
        let mut app = app_with(Some(Role::Admin));
        app.start("/productos");
        assert_eq!(app.route, RouteId::Productos);

        assert!(app.client.session().expire("tok"));
        assert!(!app.client.session().expire("tok"));
        app.poll_events();

        assert_eq!(app.route, RouteId::Login);
        assert!(app.productos.items().is_empty());
        let expired_toasts = app.toasts.len();
        assert_eq!(
            app.toasts.latest().map(|t| t.toast_type),
            Some(ToastType::Warning)
        );

        app.poll_events();
        assert_eq!(app.toasts.len(), expired_toasts);
    }

    #[tokio::test]
    async fn test_sign_in_event_opens_home() {
        let mut app = app_with(None);
        app.start("/");
        assert_eq!(app.route, RouteId::Login);

        app.client
            .session()
            .set("fresh", Role::Empleado, None)
            .unwrap();
        app.poll_events();
        assert_eq!(app.route, RouteId::Home);
    }

    #[tokio::test]
    async fn test_sign_in_over_live_session_drops_old_state() {
        let mut app = app_with(Some(Role::Admin));
        app.start("/productos");
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('z'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.productos.list_filter().query, "z");

        app.client
            .session()
            .set("other", Role::Empleado, Some("2".to_string()))
            .unwrap();
        app.poll_events();

        assert_eq!(app.route, RouteId::Home);
        assert!(app.productos.list_filter().is_empty());
        assert!(app.productos.items().is_empty());
    }

    #[tokio::test]
    async fn test_logout_key() {
        let mut app = app_with(Some(Role::Empleado));
        app.start("/home");
        press(&mut app, KeyCode::Char('L'));
        app.poll_events();

        assert_eq!(app.route, RouteId::Login);
        assert!(app.session().is_none());
    }

    #[tokio::test]
    async fn test_login_failure_is_inline() {
        let mut app = app_with(None);
        app.start("/login");
        for c in "admin1".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);
        assert!(app.login.busy);

        app.apply(TaskResult::Login(Err(ApiError::InvalidCredentials)));
        assert!(!app.login.busy);
        assert_eq!(
            app.login.error.as_deref(),
            Some("Invalid credentials. Try again!")
        );
        assert_eq!(app.route, RouteId::Login);
    }

    #[tokio::test]
    async fn test_q_in_filter_does_not_quit() {
        let mut app = app_with(Some(Role::Empleado));
        app.start("/productos");
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_alert_requires_message() {
        let mut app = app_with(Some(Role::Empleado));
        app.start("/productos");
        press(&mut app, KeyCode::Char('m'));
        assert!(app.alert.is_some());

        press(&mut app, KeyCode::Enter);
        assert!(!app.is_busy());
        assert!(app.alert.as_ref().and_then(|f| f.error.as_ref()).is_some());

        press(&mut app, KeyCode::Esc);
        assert!(app.alert.is_none());
    }

    #[tokio::test]
    async fn test_stale_report_result_is_dropped() {
        let mut app = app_with(Some(Role::Admin));
        app.start("/productos");
        let before = app.toasts.len();

        app.apply(TaskResult::Report {
            epoch: 99,
            result: Ok(PathBuf::from("/tmp/x.pdf")),
        });
        assert_eq!(app.toasts.len(), before);
    }
}
