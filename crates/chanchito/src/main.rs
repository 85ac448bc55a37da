//! chanchito - Chanchito Feliz inventory admin client

mod cli;

use anyhow::{bail, Context, Result};
use chanchito_core::config::default_config_dir;
use chanchito_core::gate::{self, Access};
use chanchito_core::{
    api::save_report, filter, load_dashboard, ApiClient, Categoria, ClientConfig, FileStorage,
    ListFilter, Producto, Resource, Role, RouteId, SessionStore, Usuario,
};
use chanchito_tui::AppOptions;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chanchito",
    version,
    about = "Chanchito Feliz inventory admin client",
    long_about = "Terminal client for the Chanchito Feliz inventory API.\n\
                  \n\
                  Runs an interactive TUI by default; the subcommands below are\n\
                  scriptable and print tables or JSON.\n\
                  \n\
                  Examples:\n\
                    chanchito                              # Run TUI (default)\n\
                    chanchito tui --open /productos        # Open a specific view\n\
                    chanchito login admin1                 # Sign in (prompts for password)\n\
                    chanchito list productos -f papel      # Filter products by name/category\n\
                    chanchito list usuarios --role admin   # Admin only\n\
                    chanchito report -o ~/Descargas        # Download the low-stock PDF\n\
                    chanchito alert \"Quedan 2 alcancías\"   # Send a low-stock alert\n\
                  \n\
                  Environment Variables:\n\
                    CHANCHITO_API_URL                      # API base URL\n\
                    CHANCHITO_CONFIG                       # Config file path\n\
                    CHANCHITO_SESSION_FILE                 # Stored session path\n\
                    CHANCHITO_PASSWORD                     # Password for `login`\n\
                    RUST_LOG                               # Log filter (default: chanchito=info)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Base URL of the inventory API (default: http://localhost:5016)
    #[arg(long, env = "CHANCHITO_API_URL")]
    api_url: Option<String>,

    /// Path to the config file (default: <config dir>/chanchito/config.toml)
    #[arg(long, env = "CHANCHITO_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the stored session (default: <config dir>/chanchito/session.json)
    #[arg(long, env = "CHANCHITO_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log filter, RUST_LOG syntax
    #[arg(long, env = "RUST_LOG", default_value = "chanchito=info")]
    log_level: String,

    /// Disable ANSI colors in tables
    #[arg(long, env = "CHANCHITO_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the interactive TUI (default)
    Tui {
        /// View to open first, e.g. /productos
        #[arg(long, default_value = "/home")]
        open: String,
    },
    /// Sign in and store the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "CHANCHITO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami {
        #[arg(long)]
        json: bool,
    },
    /// List products, categories or users
    List {
        resource: ResourceKind,
        /// Case-insensitive text filter
        #[arg(long, short = 'f')]
        filter: Option<String>,
        /// Only users with this role (admin|empleado)
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        json: bool,
    },
    /// Dashboard counts
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// Download the low-stock PDF report
    Report {
        /// Directory to write into (default: current directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Send a low-stock alert message
    Alert { message: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceKind {
    #[value(alias = "products")]
    Productos,
    #[value(alias = "categories")]
    Categorias,
    #[value(alias = "users")]
    Usuarios,
}

impl ResourceKind {
    fn route(self) -> RouteId {
        match self {
            ResourceKind::Productos => Producto::ROUTE,
            ResourceKind::Categorias => Categoria::ROUTE,
            ResourceKind::Usuarios => Usuario::ROUTE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let mode = cli.mode.take().unwrap_or(Mode::Tui {
        open: RouteId::LANDING.path().to_string(),
    });

    // The TUI owns the terminal, so its logs go to a file
    let log_file = match &mode {
        Mode::Tui { .. } => default_config_dir().map(|dir| dir.join("chanchito.log")),
        _ => None,
    };
    init_logging(&cli.log_level, log_file.as_deref())?;

    let config = load_config(&cli)?;
    let client = build_client(&config)?;
    let no_color = cli.no_color;

    match mode {
        Mode::Tui { open } => run_tui(client, &config, &open).await?,
        Mode::Login { username, password } => run_login(&client, &username, password).await?,
        Mode::Logout => run_logout(&client)?,
        Mode::Whoami { json } => {
            let session = client.session().current();
            println!(
                "{}",
                cli::format_whoami(session.as_ref(), client.base_url(), json)
            );
        }
        Mode::List {
            resource,
            filter,
            role,
            json,
        } => {
            let filter = ListFilter::query(filter.unwrap_or_default()).with_role(role);
            run_list(&client, resource, &filter, json, no_color).await?
        }
        Mode::Dashboard { json } => {
            let threshold = config.low_stock_threshold;
            let dashboard = with_spinner("Loading dashboard...", load_dashboard(&client, threshold))
                .await
                .map_err(cli::explain)?;
            println!(
                "{}",
                cli::format_dashboard(&dashboard, threshold, json, no_color)
            );
        }
        Mode::Report { output } => {
            let dir = match output {
                Some(dir) => dir,
                None => std::env::current_dir().context("Could not determine current directory")?,
            };
            run_report(&client, &dir).await?
        }
        Mode::Alert { message } => {
            with_spinner("Sending alert...", client.report_low_stock(&message))
                .await
                .map_err(cli::explain)?;
            println!("✓ Low-stock alert sent");
        }
    }

    Ok(())
}

fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("chanchito=info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}

/// Config file, then CLI flags / environment on top
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::load_default().context("Failed to load config")?,
    };
    if let Some(url) = &cli.api_url {
        config = config
            .with_base_url(url.clone())
            .context("Invalid --api-url")?;
    }
    if let Some(path) = &cli.session_file {
        config = config.with_session_path(path.clone());
    }
    Ok(config)
}

fn build_client(config: &ClientConfig) -> Result<Arc<ApiClient>> {
    let storage = FileStorage::new(config.session_path.clone());
    let session = Arc::new(SessionStore::open(storage));
    let client = ApiClient::new(config, session).context("Failed to build HTTP client")?;
    Ok(Arc::new(client))
}

async fn run_tui(client: Arc<ApiClient>, config: &ClientConfig, open: &str) -> Result<()> {
    let report_dir = std::env::current_dir().context("Could not determine current directory")?;
    let options = AppOptions {
        low_stock_threshold: config.low_stock_threshold,
        report_dir,
    };
    chanchito_tui::run(client, options, open).await
}

async fn run_login(client: &ApiClient, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let session = with_spinner("Signing in...", client.login(username, &password))
        .await
        .map_err(cli::explain)?;
    println!("✓ Signed in as {} ({})", username, session.role.label());
    Ok(())
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn run_logout(client: &ApiClient) -> Result<()> {
    let was_signed_in = client.session().is_authenticated();
    client.logout().map_err(cli::explain)?;
    if was_signed_in {
        println!("✓ Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

async fn run_list(
    client: &ApiClient,
    kind: ResourceKind,
    filter: &ListFilter,
    json: bool,
    no_color: bool,
) -> Result<()> {
    // Same gate as the TUI: no session, or an admin-only list for an employee
    let session = client.session().current();
    let route = kind.route();
    if let Access::Redirect { to, .. } = gate::evaluate(session.as_ref(), route.descriptor()) {
        if to == RouteId::LOGIN {
            bail!(cli::NOT_SIGNED_IN);
        }
        bail!("{} are only available to administrators", route.label());
    }

    let output = match kind {
        ResourceKind::Productos => list_resource::<Producto>(client, filter, json, no_color).await?,
        ResourceKind::Categorias => {
            list_resource::<Categoria>(client, filter, json, no_color).await?
        }
        ResourceKind::Usuarios => list_resource::<Usuario>(client, filter, json, no_color).await?,
    };
    println!("{}", output);
    Ok(())
}

async fn list_resource<R>(
    client: &ApiClient,
    list_filter: &ListFilter,
    json: bool,
    no_color: bool,
) -> Result<String>
where
    R: Resource + Serialize,
{
    let api = client.crud::<R>();
    let items = with_spinner(format!("Loading {}...", R::PLURAL), api.list())
        .await
        .map_err(cli::explain)?;
    let visible = filter::apply(&items, list_filter);
    Ok(cli::format_resource_table(&visible, json, no_color))
}

async fn run_report(client: &ApiClient, dir: &Path) -> Result<()> {
    let bytes = with_spinner("Generating low-stock report...", client.low_stock_report())
        .await
        .map_err(cli::explain)?;
    let path = save_report(&bytes, dir)
        .with_context(|| format!("Failed to save report in {}", dir.display()))?;
    println!("✓ Report saved to {}", path.display());
    Ok(())
}

/// Drive `fut` with a spinner on stderr
async fn with_spinner<F: Future>(message: impl Into<String>, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.into());

    let output = fut.await;
    spinner.finish_and_clear();
    output
}
