//! Output formatting for the scriptable subcommands
//!
//! Every formatter renders either a human table (comfy-table) or JSON.

use chanchito_core::{ApiError, Dashboard, Resource, Session, UserOutcome};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

pub const NOT_SIGNED_IN: &str = "Not signed in. Run `chanchito login <username>` first.";

/// Turn a failed call into a message for the terminal
pub fn explain(err: ApiError) -> anyhow::Error {
    let message = match err.outcome() {
        UserOutcome::RedirectToLogin => match err {
            ApiError::SessionExpired { .. } => {
                "The server rejected the stored session; it has been cleared. Sign in again."
                    .to_string()
            }
            _ => NOT_SIGNED_IN.to_string(),
        },
        UserOutcome::Notify(message) | UserOutcome::Inline(message) => message,
    };
    anyhow::Error::new(err).context(message)
}

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| {
        if no_color {
            Cell::new(h)
        } else {
            Cell::new(h).fg(Color::Magenta)
        }
    }));
    table
}

/// Format a resource list as a table (human) or JSON
pub fn format_resource_table<R>(items: &[&R], json: bool, no_color: bool) -> String
where
    R: Resource + Serialize,
{
    if json {
        return serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
    }

    if items.is_empty() {
        return format!("No {} found.", R::PLURAL);
    }

    let headers: Vec<&str> = R::columns().iter().map(|c| c.header).collect();
    let mut table = new_table(&headers, no_color);
    for item in items {
        table.add_row(item.cells().into_iter().map(|cell| Cell::new(truncate(&cell, 48))));
    }

    format!("{}\n\n{} {}", table, items.len(), R::PLURAL)
}

pub fn format_whoami(session: Option<&Session>, base_url: &str, json: bool) -> String {
    if json {
        let value = match session {
            Some(session) => json!({
                "authenticated": true,
                "role": session.role,
                "userId": session.user_id,
                "apiUrl": base_url,
            }),
            None => json!({ "authenticated": false, "apiUrl": base_url }),
        };
        return serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    }

    match session {
        Some(session) => {
            let mut lines = vec![format!("Signed in as {}", session.role.label())];
            if let Some(user_id) = &session.user_id {
                lines.push(format!("User id: {}", user_id));
            }
            lines.push(format!("API:     {}", base_url));
            lines.join("\n")
        }
        None => format!("Not signed in (API: {})", base_url),
    }
}

pub fn format_dashboard(dashboard: &Dashboard, threshold: i64, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(dashboard).unwrap_or_else(|_| "{}".to_string());
    }

    let mut table = new_table(&["Metric", "Count"], no_color);
    table.add_row(vec![
        Cell::new("Products"),
        Cell::new(dashboard.products),
    ]);

    let low_stock = Cell::new(dashboard.low_stock);
    table.add_row(vec![
        Cell::new(format!("Low stock (≤ {})", threshold)),
        if dashboard.low_stock > 0 && !no_color {
            low_stock.fg(Color::Yellow)
        } else {
            low_stock
        },
    ]);

    // Only present for admins
    if let Some(categories) = dashboard.categories {
        table.add_row(vec![Cell::new("Categories"), Cell::new(categories)]);
    }
    if let Some(users) = dashboard.users {
        table.add_row(vec![Cell::new("Users"), Cell::new(users)]);
    }

    table.to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanchito_core::{Categoria, Producto, Role};

    fn producto() -> Producto {
        Producto {
            id: 7,
            nombre: "Alcancía".to_string(),
            descripcion: Some("Cerámica".to_string()),
            precio: 12.5,
            cantidad: 3,
            categoria_id: Some(1),
            categoria: Some("Regalos".to_string()),
        }
    }

    #[test]
    fn test_table_has_headers_and_rows() {
        let p = producto();
        let output = format_resource_table(&[&p], false, true);
        assert!(output.contains("Alcancía"));
        assert!(output.contains("Regalos"));
        assert!(output.contains("$12.50"));
        assert!(output.ends_with("1 products"));
    }

    #[test]
    fn test_json_uses_wire_names() {
        let p = producto();
        let output = format_resource_table(&[&p], true, true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["categoriaId"], 1);
        assert_eq!(value[0]["nombre"], "Alcancía");
    }

    #[test]
    fn test_empty_list_message() {
        let output = format_resource_table::<Categoria>(&[], false, true);
        assert_eq!(output, "No categories found.");
    }

    #[test]
    fn test_whoami() {
        let session = Session::new("tok", Role::Empleado, Some("4".to_string()));
        let text = format_whoami(Some(&session), "http://localhost:5016", false);
        assert!(text.contains("Employee"));
        assert!(text.contains("User id: 4"));
        assert!(!text.contains("tok"));

        let json = format_whoami(None, "http://localhost:5016", true);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["authenticated"], false);
    }

    #[test]
    fn test_dashboard_hides_admin_counts() {
        let dashboard = Dashboard {
            products: 3,
            low_stock: 1,
            categories: None,
            users: None,
        };
        let output = format_dashboard(&dashboard, 5, false, true);
        assert!(output.contains("Products"));
        assert!(!output.contains("Users"));
    }

    #[test]
    fn test_explain_session_errors() {
        let err = explain(ApiError::NotAuthenticated);
        assert_eq!(err.to_string(), NOT_SIGNED_IN);

        let err = explain(ApiError::InvalidCredentials);
        assert_eq!(err.to_string(), "Invalid credentials. Try again!");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
