use super::{choice, required_text, Column, FieldKind, FieldSpec, FormMode, FormValues, Resource};
use crate::error::ValidationError;
use crate::filter::{contains_ci, ListFilter};
use crate::navigation::RouteId;
use crate::session::Role;
use serde::{Deserialize, Serialize};

const ROLE_OPTIONS: &[&str] = &["admin", "empleado"];

/// Account managed through `/api/usuarios`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Create payload carries a password; update payload carries the id instead
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsuarioDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
}

const COLUMNS: &[Column] = &[
    Column { header: "ID", width: 10 },
    Column { header: "Username", width: 50 },
    Column { header: "Role", width: 40 },
];

impl Resource for Usuario {
    type Draft = UsuarioDraft;

    const SEGMENT: &'static str = "usuarios";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";
    const ROUTE: RouteId = RouteId::Usuarios;
    const ADMIN_MUTATIONS: bool = true;
    const FILTERS_BY_ROLE: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.username
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.role.label().to_string(),
        ]
    }

    fn fields(mode: FormMode) -> Vec<FieldSpec> {
        let mut fields = vec![FieldSpec::new("username", "Username", FieldKind::Text)];
        if mode == FormMode::Create {
            fields.push(FieldSpec::new("password", "Password", FieldKind::Secret));
        }
        fields.push(FieldSpec::new("role", "Role", FieldKind::Choice(ROLE_OPTIONS)));
        fields
    }

    fn to_form(&self) -> FormValues {
        FormValues::new()
            .with("username", self.username.clone())
            .with("role", self.role.as_str())
    }

    fn draft(form: &FormValues, mode: FormMode) -> Result<UsuarioDraft, ValidationError> {
        let username = required_text(form, "username", "Username")?;
        let role = choice(form, "role", "Role", ROLE_OPTIONS)?
            .parse::<Role>()
            .map_err(|e| ValidationError::InvalidChoice {
                field: "Role",
                value: e.0,
            })?;

        Ok(match mode {
            FormMode::Create => UsuarioDraft {
                id: None,
                username,
                // Passwords are sent as typed; no trimming
                password: Some(non_empty_password(form)?),
                role,
            },
            FormMode::Edit(id) => UsuarioDraft {
                id: Some(id),
                username,
                password: None,
                role,
            },
        })
    }

    /// Username contains the query, and the role matches when a role filter is set
    fn matches(&self, filter: &ListFilter) -> bool {
        contains_ci(&self.username, &filter.query)
            && filter.role.is_none_or(|role| role == self.role)
    }
}

fn non_empty_password(form: &FormValues) -> Result<String, ValidationError> {
    let password = form.get("password");
    if password.is_empty() {
        return Err(ValidationError::MissingField { field: "Password" });
    }
    Ok(password.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario(role: Role) -> Usuario {
        Usuario {
            id: 3,
            username: "Maria".to_string(),
            role,
        }
    }

    #[test]
    fn test_create_form_has_password() {
        let keys: Vec<_> = Usuario::fields(FormMode::Create)
            .iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, vec!["username", "password", "role"]);

        let keys: Vec<_> = Usuario::fields(FormMode::Edit(1))
            .iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, vec!["username", "role"]);
    }

    #[test]
    fn test_create_draft_payload() {
        let form = FormValues::new()
            .with("username", "pepe")
            .with("password", "secreto")
            .with("role", "empleado");
        let draft = Usuario::draft(&form, FormMode::Create).unwrap();
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({"username": "pepe", "password": "secreto", "role": "empleado"})
        );
    }

    #[test]
    fn test_create_requires_password() {
        let form = FormValues::new().with("username", "pepe").with("role", "admin");
        assert_eq!(
            Usuario::draft(&form, FormMode::Create),
            Err(ValidationError::MissingField { field: "Password" })
        );
    }

    #[test]
    fn test_edit_draft_payload() {
        let draft = Usuario::draft(&usuario(Role::Admin).to_form(), FormMode::Edit(3)).unwrap();
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({"id": 3, "username": "Maria", "role": "admin"})
        );
    }

    #[test]
    fn test_invalid_role_rejected() {
        let form = FormValues::new().with("username", "x").with("role", "root");
        assert!(matches!(
            Usuario::draft(&form, FormMode::Edit(1)),
            Err(ValidationError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_filter_by_name_and_role() {
        let u = usuario(Role::Empleado);
        assert!(u.matches(&ListFilter::query("mar")));
        assert!(u.matches(&ListFilter::query("").with_role(Some(Role::Empleado))));
        assert!(!u.matches(&ListFilter::query("mar").with_role(Some(Role::Admin))));
        assert!(!u.matches(&ListFilter::query("juan")));
    }
}
