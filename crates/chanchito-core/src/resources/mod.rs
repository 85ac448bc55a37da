//! Managed resources (products, categories, users)
//!
//! Each resource describes itself once: endpoint segment, table columns,
//! form field schema, draft building and client-side filter. The front ends
//! drive a single generic CRUD screen from this description.

mod categoria;
mod producto;
mod usuario;

pub use categoria::{Categoria, CategoriaDraft};
pub use producto::{Producto, ProductoDraft};
pub use usuario::{Usuario, UsuarioDraft};

use crate::error::ValidationError;
use crate::filter::ListFilter;
use crate::navigation::RouteId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// Whether a form creates a record or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// Source of options for a lookup field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Text that must not be echoed
    Secret,
    Integer,
    Decimal,
    /// Fixed set of wire values
    Choice(&'static [&'static str]),
    /// Id picked from another resource's list
    Lookup(Lookup),
}

/// One input in a resource form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Table column: header and relative width (percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub width: u16,
}

/// Raw form input, keyed by [`FieldSpec::key`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<&'static str, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, empty when unset
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Start from the schema's defaults (first option for choices)
    pub fn defaults_for(fields: &[FieldSpec]) -> Self {
        let mut form = Self::new();
        for field in fields {
            let value = match field.kind {
                FieldKind::Choice(options) => options.first().copied().unwrap_or(""),
                _ => "",
            };
            form.set(field.key, value);
        }
        form
    }
}

/// A record type managed through `/api/<segment>/{listar,crear,actualizar/:id,eliminar/:id}`
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Payload for create/update
    type Draft: Serialize + Send + Sync + 'static;

    /// Path segment under `/api/`
    const SEGMENT: &'static str;
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    /// View that manages this resource
    const ROUTE: RouteId;
    /// Create/edit/delete require the admin role
    const ADMIN_MUTATIONS: bool;
    /// List screen offers a role filter
    const FILTERS_BY_ROLE: bool = false;

    fn id(&self) -> i64;

    /// Short name used in confirmations and toasts
    fn display_name(&self) -> &str;

    fn columns() -> &'static [Column];

    /// Cell text, one per column
    fn cells(&self) -> Vec<String>;

    fn fields(mode: FormMode) -> Vec<FieldSpec>;

    /// Prefill an edit form
    fn to_form(&self) -> FormValues;

    /// Validate form input and build the payload
    fn draft(form: &FormValues, mode: FormMode) -> Result<Self::Draft, ValidationError>;

    /// Client-side filter over an already-fetched list
    fn matches(&self, filter: &ListFilter) -> bool;
}

// ============================================================================
// Field parsing helpers
// ============================================================================

pub(crate) fn required_text(
    form: &FormValues,
    key: &str,
    label: &'static str,
) -> Result<String, ValidationError> {
    let value = form.get(key).trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField { field: label });
    }
    Ok(value.to_string())
}

pub(crate) fn optional_text(form: &FormValues, key: &str) -> Option<String> {
    let value = form.get(key).trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub(crate) fn required_decimal(
    form: &FormValues,
    key: &str,
    label: &'static str,
) -> Result<f64, ValidationError> {
    let raw = required_text(form, key, label)?;
    let value: f64 = raw
        .replace(',', ".")
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or(ValidationError::InvalidNumber {
            field: label,
            value: raw.clone(),
        })?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field: label });
    }
    Ok(value)
}

pub(crate) fn required_integer(
    form: &FormValues,
    key: &str,
    label: &'static str,
) -> Result<i64, ValidationError> {
    let raw = required_text(form, key, label)?;
    let value: i64 = raw.parse().map_err(|_| ValidationError::InvalidNumber {
        field: label,
        value: raw.clone(),
    })?;
    if value < 0 {
        return Err(ValidationError::Negative { field: label });
    }
    Ok(value)
}

pub(crate) fn optional_id(
    form: &FormValues,
    key: &str,
    label: &'static str,
) -> Result<Option<i64>, ValidationError> {
    match optional_text(form, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::InvalidNumber { field: label, value: raw }),
    }
}

pub(crate) fn choice(
    form: &FormValues,
    key: &str,
    label: &'static str,
    options: &[&str],
) -> Result<String, ValidationError> {
    let value = required_text(form, key, label)?;
    if !options.contains(&value.as_str()) {
        return Err(ValidationError::InvalidChoice { field: label, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pick_first_choice() {
        let fields = [
            FieldSpec::new("username", "Username", FieldKind::Text),
            FieldSpec::new("role", "Role", FieldKind::Choice(&["admin", "empleado"])),
        ];
        let form = FormValues::defaults_for(&fields);
        assert_eq!(form.get("username"), "");
        assert_eq!(form.get("role"), "admin");
    }

    #[test]
    fn test_decimal_accepts_comma() {
        let form = FormValues::new().with("precio", "12,50");
        assert_eq!(required_decimal(&form, "precio", "Price"), Ok(12.5));
    }

    #[test]
    fn test_number_errors() {
        let form = FormValues::new()
            .with("precio", "abc")
            .with("cantidad", "-3")
            .with("categoriaId", "x");
        assert!(matches!(
            required_decimal(&form, "precio", "Price"),
            Err(ValidationError::InvalidNumber { .. })
        ));
        assert_eq!(
            required_integer(&form, "cantidad", "Quantity"),
            Err(ValidationError::Negative { field: "Quantity" })
        );
        assert!(optional_id(&form, "categoriaId", "Category").is_err());
        assert_eq!(optional_id(&FormValues::new(), "categoriaId", "Category"), Ok(None));
    }
}
