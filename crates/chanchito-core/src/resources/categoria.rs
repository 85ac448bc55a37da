use super::{optional_text, required_text, Column, FieldKind, FieldSpec, FormMode, FormValues, Resource};
use crate::error::ValidationError;
use crate::filter::{contains_ci, ListFilter};
use crate::navigation::RouteId;
use serde::{Deserialize, Serialize};

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriaDraft {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

const COLUMNS: &[Column] = &[
    Column { header: "ID", width: 10 },
    Column { header: "Name", width: 40 },
    Column { header: "Description", width: 50 },
];

impl Resource for Categoria {
    type Draft = CategoriaDraft;

    const SEGMENT: &'static str = "categorias";
    const SINGULAR: &'static str = "category";
    const PLURAL: &'static str = "categories";
    const ROUTE: RouteId = RouteId::Categorias;
    const ADMIN_MUTATIONS: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.nombre
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            self.descripcion.clone().unwrap_or_default(),
        ]
    }

    fn fields(_mode: FormMode) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("nombre", "Name", FieldKind::Text),
            FieldSpec::new("descripcion", "Description", FieldKind::Text).optional(),
        ]
    }

    fn to_form(&self) -> FormValues {
        FormValues::new()
            .with("nombre", self.nombre.clone())
            .with("descripcion", self.descripcion.clone().unwrap_or_default())
    }

    fn draft(form: &FormValues, _mode: FormMode) -> Result<CategoriaDraft, ValidationError> {
        Ok(CategoriaDraft {
            nombre: required_text(form, "nombre", "Name")?,
            descripcion: optional_text(form, "descripcion"),
        })
    }

    fn matches(&self, filter: &ListFilter) -> bool {
        contains_ci(&self.nombre, &filter.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_omits_empty_description() {
        let form = FormValues::new().with("nombre", " Bebidas ");
        let draft = Categoria::draft(&form, FormMode::Create).unwrap();
        assert_eq!(draft.nombre, "Bebidas");
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({"nombre": "Bebidas"})
        );
    }

    #[test]
    fn test_filter_by_name_only() {
        let c = Categoria {
            id: 1,
            nombre: "Bebidas".to_string(),
            descripcion: Some("frías".to_string()),
        };
        assert!(c.matches(&ListFilter::query("beb")));
        assert!(!c.matches(&ListFilter::query("frías")));
    }
}
