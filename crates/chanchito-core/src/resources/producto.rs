use super::{
    optional_id, optional_text, required_decimal, required_integer, required_text, Column,
    FieldKind, FieldSpec, FormMode, FormValues, Lookup, Resource,
};
use crate::error::ValidationError;
use crate::filter::{contains_ci, ListFilter};
use crate::navigation::RouteId;
use serde::{Deserialize, Serialize};

/// Inventory item as returned by `/api/productos/listar`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producto {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub precio: f64,
    #[serde(default)]
    pub cantidad: i64,
    #[serde(default)]
    pub categoria_id: Option<i64>,
    /// Category name, denormalised by the server
    #[serde(default)]
    pub categoria: Option<String>,
}

impl Producto {
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.cantidad <= threshold
    }
}

/// Create/update payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductoDraft {
    pub nombre: String,
    pub descripcion: String,
    pub precio: f64,
    pub cantidad: i64,
    pub categoria_id: Option<i64>,
}

const COLUMNS: &[Column] = &[
    Column { header: "ID", width: 8 },
    Column { header: "Name", width: 27 },
    Column { header: "Description", width: 30 },
    Column { header: "Price", width: 12 },
    Column { header: "Qty", width: 8 },
    Column { header: "Category", width: 15 },
];

impl Resource for Producto {
    type Draft = ProductoDraft;

    const SEGMENT: &'static str = "productos";
    const SINGULAR: &'static str = "product";
    const PLURAL: &'static str = "products";
    const ROUTE: RouteId = RouteId::Productos;
    const ADMIN_MUTATIONS: bool = false;

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
            format!("${:.2}", self.precio),
            self.cantidad.to_string(),
            self.categoria.clone().unwrap_or_else(|| "-".to_string()),
        ]
    }

    fn fields(_mode: FormMode) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("nombre", "Name", FieldKind::Text),
            FieldSpec::new("descripcion", "Description", FieldKind::Text).optional(),
            FieldSpec::new("precio", "Price", FieldKind::Decimal),
            FieldSpec::new("cantidad", "Quantity", FieldKind::Integer),
            FieldSpec::new("categoriaId", "Category", FieldKind::Lookup(Lookup::Categories))
                .optional(),
        ]
    }

    fn to_form(&self) -> FormValues {
        FormValues::new()
            .with("nombre", self.nombre.clone())
            .with("descripcion", self.descripcion.clone().unwrap_or_default())
            .with("precio", self.precio.to_string())
            .with("cantidad", self.cantidad.to_string())
            .with(
                "categoriaId",
                self.categoria_id.map(|id| id.to_string()).unwrap_or_default(),
            )
    }

    fn draft(form: &FormValues, _mode: FormMode) -> Result<ProductoDraft, ValidationError> {
        Ok(ProductoDraft {
            nombre: required_text(form, "nombre", "Name")?,
            descripcion: optional_text(form, "descripcion").unwrap_or_default(),
            precio: required_decimal(form, "precio", "Price")?,
            cantidad: required_integer(form, "cantidad", "Quantity")?,
            categoria_id: optional_id(form, "categoriaId", "Category")?,
        })
    }

    /// Name or category name contains the query
    fn matches(&self, filter: &ListFilter) -> bool {
        contains_ci(&self.nombre, &filter.query)
            || self
                .categoria
                .as_deref()
                .is_some_and(|c| contains_ci(c, &filter.query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producto() -> Producto {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "nombre": "Alcancía",
            "descripcion": "Cerámica",
            "precio": 12.5,
            "cantidad": 3,
            "categoriaId": 2,
            "categoria": "Regalos"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_and_cells() {
        let p = producto();
        assert_eq!(p.categoria_id, Some(2));
        assert_eq!(p.cells()[3], "$12.50");
        assert_eq!(p.cells().len(), Producto::columns().len());
        assert!(p.is_low_stock(5));
        assert!(!p.is_low_stock(2));
    }

    #[test]
    fn test_missing_optional_fields() {
        let p: Producto =
            serde_json::from_value(serde_json::json!({"id": 1, "nombre": "Lapiz"})).unwrap();
        assert_eq!(p.categoria, None);
        assert_eq!(p.cells()[5], "-");
    }

    #[test]
    fn test_edit_form_roundtrip_builds_draft() {
        let p = producto();
        let draft = Producto::draft(&p.to_form(), FormMode::Edit(p.id)).unwrap();
        assert_eq!(draft.nombre, "Alcancía");
        assert_eq!(draft.precio, 12.5);
        assert_eq!(draft.cantidad, 3);
        assert_eq!(draft.categoria_id, Some(2));

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["categoriaId"], 2);
    }

    #[test]
    fn test_draft_requires_name() {
        let form = FormValues::new().with("precio", "1").with("cantidad", "1");
        assert_eq!(
            Producto::draft(&form, FormMode::Create),
            Err(ValidationError::MissingField { field: "Name" })
        );
    }

    #[test]
    fn test_filter_by_name_or_category() {
        let p = producto();
        assert!(p.matches(&ListFilter::query("alca")));
        assert!(p.matches(&ListFilter::query("REGALO")));
        assert!(!p.matches(&ListFilter::query("bebidas")));
        assert!(p.matches(&ListFilter::default()));
    }
}
