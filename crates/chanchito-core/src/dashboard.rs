//! Home dashboard figures, computed from the list endpoints

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::resources::{Categoria, Producto, Usuario};
use serde::Serialize;

/// Counts shown on the landing view.
///
/// Category and user counts are only fetched for admins; the endpoints are
/// admin-only screens and would be wasted calls otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub products: usize,
    pub low_stock: usize,
    pub categories: Option<usize>,
    pub users: Option<usize>,
}

impl Dashboard {
    pub fn from_products(products: &[Producto], threshold: i64) -> Self {
        Self {
            products: products.len(),
            low_stock: products.iter().filter(|p| p.is_low_stock(threshold)).count(),
            categories: None,
            users: None,
        }
    }
}

/// Fetch everything the dashboard needs, concurrently
pub async fn load_dashboard(client: &ApiClient, threshold: i64) -> Result<Dashboard, ApiError> {
    let is_admin = client
        .session()
        .current()
        .ok_or(ApiError::NotAuthenticated)?
        .is_admin();

    let products = async { client.crud::<Producto>().list().await };
    let categories = async {
        if is_admin {
            client.crud::<Categoria>().list().await.map(|c| Some(c.len()))
        } else {
            Ok(None)
        }
    };
    let users = async {
        if is_admin {
            client.crud::<Usuario>().list().await.map(|u| Some(u.len()))
        } else {
            Ok(None)
        }
    };

    let (products, categories, users) = tokio::try_join!(products, categories, users)?;

    Ok(Dashboard {
        categories,
        users,
        ..Dashboard::from_products(&products, threshold)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producto(id: i64, cantidad: i64) -> Producto {
        Producto {
            id,
            nombre: format!("p{}", id),
            descripcion: None,
            precio: 1.0,
            cantidad,
            categoria_id: None,
            categoria: None,
        }
    }

    #[test]
    fn test_low_stock_count() {
        let products = vec![producto(1, 0), producto(2, 5), producto(3, 6)];
        let dashboard = Dashboard::from_products(&products, 5);
        assert_eq!(dashboard.products, 3);
        assert_eq!(dashboard.low_stock, 2);
        assert_eq!(dashboard.categories, None);
    }
}
