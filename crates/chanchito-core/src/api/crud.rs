//! Generic list/create/update/delete endpoints

use super::{decode, ApiClient};
use crate::error::ApiError;
use crate::resources::Resource;
use reqwest::Method;
use std::marker::PhantomData;

/// `/api/<segment>/{listar,crear,actualizar/:id,eliminar/:id}` for one resource
pub struct CrudApi<'a, R> {
    client: &'a ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R: Resource> CrudApi<'a, R> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn list_path() -> String {
        format!("{}/listar", R::SEGMENT)
    }

    pub fn create_path() -> String {
        format!("{}/crear", R::SEGMENT)
    }

    pub fn update_path(id: i64) -> String {
        format!("{}/actualizar/{}", R::SEGMENT, id)
    }

    pub fn delete_path(id: i64) -> String {
        format!("{}/eliminar/{}", R::SEGMENT, id)
    }

    pub async fn list(&self) -> Result<Vec<R>, ApiError> {
        let path = Self::list_path();
        let bytes = self.client.call::<()>(Method::GET, &path, None).await?;
        decode(&format!("GET {}", path), &bytes)
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<(), ApiError> {
        self.client
            .call(Method::POST, &Self::create_path(), Some(draft))
            .await?;
        Ok(())
    }

    pub async fn update(&self, id: i64, draft: &R::Draft) -> Result<(), ApiError> {
        self.client
            .call(Method::PUT, &Self::update_path(id), Some(draft))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .call::<()>(Method::DELETE, &Self::delete_path(id), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Categoria, Producto, Usuario};

    #[test]
    fn test_paths() {
        assert_eq!(CrudApi::<Producto>::list_path(), "productos/listar");
        assert_eq!(CrudApi::<Categoria>::create_path(), "categorias/crear");
        assert_eq!(CrudApi::<Usuario>::update_path(4), "usuarios/actualizar/4");
        assert_eq!(CrudApi::<Producto>::delete_path(9), "productos/eliminar/9");
    }
}
