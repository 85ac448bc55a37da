//! Remote call wrapper for the inventory REST API
//!
//! Every authenticated call takes a snapshot of the current session, sends
//! `Authorization: Bearer <token>` and classifies the response:
//!
//! - no session: [`ApiError::NotAuthenticated`], nothing is sent
//! - 401/403: the session is expired (once per token) and
//!   [`ApiError::SessionExpired`] returned
//! - anything else non-2xx, transport or decode failures: a plain error the
//!   caller shows as a notification; the session is untouched
//!
//! Calls are single attempts. There is no retry anywhere.

mod auth;
mod crud;
mod report;

pub use crud::CrudApi;
pub use report::{report_file_name, save_report, LOW_STOCK_ALERT_PATH, LOW_STOCK_REPORT_PATH};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::resources::Resource;
use crate::session::SessionStore;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP client bound to a session store
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// CRUD endpoints for resource `R`
    pub fn crud<R: Resource>(&self) -> CrudApi<'_, R> {
        CrudApi::new(self)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticated call returning the raw response body
    pub(crate) async fn call<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let endpoint = format!("{} {}", method, path);
        let Some(session) = self.session.current() else {
            debug!(%endpoint, "Call attempted without a session");
            return Err(ApiError::NotAuthenticated);
        };

        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&session.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%endpoint, "Calling API");
        let response = request.send().await.map_err(|source| {
            warn!(%endpoint, error = %source, "Request failed");
            ApiError::Network {
                endpoint: endpoint.clone(),
                source,
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let cleared = self.session.expire(&session.token);
            warn!(%endpoint, status = status.as_u16(), cleared, "Credentials rejected");
            return Err(ApiError::SessionExpired {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "Call failed");
            return Err(ApiError::Http {
                endpoint,
                status: status.as_u16(),
                body: error_body(&bytes),
            });
        }

        debug!(%endpoint, bytes = bytes.len(), "Call succeeded");
        Ok(bytes.to_vec())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes = self.call::<()>(Method::GET, path, None).await?;
        decode(&format!("GET {}", path), &bytes)
    }
}

/// Decode a JSON body, reporting failures as a malformed payload
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::MalformedPayload {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

/// Short server message to show the user, if the body has one
fn error_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    // Prefer a {"message": "..."} / {"mensaje": "..."} field when present
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) {
        for key in ["message", "mensaje", "error", "title"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(truncate(text));
            }
        }
    }

    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    (!text.is_empty() && !text.starts_with('<')).then(|| truncate(text))
}

fn truncate(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::default().with_base_url(base).unwrap();
        let session = Arc::new(SessionStore::new(MemoryStorage::new()));
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client("http://localhost:5016/");
        assert_eq!(
            client.url("productos/listar"),
            "http://localhost:5016/api/productos/listar"
        );
        assert_eq!(client.url("/auth/login"), "http://localhost:5016/api/auth/login");
    }

    #[tokio::test]
    async fn test_call_without_session_is_local_failure() {
        // Port 9 (discard) would fail at the network level; we never get there
        let client = client("http://127.0.0.1:9");
        let err = client
            .get_json::<serde_json::Value>("productos/listar")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[test]
    fn test_error_body_extraction() {
        assert_eq!(error_body(b""), None);
        assert_eq!(
            error_body(br#"{"message":"Stock insuficiente"}"#),
            Some("Stock insuficiente".to_string())
        );
        assert_eq!(error_body(b"plain failure"), Some("plain failure".to_string()));
        assert_eq!(error_body(b"<html>oops</html>"), None);
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode::<Vec<u32>>("GET x", b"{}").unwrap_err();
        assert!(matches!(err, ApiError::MalformedPayload { .. }));
    }
}
