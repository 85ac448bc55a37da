//! Login: the only unauthenticated call

use super::{decode, ApiClient};
use crate::error::{ApiError, ValidationError};
use crate::session::{Role, Session};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const LOGIN_PATH: &str = "auth/login";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    role: String,
    /// Some server builds send a number, others a string
    #[serde(default)]
    user_id: Option<serde_json::Value>,
}

fn normalize_user_id(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ApiClient {
    /// Exchange credentials for a session and store it.
    ///
    /// Empty fields fail validation without a call. A 4xx answer is
    /// reported as [`ApiError::InvalidCredentials`] and leaves any existing
    /// session alone.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::MissingField { field: "Username" }.into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField { field: "Password" }.into());
        }

        let endpoint = format!("POST {}", LOGIN_PATH);
        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|source| ApiError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_client_error() {
            warn!(username, status = status.as_u16(), "Login rejected");
            return Err(ApiError::InvalidCredentials);
        }

        let bytes = response.bytes().await.map_err(|source| ApiError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Http {
                endpoint,
                status: status.as_u16(),
                body: None,
            });
        }

        let body: LoginResponse = decode(&endpoint, &bytes)?;
        let token = body.token.trim();
        if token.is_empty() {
            return Err(ApiError::MalformedPayload {
                endpoint,
                message: "empty token".to_string(),
            });
        }
        let role = body
            .role
            .parse::<Role>()
            .map_err(|e| ApiError::MalformedPayload {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        info!(username, role = %role, "Login accepted");
        let session = self
            .session
            .set(token, role, normalize_user_id(body.user_id))?;
        Ok(session)
    }

    /// Drop the session locally. The server keeps no logout endpoint.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_user_id() {
        assert_eq!(normalize_user_id(Some(json!("1"))), Some("1".to_string()));
        assert_eq!(normalize_user_id(Some(json!(42))), Some("42".to_string()));
        assert_eq!(normalize_user_id(Some(json!(null))), None);
        assert_eq!(normalize_user_id(Some(json!(""))), None);
        assert_eq!(normalize_user_id(None), None);
    }
}
