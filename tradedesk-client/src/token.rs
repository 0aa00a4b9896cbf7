//! Relay token acquisition

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::error::{ApiResponse, ErrorCode};
use shared::realtime::Realm;

use crate::{ClientError, ClientResult};

/// Produces a fresh relay token for each connection attempt
#[async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn fetch(&self, realm: Realm) -> ClientResult<String>;
}

#[derive(Debug, Deserialize)]
struct IssuedToken {
    token: String,
    #[allow(dead_code)]
    expires_in: u64,
}

/// Fetches relay tokens from the token endpoints with a session bearer token
#[derive(Debug, Clone)]
pub struct HttpTokenSource {
    client: Client,
    base_url: String,
    session_token: String,
}

impl HttpTokenSource {
    pub fn new(
        base_url: impl Into<String>,
        session_token: impl Into<String>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: session_token.into(),
        })
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch(&self, realm: Realm) -> ClientResult<String> {
        let url = format!("{}{}", self.base_url, realm.token_path());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.session_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(api_error(status, &text));
        }

        let issued: IssuedToken = response.json().await?;
        if issued.token.is_empty() {
            return Err(ClientError::InvalidResponse("empty relay token".into()));
        }
        Ok(issued.token)
    }
}

/// Map an error body to `ClientError::Api`, falling back on the status
fn api_error(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<ApiResponse<()>>(body) {
        Ok(resp) => {
            let code = resp
                .code
                .and_then(|c| ErrorCode::try_from(c).ok())
                .unwrap_or(ErrorCode::Unknown);
            ClientError::Api {
                code,
                message: resp.message,
            }
        }
        Err(_) => {
            let code = match status {
                StatusCode::UNAUTHORIZED => ErrorCode::NotAuthenticated,
                StatusCode::FORBIDDEN => ErrorCode::PermissionDenied,
                _ => ErrorCode::NetworkError,
            };
            ClientError::Api {
                code,
                message: format!("HTTP {status}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_body_is_decoded() {
        let err = api_error(
            StatusCode::FORBIDDEN,
            r#"{"code":2003,"message":"Super-admin access required"}"#,
        );
        match err {
            ClientError::Api { code, .. } => assert_eq!(code, ErrorCode::AdminRequired),
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn opaque_error_body_falls_back_to_status() {
        match api_error(StatusCode::UNAUTHORIZED, "nope") {
            ClientError::Api { code, message } => {
                assert_eq!(code, ErrorCode::NotAuthenticated);
                assert!(message.contains("401"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }
}
