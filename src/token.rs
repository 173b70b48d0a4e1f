use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;

use crate::config::{Credentials, DEFAULT_URL};
use crate::envelope::{ResponseKind, load};
use crate::error::Error;

/// Exchanges client credentials for a bearer token
/// (OAuth2 `client_credentials` grant).
#[derive(Debug, Clone)]
pub struct TokenProvider {
    url_root: String,
    http: HttpClient,
}

impl TokenProvider {
    pub fn new(url_root: impl Into<String>) -> Self {
        Self::with_client(HttpClient::new(), url_root)
    }

    /// Reuses an existing HTTP client.
    pub fn with_client(http: HttpClient, url_root: impl Into<String>) -> Self {
        Self {
            url_root: url_root.into(),
            http,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.url_root.trim_end_matches('/'))
    }

    /// Requests a fresh access token. Nothing is cached.
    pub fn get_access_token(&self, credentials: &Credentials) -> Result<String> {
        let url = self.token_url();
        tracing::debug!(url = %url, client_id = %credentials.client_id, "requesting access token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];
        let resp = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .with_context(|| format!("token request to {} failed", url))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .with_context(|| format!("failed to read token response (status={})", status))?;

        let token = load(&body, ResponseKind::AccessToken)?;
        match token {
            serde_json::Value::String(token) => {
                tracing::debug!(%status, "access token obtained");
                Ok(token)
            }
            other => Err(Error::Schema(format!("`access_token` is not a string: {}", other)).into()),
        }
    }
}

/// Fetches a token from the production Petfinder endpoint.
pub fn get_access_token(client_id: &str, client_secret: &str) -> Result<String> {
    TokenProvider::new(DEFAULT_URL).get_access_token(&Credentials::new(client_id, client_secret))
}
