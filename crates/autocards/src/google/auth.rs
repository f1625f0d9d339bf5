//! OAuth2 refresh-token authenticator for Google APIs.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Tokens are renewed this long before Google says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Exchanges a long-lived refresh token for short-lived access tokens.
#[derive(Debug, Clone)]
pub struct GoogleAuth {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    token_url: String,
    http_client: reqwest::Client,
    access_token: Option<AccessToken>,
}

impl GoogleAuth {
    /// Create an authenticator for the given OAuth2 client.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            http_client: reqwest::Client::new(),
            access_token: None,
        }
    }

    /// Use a different token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Return the cached access token, fetching a new one if it is missing
    /// or about to expire.
    pub async fn access_token(&mut self) -> Result<String> {
        let valid = self
            .access_token
            .as_ref()
            .filter(|t| Instant::now() + EXPIRY_MARGIN < t.expires);

        if let Some(token) = valid {
            trace!("reusing cached access token");
            return Ok(token.token.clone());
        }

        let token = self.fetch_access_token().await?;
        let value = token.token.clone();
        self.access_token = Some(token);
        Ok(value)
    }

    async fn fetch_access_token(&self) -> Result<AccessToken> {
        let body = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::GoogleAuth(format!("{}: {}", status, text)));
        }

        let TokenResponse {
            access_token,
            expires_in,
        } = serde_json::from_str(&text).map_err(|_| Error::GoogleAuth(text))?;

        debug!("new access token expires in {}s", expires_in);

        Ok(AccessToken {
            token: access_token,
            expires: Instant::now() + Duration::from_secs(expires_in),
        })
    }
}
