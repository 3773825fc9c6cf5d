//! HTTP client for the storefront API.
//!
//! Provides a minimal client with injected auth (a `TokenProvider` behind a
//! Bearer header, or anonymous for guests), generic GET/POST/PATCH/DELETE
//! helpers, domain methods for products and product media, and the executors
//! that run gallery plans against the API.

pub mod api;
pub mod sync;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use vitrine_core::{ApiConfig, AppError, Result, HTTP_TIMEOUT_SECS};

/// Source of the access token sent with owner requests.
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// Current token, or `None` when the user is signed out.
    fn access_token(&self) -> Option<String>;
}

/// A fixed token, e.g. read once from the environment.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// No credentials (guest browsing)
    Anonymous,
    /// `Authorization: Bearer {token}`
    Bearer(Arc<dyn TokenProvider>),
}

impl Auth {
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(Arc::new(StaticToken::new(token)))
    }
}

/// HTTP client for the storefront API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        Self::with_timeout(base_url, auth, Duration::from_secs(HTTP_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: String, auth: Auth, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Client for the configured API. Uses Bearer auth when a token is set.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let auth = match &config.access_token {
            Some(token) => Auth::bearer(token.clone()),
            None => Auth::Anonymous,
        };
        Self::with_timeout(
            config.base_url.clone(),
            auth,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Anonymous => request,
            Auth::Bearer(provider) => match provider.access_token() {
                Some(token) => request.header("Authorization", format!("Bearer {}", token)),
                None => request,
            },
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(status = status.as_u16(), body = %error_text, "API request failed");
            return Err(AppError::remote(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| AppError::Http(format!("Failed to parse response as JSON: {}", e)))
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        Self::parse(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.send(request).await?;
        Self::parse(response).await
    }

    /// PATCH a JSON body. The response body is ignored.
    pub async fn patch_json<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let request = self.client.patch(self.build_url(path)).json(body);
        self.send(request).await?;
        Ok(())
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.build_url(path));
        self.send(request).await?;
        Ok(())
    }
}

pub use api::ProductListResponse;
pub use sync::{delete_persisted_media, execute_submit, submit_gallery, SubmitReport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matches_default_config() {
        let client = ApiClient::new("http://localhost:8000/api/".to_string(), Auth::Anonymous).unwrap();
        let configured = ApiClient::from_config(&ApiConfig::default()).unwrap();

        assert_eq!(client.base_url(), configured.base_url());
        assert_eq!(client.build_url("/shops/"), "http://localhost:8000/api/shops/");
    }
}
