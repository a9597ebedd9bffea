//! Kondukto API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations are implemented via traits on entity types.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::{KdtError, Result};

/// Fixed client identifier sent with every request.
pub const USER_AGENT: &str = concat!("kdt/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "X-Cookie";

const JSON: &str = "application/json";

/// Low-level Kondukto API client.
///
/// Handles authentication and HTTP requests. Entity-specific operations
/// are implemented via the `Get`, `List`, `Create` and `Update` traits on
/// model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use kdt::{Config, KonduktoClient};
///
/// # fn example() -> kdt::Result<()> {
/// let config = Config::new("https://kondukto.example.com", "your-token")?;
/// let client = KonduktoClient::new(&config)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KonduktoClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
}

impl std::fmt::Debug for KonduktoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KonduktoClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl KonduktoClient {
    /// Create a client from a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        if config.insecure() {
            tracing::warn!(
                host = %config.host(),
                "TLS certificate verification is disabled"
            );
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.insecure())
            .build()
            .map_err(KdtError::Network)?;

        Ok(Self {
            http,
            base_url: Arc::new(config.host().clone()),
            token: config.token().to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.request::<()>(Method::GET, path, None).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .header(ACCEPT, JSON)
            .query(query)
            .send()
            .await
            .map_err(KdtError::Network)?;

        Self::check_response(response).await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Make a PATCH request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// Make a POST request with a `multipart/form-data` body.
    #[tracing::instrument(skip(self, form))]
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .post(url)
            .header(TOKEN_HEADER, &self.token)
            .header(ACCEPT, JSON)
            .multipart(form)
            .send()
            .await
            .map_err(KdtError::Network)?;

        Self::check_response(response).await
    }

    /// Send a request with an optional JSON body.
    ///
    /// The body is encoded up front so that serialization failures surface
    /// as [`KdtError::Encoding`] rather than as transport errors.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let mut builder = self
            .http
            .request(method, url)
            .header(TOKEN_HEADER, &self.token)
            .header(ACCEPT, JSON);

        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(KdtError::Encoding)?;
            builder = builder.header(CONTENT_TYPE, JSON).body(encoded);
        }

        let response = builder.send().await.map_err(KdtError::Network)?;

        Self::check_response(response).await
    }

    /// Decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await.map_err(KdtError::Network)?;
        serde_json::from_str(&body).map_err(|e| KdtError::Decoding(e.to_string()))
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = Self::extract_error_message(response, status).await;
        tracing::debug!(status = status.as_u16(), %message, "request rejected");
        Err(KdtError::Upstream {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}
