use crate::domain::ApiResponse;
use crate::storage::Storage;
use log::{debug, warn};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub mod errors;

pub use errors::ApiError;

/// Shared HTTP client for the storefront backend.
///
/// Attaches the stored bearer token to every request and drops the token
/// when the server answers 401.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    storage: Storage,
}

// ==================================================
// CONSTRUCTOR
// ==================================================
impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, storage: Storage) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;

        // Url::join drops the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            storage,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ==================================================
    // ENVELOPE HELPERS
    // ==================================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::DELETE, path, &[], None).await
    }

    // ==================================================
    // RAW REQUEST
    // ==================================================

    /// Sends one request and decodes the body as `T`. Callers that need to
    /// inspect the payload shape themselves ask for `serde_json::Value`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("➡️  {} {}", method, url);

        let mut request = self.client.request(method, url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.storage.get_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("🔒 401 from server, clearing stored token");
            if let Err(e) = self.storage.clear_token().await {
                warn!("Failed to clear token: {}", e);
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: server_message(&text),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("request body: {}", e)))
}

/// Pulls `message` out of an error envelope, falling back to the raw text.
fn server_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| text.trim().to_string())
}
