use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Storage-layer error. Status-bearing so callers can distinguish a
/// uniqueness conflict from a transient connection failure.
#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid header value")]
    InvalidHeader,
}

impl SupabaseError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SupabaseError::Api { status, .. } if *status == StatusCode::CONFLICT)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SupabaseError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// Connection-level failures are safe to retry with backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            SupabaseError::Network(e) => e.is_timeout() || e.is_connect(),
            SupabaseError::Api { status, .. } => {
                *status == StatusCode::SERVICE_UNAVAILABLE || *status == StatusCode::GATEWAY_TIMEOUT
            }
            _ => false,
        }
    }
}

pub type DbResult<T> = Result<T, SupabaseError>;

/// PostgREST access handle. Constructed from config and passed explicitly
/// into the services that need it; tests point `supabase_url` at a mock
/// server instead of a live instance.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> DbResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key).map_err(|_| SupabaseError::InvalidHeader)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| SupabaseError::InvalidHeader)?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> DbResult<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> DbResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(SupabaseError::Api {
                status,
                message: error_text,
            });
        }

        // PostgREST answers DELETE/minimal-preference requests with an empty
        // body, which only deserializes into unit-like targets.
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            let data = serde_json::from_slice::<T>(b"null")?;
            return Ok(data);
        }

        let data = serde_json::from_slice::<T>(&bytes)?;
        Ok(data)
    }

    /// Call a Postgres function through PostgREST. The function body runs in
    /// a single transaction, which is how multi-table writes stay atomic.
    pub async fn rpc<T>(&self, function: &str, auth_token: Option<&str>, args: Value) -> DbResult<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, auth_token, Some(args))
            .await
    }
}
