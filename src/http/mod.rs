//! Uniform request execution.
//!
//! Every call resolves to either the decoded body or an [`HttpError`]. Transport
//! failures, non-2xx statuses and undecodable bodies all take the same shape, so
//! callers branch once instead of matching on causes.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;

const DEFAULT_STATUS_TEXT: &str = "An error occurred";

/// The normalized failure every request collapses into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("request failed ({status}): {status_text}")]
pub struct HttpError {
    pub err: bool,
    /// `0` when the request never produced a response.
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
}

impl HttpError {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        let status_text = status_text.into();
        Self {
            err: true,
            status,
            status_text: if status_text.is_empty() {
                DEFAULT_STATUS_TEXT.to_string()
            } else {
                status_text
            },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn message(&self) -> &str {
        &self.status_text
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn json(body: Value) -> Self {
        Self {
            body: Some(body),
            headers: HeaderMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpHelper {
    client: Client,
    default_headers: HeaderMap,
}

impl HttpHelper {
    pub fn new(config: &ApiConfig) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::from_client(builder.build()?))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            default_headers: HeaderMap::new(),
        }
    }

    /// Send `Authorization: Bearer <token>` on every request from this helper.
    /// A token that is not a valid header value is ignored.
    pub fn with_bearer(mut self, token: &str) -> Self {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.default_headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Bearer token is not a valid header value; sending without it"),
        }
        self
    }

    pub async fn get(&self, url: &Url, options: RequestOptions) -> Result<Value, HttpError> {
        self.request(Method::GET, url, options).await
    }

    pub async fn post(&self, url: &Url, options: RequestOptions) -> Result<Value, HttpError> {
        self.request(Method::POST, url, options).await
    }

    pub async fn put(&self, url: &Url, options: RequestOptions) -> Result<Value, HttpError> {
        self.request(Method::PUT, url, options).await
    }

    pub async fn del(&self, url: &Url, options: RequestOptions) -> Result<Value, HttpError> {
        self.request(Method::DELETE, url, options).await
    }

    pub async fn request(&self, method: Method, url: &Url, options: RequestOptions) -> Result<Value, HttpError> {
        tracing::debug!("{} {}", method, url);

        let mut headers = self.default_headers.clone();
        headers.extend(options.headers);

        let mut builder = self.client.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed before a response: {}", method, url, e);
            HttpError::transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} {} returned {}", method, url, status);
            return Err(HttpError::new(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!("{} {} body could not be read: {}", method, url, e);
            HttpError::new(status.as_u16(), e.to_string())
        })?;

        Ok(decode_body(&bytes))
    }
}

/// Empty bodies decode to `null`; bodies that are not JSON come back as raw text.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Append one path segment to `base`, keeping any path the base already has.
pub fn join_segment(base: &Url, segment: &str) -> Result<Url, HttpError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| HttpError::transport(format!("'{}' cannot be a base url", base)))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}
