//! HTTP client for backend requests.
//!
//! Thin wrapper over `reqwest` handling the base URL, bearer authentication
//! and the conversion of responses into typed data or `ApiError`.

use super::ApiError;
use log::*;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

/// Makes requests to the backend and tries to conform response data to the
/// given type.
///
pub struct Client {
    pub(crate) access_token: Option<String>,
    pub(crate) base_url: Url,
    pub(crate) http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given base URL and optional token.
    ///
    pub fn new(base_url: &str, access_token: Option<&str>) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_owned()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        // Url::join only appends to paths ending in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Client {
            access_token: access_token.map(str::to_owned),
            base_url,
            http_client: reqwest::Client::builder().build()?,
        })
    }

    /// Returns the absolute URL for a path relative to the base URL.
    ///
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Other(format!("Invalid endpoint '{}': {}", path, e)))
    }

    /// Start a request, attaching the bearer token when one is configured.
    ///
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        let request = self.http_client.request(method, url);
        Ok(match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// Send the request and return the response, or the status as an error.
    ///
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Unable to read response"));
            error!("API request failed with status {}: {}", status, message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Send the request and deserialize the response body.
    ///
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let bytes = self.send(request).await?.bytes().await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            error!(
                "Failed to deserialize API response: {}. Response body: {}",
                e,
                String::from_utf8_lossy(&bytes)
            );
            ApiError::Deserialization(e)
        })
    }
}
