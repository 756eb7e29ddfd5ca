//! REST client for the named peer services.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

/// Fixed timeout applied to every outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Name of the web peer service, the default call target.
pub const WEB_SERVICE: &str = "web";

/// Name of the data peer service.
pub const DATA_SERVICE: &str = "data";

/// Errors from the cross-service call layer.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The service name maps to no configured base URL.
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// Only GET and POST are supported.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The HTTP request itself failed (timeout, refused connection, DNS,
    /// body decode).
    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

/// Decoded response body: structured when the peer declared JSON,
/// raw text otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Outcome of one cross-service call.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse {
    pub service: String,
    pub endpoint: String,
    pub status_code: u16,
    pub response: ResponseBody,
}

/// HTTP client for the two configured peer services.
pub struct PeerServices {
    client: reqwest::Client,
    web_url: String,
    data_url: String,
}

impl PeerServices {
    /// Build the client with [`REQUEST_TIMEOUT`] baked in.
    ///
    /// * `web_url`  - base URL of the web service, e.g. `http://host:3000`.
    /// * `data_url` - base URL of the data service, e.g. `http://host:8080`.
    pub fn new(web_url: String, data_url: String) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            web_url,
            data_url,
        })
    }

    /// Base URL for a named service.
    fn resolve(&self, service: &str) -> Result<&str, RemoteError> {
        match service {
            WEB_SERVICE => Ok(&self.web_url),
            DATA_SERVICE => Ok(&self.data_url),
            other => Err(RemoteError::UnknownService(other.to_string())),
        }
    }

    /// Issue a GET or POST against `service` + `endpoint`.
    ///
    /// POST requests carry `payload` as a JSON body. The response body is
    /// decoded as JSON when the peer's `Content-Type` says so, raw text
    /// otherwise.
    pub async fn call(
        &self,
        service: &str,
        endpoint: &str,
        method: &str,
        payload: &Value,
    ) -> Result<ServiceResponse, RemoteError> {
        let base = self.resolve(service)?;
        let url = format!("{base}{endpoint}");

        tracing::info!(service, %url, method, "Cross-service request");

        let response = match method.to_ascii_uppercase().as_str() {
            "GET" => self.client.get(&url).send().await?,
            "POST" => self.client.post(&url).json(payload).send().await?,
            other => return Err(RemoteError::UnsupportedMethod(other.to_string())),
        };

        let status_code = response.status().as_u16();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("application/json"))
            .unwrap_or(false);

        let body = if is_json {
            ResponseBody::Json(response.json().await?)
        } else {
            ResponseBody::Text(response.text().await?)
        };

        Ok(ServiceResponse {
            service: service.to_string(),
            endpoint: endpoint.to_string(),
            status_code,
            response: body,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
