//! Cross-service call handler: GET or POST against a named peer service.

use serde_json::{json, Value};

use quern_remote::{PeerServices, RemoteError};

use crate::dispatch::HandlerError;

/// Service called when the input names none.
const DEFAULT_SERVICE: &str = "web";

/// Endpoint used when the input names none.
const DEFAULT_ENDPOINT: &str = "/api/status";

/// Method used when the input names none.
const DEFAULT_METHOD: &str = "GET";

pub async fn run(input: &Value, services: &PeerServices) -> Result<Value, HandlerError> {
    let service = input
        .get("service")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SERVICE);
    let endpoint = input
        .get("endpoint")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_ENDPOINT);
    let method = input
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_METHOD);
    let payload = input.get("payload").cloned().unwrap_or_else(|| json!({}));

    match services.call(service, endpoint, method, &payload).await {
        Ok(response) => {
            serde_json::to_value(response).map_err(|e| HandlerError::Internal(e.to_string()))
        }
        Err(err @ RemoteError::UnknownService(_)) | Err(err @ RemoteError::UnsupportedMethod(_)) => {
            Err(HandlerError::Invalid(err.to_string()))
        }
        Err(RemoteError::Request(e)) => Err(HandlerError::Transport(e.to_string())),
    }
}
