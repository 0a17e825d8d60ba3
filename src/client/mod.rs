//! Blocking relay client used by `send` and `open`.
//!
//! The client only ever talks to `/secrets` and `/secrets/<id>`; it has
//! no way to send a key, because no request type carries one.

pub mod share;

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::http::Response;
use ureq::{Agent, Body};
use url::Url;

use crate::errors::{BurnLinkError, Result};
use crate::relay::wire::{
    CreateSecretRequest, CreateSecretResponse, ErrorBody, FetchSecretResponse, HealthResponse,
    ERROR_EXPIRED,
};

pub use share::{open, send, OpenedSecret, Payload, SendOptions, MAX_PAYLOAD_BYTES};

/// Default timeout for a whole request, upload included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest response body the client will read.
const MAX_RESPONSE_BYTES: u64 = 32 * 1024 * 1024;

/// A handle to one relay.
#[derive(Clone)]
pub struct RelayClient {
    agent: Agent,
    base: Url,
}

impl fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl RelayClient {
    /// Client for the relay at `relay_url`, with the default timeout.
    pub fn new(relay_url: &str) -> Result<Self> {
        Self::with_timeout(relay_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(relay_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(relay_url.trim())
            .map_err(|e| BurnLinkError::ConfigError(format!("invalid relay URL '{relay_url}': {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(BurnLinkError::ConfigError(format!(
                "invalid relay URL '{relay_url}': expected http(s)"
            )));
        }
        // Treat the relay URL as a directory so `join` keeps its path.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();

        Ok(Self { agent, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Upload a sealed secret; returns the id the relay assigned.
    pub fn create(&self, request: &CreateSecretRequest) -> Result<String> {
        let url = self.endpoint("secrets")?;
        debug!(url = %url, "uploading secret");

        let response = self
            .agent
            .post(url.as_str())
            .header("User-Agent", user_agent())
            .send_json(request)
            .map_err(transport_error)?;

        let created: CreateSecretResponse = read_success(response)?;
        Ok(created.id)
    }

    /// Fetch one view of a secret.  Each call consumes a view.
    pub fn fetch(&self, id: &str) -> Result<FetchSecretResponse> {
        let url = self.secret_url(id)?;
        debug!(url = %url, "fetching secret");

        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", user_agent())
            .call()
            .map_err(transport_error)?;

        read_success(response)
    }

    /// Query `/health`.
    pub fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint("health")?;
        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", user_agent())
            .call()
            .map_err(transport_error)?;

        read_success(response)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| BurnLinkError::ConfigError(format!("invalid relay URL: {e}")))
    }

    /// `<base>/secrets/<id>`, with `id` percent-encoded as one segment.
    fn secret_url(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint("secrets/")?;
        url.path_segments_mut()
            .map_err(|_| BurnLinkError::ConfigError("relay URL cannot be a base".into()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}

fn user_agent() -> String {
    format!("burnlink/{}", env!("CARGO_PKG_VERSION"))
}

fn transport_error(err: ureq::Error) -> BurnLinkError {
    BurnLinkError::Relay(err.to_string())
}

/// Decode a 2xx JSON body, or map an error body back to a typed error.
fn read_success<T: DeserializeOwned>(mut response: Response<Body>) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_json()
            .map_err(|e| BurnLinkError::UnexpectedResponse(format!("invalid JSON body: {e}")));
    }

    let body: Option<ErrorBody> = response
        .body_mut()
        .with_config()
        .limit(MAX_RESPONSE_BYTES)
        .read_json()
        .ok();
    Err(status_error(status.as_u16(), body))
}

/// Map a relay error status and body to the matching error.
fn status_error(status: u16, body: Option<ErrorBody>) -> BurnLinkError {
    match status {
        404 => BurnLinkError::NotFound,
        410 if body.as_ref().is_some_and(|b| b.error == ERROR_EXPIRED) => BurnLinkError::Expired,
        410 => BurnLinkError::Burned,
        413 => BurnLinkError::PayloadTooLarge("the relay rejected the upload".into()),
        400 => BurnLinkError::InvalidRequest(
            body.and_then(|b| b.message.or(Some(b.error)))
                .unwrap_or_else(|| "rejected by relay".into()),
        ),
        _ => BurnLinkError::UnexpectedResponse(match body {
            Some(b) => format!("HTTP {status} {}", b.error),
            None => format!("HTTP {status}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(code: &str) -> Option<ErrorBody> {
        Some(ErrorBody {
            error: code.into(),
            message: None,
        })
    }

    #[test]
    fn relay_url_path_is_kept() {
        let client = RelayClient::new("https://example.com/relay").unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.com/relay/");
        assert_eq!(
            client.secret_url("abc").unwrap().as_str(),
            "https://example.com/relay/secrets/abc"
        );
        assert_eq!(
            client.endpoint("secrets").unwrap().as_str(),
            "https://example.com/relay/secrets"
        );
    }

    #[test]
    fn secret_id_is_encoded_as_one_segment() {
        let client = RelayClient::new("http://localhost:3001").unwrap();
        assert_eq!(
            client.secret_url("a/b?c").unwrap().as_str(),
            "http://localhost:3001/secrets/a%2Fb%3Fc"
        );
    }

    #[test]
    fn rejects_non_http_relay() {
        assert!(matches!(
            RelayClient::new("ftp://example.com"),
            Err(BurnLinkError::ConfigError(_))
        ));
        assert!(RelayClient::new("not a url").is_err());
    }

    #[test]
    fn error_statuses_map_to_terminal_errors() {
        assert!(matches!(status_error(404, body("NOT_FOUND")), BurnLinkError::NotFound));
        assert!(matches!(status_error(410, body("EXPIRED")), BurnLinkError::Expired));
        assert!(matches!(status_error(410, body("BURNED")), BurnLinkError::Burned));
        assert!(matches!(status_error(410, None), BurnLinkError::Burned));
        assert!(matches!(
            status_error(413, None),
            BurnLinkError::PayloadTooLarge(_)
        ));
        assert!(matches!(
            status_error(500, body("INTERNAL")),
            BurnLinkError::UnexpectedResponse(msg) if msg.contains("500")
        ));
    }

    #[test]
    fn bad_request_carries_relay_message() {
        let err = status_error(
            400,
            Some(ErrorBody {
                error: "INVALID_REQUEST".into(),
                message: Some("missing `iv`".into()),
            }),
        );
        assert!(matches!(err, BurnLinkError::InvalidRequest(msg) if msg == "missing `iv`"));
    }
}
