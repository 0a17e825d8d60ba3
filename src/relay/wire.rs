//! JSON bodies exchanged between the relay and its clients.
//!
//! Field names are camelCase and binary fields are standard base64, so
//! browser clients built on WebCrypto (`btoa` of the raw bytes) and the
//! `burnlink` CLI can share one relay.  Timestamps are Unix epoch
//! milliseconds.

use std::num::NonZeroU32;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::secret::{NewSecret, PayloadKind, SecretSnapshot};
use crate::crypto::{decode_text, encode_bytes, Sealed, NONCE_LEN};
use crate::errors::{BurnLinkError, Result};

/// `viewLimit` value meaning "no view limit".
pub const UNLIMITED_VIEWS: i64 = -1;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

pub const ERROR_NOT_FOUND: &str = "NOT_FOUND";
pub const ERROR_EXPIRED: &str = "EXPIRED";
pub const ERROR_BURNED: &str = "BURNED";
pub const ERROR_INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const ERROR_PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
pub const ERROR_INTERNAL: &str = "INTERNAL";

/// Body of every non-2xx relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Payload kind
// ---------------------------------------------------------------------------

/// The `type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKind {
    #[default]
    Text,
    File,
}

// ---------------------------------------------------------------------------
// POST /secrets
// ---------------------------------------------------------------------------

/// Request body of `POST /secrets`.
///
/// `data` and `iv` are optional at the serde level so that a missing
/// field is reported as a 400 with our own error body rather than as a
/// framework rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    pub data: Option<String>,
    pub iv: Option<String>,
    /// Minutes; absent, null or 0 means no time limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    /// `-1` (or absent) means unlimited.
    pub view_limit: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<WireKind>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl CreateSecretRequest {
    /// Build the upload body for a freshly sealed payload.
    pub fn from_sealed(
        sealed: &Sealed,
        time_limit_minutes: Option<u32>,
        max_views: Option<NonZeroU32>,
        payload: &PayloadKind,
    ) -> Self {
        let (kind, file_name, mime_type) = match payload {
            PayloadKind::Text => (WireKind::Text, None, None),
            PayloadKind::File {
                file_name,
                mime_type,
            } => (WireKind::File, file_name.clone(), mime_type.clone()),
        };

        Self {
            data: Some(encode_bytes(&sealed.ciphertext)),
            iv: Some(encode_bytes(&sealed.nonce)),
            time_limit: time_limit_minutes.map(i64::from),
            view_limit: Some(max_views.map_or(UNLIMITED_VIEWS, |n| i64::from(n.get()))),
            kind: Some(kind),
            file_name,
            mime_type,
        }
    }

    /// Validate the body and turn it into something the store accepts.
    pub fn into_new_secret(self) -> Result<NewSecret> {
        let data = required("data", self.data)?;
        let iv = required("iv", self.iv)?;

        let ciphertext = decode_text("data", &data)?;
        let nonce: [u8; NONCE_LEN] = decode_text("iv", &iv)?
            .as_slice()
            .try_into()
            .map_err(|_| {
                BurnLinkError::InvalidRequest(format!("`iv` must decode to {NONCE_LEN} bytes"))
            })?;

        let time_limit = match self.time_limit {
            None | Some(0) => None,
            Some(minutes) if minutes < 0 => {
                return Err(BurnLinkError::InvalidRequest(
                    "`timeLimit` must not be negative".into(),
                ))
            }
            Some(minutes) => Some(TimeDelta::try_minutes(minutes).ok_or_else(|| {
                BurnLinkError::InvalidRequest("`timeLimit` is out of range".into())
            })?),
        };

        let max_views = match self.view_limit {
            None | Some(UNLIMITED_VIEWS) => None,
            Some(n) => Some(
                u32::try_from(n)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| {
                        BurnLinkError::InvalidRequest(
                            "`viewLimit` must be -1 or a positive integer".into(),
                        )
                    })?,
            ),
        };

        let payload = match self.kind.unwrap_or_default() {
            WireKind::Text => PayloadKind::Text,
            WireKind::File => PayloadKind::File {
                file_name: self.file_name,
                mime_type: self.mime_type,
            },
        };

        Ok(NewSecret {
            ciphertext,
            nonce,
            time_limit,
            max_views,
            payload,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BurnLinkError::InvalidRequest(format!("missing `{field}`")))
}

/// Response body of `POST /secrets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSecretResponse {
    pub id: String,
}

// ---------------------------------------------------------------------------
// GET /secrets/:id
// ---------------------------------------------------------------------------

/// Response body of a successful `GET /secrets/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSecretResponse {
    pub data: String,
    pub iv: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub max_views: Option<u32>,
    pub current_views: u32,
    #[serde(rename = "type", default)]
    pub kind: WireKind,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl From<SecretSnapshot> for FetchSecretResponse {
    fn from(snapshot: SecretSnapshot) -> Self {
        let (kind, file_name, mime_type) = match snapshot.payload {
            PayloadKind::Text => (WireKind::Text, None, None),
            PayloadKind::File {
                file_name,
                mime_type,
            } => (WireKind::File, file_name, mime_type),
        };

        Self {
            data: encode_bytes(&snapshot.ciphertext),
            iv: encode_bytes(&snapshot.nonce),
            created_at: snapshot.created_at.timestamp_millis(),
            expires_at: snapshot.expires_at.map(|t| t.timestamp_millis()),
            max_views: snapshot.max_views.map(NonZeroU32::get),
            current_views: snapshot.current_views,
            kind,
            file_name,
            mime_type,
        }
    }
}

impl FetchSecretResponse {
    /// Payload kind and file metadata as sent by the relay.
    pub fn payload_kind(&self) -> PayloadKind {
        match self.kind {
            WireKind::Text => PayloadKind::Text,
            WireKind::File => PayloadKind::File {
                file_name: self.file_name.clone(),
                mime_type: self.mime_type.clone(),
            },
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(DateTime::from_timestamp_millis)
    }
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub secrets: usize,
    pub burned: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateSecretRequest {
        CreateSecretRequest {
            data: Some(encode_bytes(b"ciphertext-and-tag")),
            iv: Some(encode_bytes(&[9u8; NONCE_LEN])),
            time_limit: Some(10),
            view_limit: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn parses_browser_style_body() {
        let body = r#"{
            "data": "AAEC",
            "iv": "AAAAAAAAAAAAAAAA",
            "timeLimit": 60,
            "viewLimit": -1,
            "type": "file",
            "fileName": "report.pdf",
            "mimeType": "application/pdf"
        }"#;
        let req: CreateSecretRequest = serde_json::from_str(body).unwrap();
        let secret = req.into_new_secret().unwrap();
        assert_eq!(secret.ciphertext, vec![0, 1, 2]);
        assert_eq!(secret.time_limit, Some(TimeDelta::minutes(60)));
        assert_eq!(secret.max_views, None);
        assert_eq!(
            secret.payload,
            PayloadKind::File {
                file_name: Some("report.pdf".into()),
                mime_type: Some("application/pdf".into()),
            }
        );
    }

    #[test]
    fn missing_data_or_iv_is_rejected() {
        let mut req = valid_request();
        req.data = None;
        assert!(matches!(
            req.into_new_secret(),
            Err(BurnLinkError::InvalidRequest(msg)) if msg.contains("data")
        ));

        let mut req = valid_request();
        req.iv = Some(String::new());
        assert!(matches!(
            req.into_new_secret(),
            Err(BurnLinkError::InvalidRequest(msg)) if msg.contains("iv")
        ));
    }

    #[test]
    fn iv_must_be_twelve_bytes() {
        let mut req = valid_request();
        req.iv = Some(encode_bytes(&[1u8; 16]));
        assert!(req.into_new_secret().is_err());
    }

    #[test]
    fn zero_or_missing_time_limit_means_no_deadline() {
        let mut req = valid_request();
        req.time_limit = Some(0);
        assert_eq!(req.into_new_secret().unwrap().time_limit, None);

        let mut req = valid_request();
        req.time_limit = None;
        assert_eq!(req.into_new_secret().unwrap().time_limit, None);
    }

    #[test]
    fn negative_time_limit_is_rejected() {
        let mut req = valid_request();
        req.time_limit = Some(-5);
        assert!(req.into_new_secret().is_err());
    }

    #[test]
    fn view_limit_rules() {
        for (limit, ok) in [(Some(-1), true), (None, true), (Some(3), true), (Some(0), false), (Some(-2), false)] {
            let mut req = valid_request();
            req.view_limit = limit;
            assert_eq!(req.into_new_secret().is_ok(), ok, "viewLimit {limit:?}");
        }
    }

    #[test]
    fn text_secrets_drop_file_metadata() {
        let mut req = valid_request();
        req.kind = Some(WireKind::Text);
        req.file_name = Some("ignored.txt".into());
        assert_eq!(req.into_new_secret().unwrap().payload, PayloadKind::Text);
    }

    #[test]
    fn fetch_response_uses_camel_case_and_nulls() {
        let snapshot = SecretSnapshot {
            id: "abc".into(),
            ciphertext: vec![1, 2, 3].into(),
            nonce: [0; NONCE_LEN],
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            expires_at: None,
            max_views: None,
            current_views: 4,
            payload: PayloadKind::Text,
        };
        let json = serde_json::to_value(FetchSecretResponse::from(snapshot)).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
        assert!(json["expiresAt"].is_null());
        assert!(json["maxViews"].is_null());
        assert_eq!(json["currentViews"], 4);
        assert_eq!(json["type"], "text");
        assert!(json["fileName"].is_null());
    }
}
