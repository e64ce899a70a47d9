use http::StatusCode;
use serde::Serialize;
use std::{
    error::Error as StdError,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
};
use strum::AsRefStr;
use thiserror::Error as ThisError;

pub trait ErrorMeta {
    fn code(&self) -> ErrorCode;
    fn key(&self) -> ErrorKey;
    fn message(&self) -> ErrorMessage;
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct ErrorKey(String);

impl ErrorKey {
    pub fn extraction(key: &str, subtype: Option<&str>) -> Self {
        match subtype {
            Some(subtype) => ErrorKey(format!("err::extraction::{key}::{subtype}")),
            None => ErrorKey(format!("err::extraction::{key}")),
        }
    }
}

impl Display for ErrorKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct ErrorMessage(String);

impl AsRef<str> for ErrorMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Every failure the extractor can surface to its host. Nothing is retried
/// or swallowed internally; the host decides whether to abort or skip.
#[derive(ThisError, Clone, Hash, Eq, PartialEq, Serialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "PascalCase")]
pub enum ExtractionError {
    #[error("Configuration error: {}", .message)]
    ConfigurationError {
        message: String,
        subtype: Option<String>,
    },
    #[error("Authentication failed with status {}: {}", .status, .body)]
    AuthenticationError {
        status: u16,
        body: String,
        subtype: Option<String>,
    },
    #[error("A network error occurred: {}", .message)]
    TransientNetworkError {
        message: String,
        subtype: Option<String>,
    },
    #[error("Upstream API responded with status {}: {}", .status, .body)]
    UpstreamApiError {
        status: u16,
        body: String,
        subtype: Option<String>,
    },
    #[error("Failed to decode response: {}", .message)]
    DecodeError {
        message: String,
        subtype: Option<String>,
    },
}

impl ExtractionError {
    pub fn configuration_error(message: &str, subtype: Option<&str>) -> Self {
        ExtractionError::ConfigurationError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        }
    }

    pub fn authentication_error(status: StatusCode, body: &str, subtype: Option<&str>) -> Self {
        ExtractionError::AuthenticationError {
            status: status.as_u16(),
            body: body.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        }
    }

    pub fn transient_network_error(message: &str, subtype: Option<&str>) -> Self {
        ExtractionError::TransientNetworkError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        }
    }

    pub fn upstream_api_error(status: StatusCode, body: &str, subtype: Option<&str>) -> Self {
        ExtractionError::UpstreamApiError {
            status: status.as_u16(),
            body: body.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        }
    }

    pub fn decode_error(message: &str, subtype: Option<&str>) -> Self {
        ExtractionError::DecodeError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string()),
        }
    }

    /// HTTP status reported by the remote side, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtractionError::AuthenticationError { status, .. }
            | ExtractionError::UpstreamApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether re-running the extraction could plausibly succeed without any
    /// change to configuration or credentials.
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractionError::TransientNetworkError { .. } => true,
            ExtractionError::UpstreamApiError { status, .. } => {
                StatusCode::from_u16(*status).is_ok_and(|s| {
                    s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS
                })
            }
            _ => false,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ExtractionError::ConfigurationError { .. })
    }

    pub fn as_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.as_ref(),
            "code": self.code().as_u16(),
            "key": self.key().to_string(),
            "message": self.message().to_string(),
            "status": self.status(),
        })
    }
}

impl ErrorMeta for ExtractionError {
    fn code(&self) -> ErrorCode {
        match self {
            ExtractionError::ConfigurationError { .. } => ErrorCode(3000),
            ExtractionError::AuthenticationError { .. } => ErrorCode(3001),
            ExtractionError::TransientNetworkError { .. } => ErrorCode(3002),
            ExtractionError::UpstreamApiError { .. } => ErrorCode(3003),
            ExtractionError::DecodeError { .. } => ErrorCode(3004),
        }
    }

    fn key(&self) -> ErrorKey {
        match self {
            ExtractionError::ConfigurationError { subtype, .. } => {
                ErrorKey::extraction("configuration_error", subtype.as_deref())
            }
            ExtractionError::AuthenticationError { subtype, .. } => {
                ErrorKey::extraction("authentication_error", subtype.as_deref())
            }
            ExtractionError::TransientNetworkError { subtype, .. } => {
                ErrorKey::extraction("transient_network_error", subtype.as_deref())
            }
            ExtractionError::UpstreamApiError { subtype, .. } => {
                ErrorKey::extraction("upstream_api_error", subtype.as_deref())
            }
            ExtractionError::DecodeError { subtype, .. } => {
                ErrorKey::extraction("decode_error", subtype.as_deref())
            }
        }
    }

    fn message(&self) -> ErrorMessage {
        match self {
            ExtractionError::ConfigurationError { message, .. }
            | ExtractionError::TransientNetworkError { message, .. }
            | ExtractionError::DecodeError { message, .. } => ErrorMessage(message.to_string()),
            ExtractionError::AuthenticationError { status, body, .. }
            | ExtractionError::UpstreamApiError { status, body, .. } => {
                ErrorMessage(format!("Response Status: {status}, Body: {body}"))
            }
        }
    }
}

impl Debug for ExtractionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}\n", &self)?;
        let mut current = self.source();

        while let Some(cause) = current {
            writeln!(f, "Caused by:\n\t{}", cause)?;
            current = cause.source();
        }

        Ok(())
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractionError::transient_network_error(&err.to_string(), Some("timeout"))
        } else if err.is_connect() {
            ExtractionError::transient_network_error(&err.to_string(), Some("connect"))
        } else if err.is_decode() {
            ExtractionError::decode_error(&err.to_string(), Some("body"))
        } else if err.is_builder() {
            ExtractionError::configuration_error(&err.to_string(), Some("http_client"))
        } else {
            ExtractionError::transient_network_error(&err.to_string(), Some("request"))
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::decode_error(&err.to_string(), Some("json"))
    }
}
