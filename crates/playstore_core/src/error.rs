use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// OAuth2 token endpoint failure, decoded from the `error` field of the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    InvalidGrant(String),
    InvalidClient(String),
    UnauthorizedClient(String),
    InvalidScope(String),
    /// Non-2xx response that did not carry an OAuth2 error document
    Http { status: u16, body: String },
    Unknown(String),
}

impl TokenError {
    /// Map an OAuth2 `error` code and optional description to a typed error
    pub fn from_oauth_code(code: &str, description: Option<&str>) -> Self {
        let detail = description.unwrap_or(code).to_string();
        match code {
            "invalid_grant" => Self::InvalidGrant(detail),
            "invalid_client" => Self::InvalidClient(detail),
            "unauthorized_client" => Self::UnauthorizedClient(detail),
            "invalid_scope" => Self::InvalidScope(detail),
            _ => Self::Unknown(format!("{}: {}", code, detail)),
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGrant(msg) => write!(f, "invalid grant: {}", msg),
            Self::InvalidClient(msg) => write!(f, "invalid client: {}", msg),
            Self::UnauthorizedClient(msg) => write!(f, "unauthorized client: {}", msg),
            Self::InvalidScope(msg) => write!(f, "invalid scope: {}", msg),
            Self::Http { status, body } => {
                write!(f, "token endpoint returned {}: {}", status, body)
            }
            Self::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

/// One entry of the `errors` array in a Google API error envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct ApiErrorItem {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub domain: String,
}

/// Error returned by the Android Publisher API for a non-2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub code: u16,
    pub message: String,
    /// Canonical status name, e.g. `NOT_FOUND`
    pub status: Option<String>,
    pub errors: Vec<ApiErrorItem>,
    /// Raw response body
    pub body: String,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

impl ApiError {
    /// Decode a Google JSON error envelope. Bodies that are not an envelope
    /// are kept verbatim as the message.
    pub fn from_response(code: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorEnvelope>(body) {
            Ok(envelope) => Self {
                code,
                message: envelope.error.message,
                status: envelope.error.status,
                errors: envelope.error.errors,
                body: body.to_string(),
            },
            Err(_) => Self {
                code,
                message: body.trim().to_string(),
                status: None,
                errors: Vec::new(),
                body: body.to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == 404
    }

    /// First `reason` from the errors array, e.g. `purchaseTokenDoesNotMatchPackageName`
    pub fn reason(&self) -> Option<&str> {
        self.errors
            .iter()
            .map(|e| e.reason.as_str())
            .find(|r| !r.is_empty())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, self.reason()) {
            (Some(status), Some(reason)) => {
                write!(f, "{} {}: {} ({})", self.code, status, self.message, reason)
            }
            (Some(status), None) => write!(f, "{} {}: {}", self.code, status, self.message),
            (None, _) => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid service account key: {0}")]
    CredentialParse(String),

    #[error("unsupported credential type {0:?}, expected \"service_account\"")]
    UnsupportedCredentialType(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token request failed: {0}")]
    Token(TokenError),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {0}")]
    Api(ApiError),

    #[error("invalid response from server: {0}")]
    InvalidServerResponse(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors caused by the caller's context rather than the remote side
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
