use std::fmt;

use serde::Deserialize;

use crate::error::Error;

/// Token endpoint used when the key does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Service account key as downloaded from the Google Cloud console
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse and validate a JSON key. Does not contact any server.
    pub fn from_slice(json_key: &[u8]) -> Result<Self, Error> {
        let key: ServiceAccountKey = serde_json::from_slice(json_key)
            .map_err(|e| Error::CredentialParse(e.to_string()))?;

        if key.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(Error::UnsupportedCredentialType(key.key_type));
        }
        if key.client_email.trim().is_empty() {
            return Err(Error::CredentialParse("client_email is empty".to_string()));
        }
        if key.private_key.trim().is_empty() {
            return Err(Error::CredentialParse("private_key is empty".to_string()));
        }
        if key.token_uri.trim().is_empty() {
            return Err(Error::CredentialParse("token_uri is empty".to_string()));
        }

        Ok(key)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}
