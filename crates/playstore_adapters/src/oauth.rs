use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use playstore_core::entities::AccessToken;
use playstore_core::error::TokenError;
use playstore_core::ports::TokenSource;
use playstore_core::{Error, ServiceAccountKey};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// OAuth2 scope for the Google Play Developer API
pub const ANDROID_PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion
const ASSERTION_LIFETIME: Duration = Duration::from_secs(3600);

/// Tokens this close to expiry are treated as expired
pub const EXPIRY_SKEW: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Exchanges a signed service account assertion for bearer tokens
/// (RFC 7523 JWT-bearer grant) and reuses each token until it nears expiry.
pub struct ServiceAccountTokenSource {
    client: Client,
    client_email: String,
    token_uri: String,
    private_key_id: Option<String>,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    cached: Mutex<Option<AccessToken>>,
}

impl fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("scopes", &self.scopes)
            .field("encoding_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccountTokenSource {
    /// Prepare a token source. The private key is decoded here so a broken
    /// key fails before any request is made.
    pub fn new<S: AsRef<str>>(
        key: &ServiceAccountKey,
        scopes: &[S],
        client: Client,
    ) -> Result<Self, Error> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;

        Ok(Self {
            client,
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            private_key_id: key.private_key_id.clone(),
            encoding_key,
            scopes: scopes.iter().map(|s| s.as_ref().to_string()).collect(),
            cached: Mutex::new(None),
        })
    }

    fn sign_assertion(&self) -> Result<String, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Other(format!("system clock before unix epoch: {}", e)))?
            .as_secs();

        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME.as_secs(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| Error::InvalidPrivateKey(format!("failed to sign assertion: {}", e)))
    }

    #[instrument(
        skip(self),
        fields(token_uri = %self.token_uri, client_email = %self.client_email)
    )]
    async fn fetch_token(&self) -> Result<AccessToken, Error> {
        let assertion = self.sign_assertion()?;
        let form = [
            ("grant_type", JWT_BEARER_GRANT_TYPE),
            ("assertion", assertion.as_str()),
        ];

        debug!("requesting access token");

        let response = self
            .client
            .post(&self.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Network(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read token response: {}", e)))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "token endpoint rejected assertion");
            return Err(Error::Token(parse_token_error(status.as_u16(), &body)));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            Error::InvalidServerResponse(format!("malformed token response: {}", e))
        })?;

        if parsed.access_token.is_empty() {
            return Err(Error::InvalidServerResponse(
                "token response has empty access_token".to_string(),
            ));
        }

        debug!(expires_in = ?parsed.expires_in, "obtained access token");

        Ok(AccessToken::new(
            parsed.access_token,
            parsed.token_type,
            parsed.expires_in.map(Duration::from_secs),
        ))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn token(&self) -> Result<AccessToken, Error> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired(EXPIRY_SKEW) {
                return Ok(token.clone());
            }
        }

        let token = self.fetch_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Decode an OAuth2 error document, falling back to the raw body
fn parse_token_error(status: u16, body: &str) -> TokenError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => TokenError::from_oauth_code(&err.error, err.error_description.as_deref()),
        Err(_) => TokenError::Http {
            status,
            body: body.trim().to_string(),
        },
    }
}
