//! Signed bearer tokens for the delivery partner.
//!
//! Tokens are HS256 JWTs carrying the partner's `dd-ver` header. The signing
//! secret is distributed base64url-encoded and is decoded before use as the
//! HMAC key. A token lives five minutes; [`TokenCache`] reuses it until
//! fifteen seconds before expiry.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tokio::sync::Mutex;

use crate::interfaces::delivery_client::{DeliveryError, Result};

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 300;
/// A cached token is replaced this many seconds before it expires.
pub const REFRESH_MARGIN_SECS: i64 = 15;

const AUDIENCE: &str = "doordash";
const TOKEN_VERSION: &str = "DD-JWT-V1";

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
    #[serde(rename = "dd-ver")]
    dd_ver: &'static str,
}

#[derive(Serialize)]
struct Claims<'a> {
    aud: &'static str,
    iss: &'a str,
    kid: &'a str,
    exp: i64,
    iat: i64,
}

/// A signed token and its expiry (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: i64,
}

/// Signs tokens with the developer credentials.
pub struct JwtSigner {
    developer_id: String,
    key_id: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("developer_id", &self.developer_id)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl JwtSigner {
    /// Create a signer. `signing_secret` is base64url, padding optional.
    pub fn new(developer_id: &str, key_id: &str, signing_secret: &str) -> Result<Self> {
        let key = URL_SAFE_NO_PAD
            .decode(signing_secret.trim().trim_end_matches('='))
            .map_err(|e| DeliveryError::Signing(format!("signing secret is not base64url: {e}")))?;

        if key.is_empty() {
            return Err(DeliveryError::Signing("signing secret is empty".to_string()));
        }

        Ok(Self {
            developer_id: developer_id.to_string(),
            key_id: key_id.to_string(),
            key,
        })
    }

    /// Sign a token issued at `issued_at` (unix seconds).
    pub fn sign(&self, issued_at: i64) -> Result<SignedToken> {
        let expires_at = issued_at + TOKEN_TTL_SECS;

        let header = Header {
            alg: "HS256",
            typ: "JWT",
            dd_ver: TOKEN_VERSION,
        };
        let claims = Claims {
            aud: AUDIENCE,
            iss: &self.developer_id,
            kid: &self.key_id,
            exp: expires_at,
            iat: issued_at,
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let signature = self.mac(signing_input.as_bytes())?;

        Ok(SignedToken {
            token: format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)),
            expires_at,
        })
    }

    fn mac(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| DeliveryError::Signing(e.to_string()))?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| DeliveryError::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Caches the current token and re-signs shortly before expiry.
#[derive(Debug)]
pub struct TokenCache {
    signer: JwtSigner,
    current: Mutex<Option<SignedToken>>,
}

impl TokenCache {
    pub fn new(signer: JwtSigner) -> Self {
        Self {
            signer,
            current: Mutex::new(None),
        }
    }

    /// Current token, signing a new one if needed.
    pub async fn bearer(&self) -> Result<String> {
        self.bearer_at(chrono::Utc::now().timestamp()).await
    }

    /// Current token as of `now` (unix seconds).
    pub async fn bearer_at(&self, now: i64) -> Result<String> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if now < token.expires_at - REFRESH_MARGIN_SECS {
                return Ok(token.token.clone());
            }
        }

        let token = self.signer.sign(now)?;
        let bearer = token.token.clone();
        *current = Some(token);
        Ok(bearer)
    }
}
