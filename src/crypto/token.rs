use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Claims asserted by a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
}

/// Issues and verifies stateless session tokens.
///
/// A token is `base64url(claims JSON) "." base64url(HMAC-SHA256 tag)`, signed
/// with a process-wide secret supplied at construction time. Nothing is
/// persisted; a token is trusted by signature alone. No expiry claim is
/// embedded.
#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Crypto(format!("Invalid signing key: {}", e)))
    }

    /// Issue a signed token asserting `username`.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        let claims = Claims {
            sub: username.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| AppError::Internal(format!("Failed to encode claims: {}", e)))?;
        let payload = base64_simd::URL_SAFE_NO_PAD.encode_to_string(&payload);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let tag = mac.finalize().into_bytes();
        let tag = base64_simd::URL_SAFE_NO_PAD.encode_to_string(tag.as_slice());

        Ok(format!("{}.{}", payload, tag))
    }

    /// Verify a token's signature and recover the asserted username.
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let (payload, tag) = token
            .split_once('.')
            .ok_or_else(|| AppError::Unauthorized("Malformed session token".to_string()))?;

        let tag = base64_simd::URL_SAFE_NO_PAD
            .decode_to_vec(tag)
            .map_err(|_| AppError::Unauthorized("Malformed session token".to_string()))?;

        // Constant-time tag check before the payload is trusted at all
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| AppError::Unauthorized("Invalid token signature".to_string()))?;

        let claims = base64_simd::URL_SAFE_NO_PAD
            .decode_to_vec(payload)
            .map_err(|_| AppError::Unauthorized("Malformed session token".to_string()))?;
        let claims: Claims = serde_json::from_slice(&claims)
            .map_err(|_| AppError::Unauthorized("Malformed session token".to_string()))?;

        Ok(claims.sub)
    }
}
