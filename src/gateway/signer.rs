//! Request signing
//!
//! The gateway authenticates a request by recomputing HMAC-SHA256 over the
//! raw body with the shared secret and comparing it with the `HMAC` header
//! (lowercase hex).

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Signs request bodies with a shared secret
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    pub fn new(secret: &str) -> Result<Self, GatewayError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| GatewayError::Config(format!("invalid HMAC key: {e}")))?;
        Ok(Self { mac })
    }

    /// Lowercase hex HMAC-SHA256 of `body`
    pub fn sign(&self, body: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a hex signature against `body`
    pub fn verify(&self, body: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(body.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Signer { .. }")
    }
}

/// One-shot signature of `body` with `secret`
pub fn sign(secret: &str, body: &str) -> Result<String, GatewayError> {
    Ok(Signer::new(secret)?.sign(body))
}
