//! # Webhook Signature Verification
//!
//! Sentry signs every integration webhook with HMAC-SHA256 keyed by the
//! integration's client secret and sends the lowercase hex digest in the
//! `Sentry-Hook-Signature` header.
//!
//! The digest is always computed over the raw bytes received on the wire.
//! Re-serializing a parsed body is not byte-stable (key order, whitespace,
//! number formatting) and would reject legitimately signed deliveries.
//!
//! When no secret is configured the verifier runs in open mode and accepts
//! every request.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::instrument;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a delivery fails signature verification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signature header is missing")]
    MissingSignature,

    #[error("HMAC-SHA256 digest does not match")]
    Mismatch,
}

/// Verifies `Sentry-Hook-Signature` headers against a shared secret.
///
/// # Examples
///
/// ```rust
/// use sentry_sms_core::signature::SignatureVerifier;
///
/// let open = SignatureVerifier::new(None);
/// assert!(open.is_valid(b"{}", None));
///
/// let strict = SignatureVerifier::new(Some("secret".to_string()));
/// assert!(!strict.is_valid(b"{}", None));
/// ```
#[derive(Clone, Default)]
pub struct SignatureVerifier {
    secret: Option<Zeroizing<String>>,
}

impl SignatureVerifier {
    /// Construct a verifier. `None` or an empty secret selects open mode.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(Zeroizing::new),
        }
    }

    /// Returns `true` when a secret is configured
    pub fn is_enforcing(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify `signature` against the HMAC-SHA256 of `raw_body`.
    ///
    /// The comparison runs in constant time over the hex text, so only the
    /// exact lowercase digest is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::MissingSignature`] when a secret is configured
    /// but no header was supplied, and [`SignatureError::Mismatch`] for any
    /// other value than the expected digest.
    #[instrument(skip(self, raw_body, signature), fields(body_len = raw_body.len()))]
    pub fn verify(&self, raw_body: &[u8], signature: Option<&str>) -> Result<(), SignatureError> {
        let Some(secret) = self.secret.as_ref() else {
            return Ok(());
        };
        let signature = signature.ok_or(SignatureError::MissingSignature)?;

        let expected = compute_signature(secret, raw_body);
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    /// Boolean form of [`SignatureVerifier::verify`]
    pub fn is_valid(&self, raw_body: &[u8], signature: Option<&str>) -> bool {
        self.verify(raw_body, signature).is_ok()
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &self.secret.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Compute the lowercase hex HMAC-SHA256 digest of `payload` keyed by `secret`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Stateless verification: open when `secret` is absent, otherwise an exact
/// digest match of `signature` over `raw_body`.
pub fn verify(raw_body: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    match secret.filter(|s| !s.is_empty()) {
        None => true,
        Some(secret) => signature.is_some_and(|sig| {
            bool::from(
                compute_signature(secret, raw_body)
                    .as_bytes()
                    .ct_eq(sig.as_bytes()),
            )
        }),
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
