//! Webhook signature verification.
//!
//! Shopify signs each webhook delivery with HMAC-SHA256 over the raw request
//! body, keyed by the shop's webhook secret, and sends the digest
//! base64-encoded in the `X-Shopify-Hmac-Sha256` header. Verification must
//! run against the exact bytes received, before any JSON parsing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies webhook signatures against the configured shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Check a delivery's signature header against the raw body bytes.
    ///
    /// Returns `false` for a missing or malformed header, never an error:
    /// an unverifiable delivery is treated exactly like a forged one.
    #[must_use]
    pub fn verify(&self, raw_body: &[u8], header: Option<&str>) -> bool {
        let Some(provided) = header else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
        else {
            return false;
        };
        mac.update(raw_body);

        let expected = BASE64.encode(mac.finalize().into_bytes());

        constant_time_compare(&expected, provided)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"***")
            .finish()
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("valid key length");
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    fn verifier(secret: &str) -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from(secret.to_owned()))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let body = br#"{"id":555,"total_price":"100.00"}"#;
        let digest = sign("test-webhook-secret", body);

        assert!(verifier("test-webhook-secret").verify(body, Some(&digest)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = br#"{"id":555}"#;
        let digest = sign("some-other-secret", body);

        assert!(!verifier("test-webhook-secret").verify(body, Some(&digest)));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let digest = sign("test-webhook-secret", br#"{"total_price":"100.00"}"#);

        assert!(
            !verifier("test-webhook-secret").verify(br#"{"total_price":"999.00"}"#, Some(&digest))
        );
    }

    #[test]
    fn test_missing_header_rejected() {
        assert!(!verifier("test-webhook-secret").verify(b"{}", None));
    }

    #[test]
    fn test_garbage_header_rejected() {
        assert!(!verifier("test-webhook-secret").verify(b"{}", Some("not base64 at all")));
        assert!(!verifier("test-webhook-secret").verify(b"{}", Some("")));
    }

    #[test]
    fn test_signature_covers_exact_bytes() {
        // Whitespace differences in the raw body must break verification.
        let digest = sign("test-webhook-secret", br#"{"id": 1}"#);

        assert!(!verifier("test-webhook-secret").verify(br#"{"id":1}"#, Some(&digest)));
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }
}
