//! Helio webhook signature verification.
//!
//! Helio signs the raw request body with HMAC-SHA256 using the shared webhook
//! secret and sends the hex digest in `X-Helio-Signature` (or `X-Signature`),
//! optionally prefixed with `sha256=`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Primary signature header.
pub const SIGNATURE_HEADER: &str = "x-helio-signature";

/// Header consulted when the primary one is absent.
pub const FALLBACK_SIGNATURE_HEADER: &str = "x-signature";

/// Optional prefix on the provided signature.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a Helio webhook signature.
///
/// # Arguments
///
/// * `payload` - The raw request body, exactly as received
/// * `signature` - The signature header value, if present
/// * `secret` - The shared webhook secret, if configured
///
/// # Returns
///
/// `true` only if both credentials are present and the signature decodes
/// (hex, either case) to `HMAC-SHA256(secret, payload)`. Every failure is
/// reported as `false`.
pub fn verify_helio_signature(payload: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let (signature, secret) = match (signature, secret) {
        (Some(sig), Some(key)) if !sig.is_empty() && !key.is_empty() => (sig, key),
        _ => {
            warn!(
                has_signature = signature.map(|s| !s.is_empty()).unwrap_or(false),
                has_secret = secret.map(|s| !s.is_empty()).unwrap_or(false),
                "helio_signature_missing_fields"
            );
            return false;
        }
    };

    let expected_digest = match compute_digest(secret, payload) {
        Some(digest) => digest,
        None => {
            warn!("helio_signature_invalid_key");
            return false;
        }
    };

    let provided = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);

    // Hex is case-insensitive; compare decoded digests, not strings
    let provided_digest = match hex::decode(provided) {
        Ok(digest) => digest,
        Err(_) => {
            warn!(actual_length = provided.len(), "helio_signature_malformed");
            return false;
        }
    };

    let valid = constant_time_compare(&expected_digest, &provided_digest);

    if !valid {
        warn!(
            expected_length = expected_digest.len(),
            actual_length = provided_digest.len(),
            "helio_signature_mismatch"
        );
    }

    valid
}

/// Raw HMAC-SHA256 of `payload` under `secret`.
fn compute_digest(secret: &str, payload: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Compute the lowercase hex HMAC-SHA256 of `payload` under `secret`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> Option<String> {
    compute_digest(secret, payload).map(hex::encode)
}

/// Constant-time comparison. Lengths are not secret and short-circuit.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Check if signature verification is enabled.
pub fn is_signature_verification_enabled(secret: Option<&str>) -> bool {
    secret.map(|k| !k.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"event":"payment.completed","data":{"id":"tx_1","amount":100}}"#;

    fn sign(secret: &str, body: &[u8]) -> String {
        compute_signature(secret, body).unwrap()
    }

    #[test]
    fn test_verify_signature_valid() {
        let signature = sign(SECRET, BODY);
        assert!(verify_helio_signature(BODY, Some(&signature), Some(SECRET)));
    }

    #[test]
    fn test_verify_signature_with_prefix() {
        let signature = format!("sha256={}", sign(SECRET, BODY));
        assert!(verify_helio_signature(BODY, Some(&signature), Some(SECRET)));
    }

    #[test]
    fn test_verify_signature_uppercase_hex() {
        let signature = sign(SECRET, BODY).to_uppercase();
        assert!(verify_helio_signature(BODY, Some(&signature), Some(SECRET)));

        let prefixed = format!("sha256={}", signature);
        assert!(verify_helio_signature(BODY, Some(&prefixed), Some(SECRET)));
    }

    #[test]
    fn test_verify_signature_uppercase_wrong_digest() {
        let signature = sign("other-secret", BODY).to_uppercase();
        assert!(!verify_helio_signature(BODY, Some(&signature), Some(SECRET)));
    }

    #[test]
    fn test_verify_signature_any_flipped_byte() {
        let signature = sign(SECRET, BODY);

        for i in 0..signature.len() {
            let mut tampered = signature.clone().into_bytes();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8_lossy(&tampered).into_owned();
            assert!(
                !verify_helio_signature(BODY, Some(&tampered), Some(SECRET)),
                "flipped byte {} still verified",
                i
            );
        }
    }

    #[test]
    fn test_verify_signature_missing_fields() {
        let signature = sign(SECRET, BODY);
        assert!(!verify_helio_signature(BODY, None, Some(SECRET)));
        assert!(!verify_helio_signature(BODY, Some(""), Some(SECRET)));
        assert!(!verify_helio_signature(BODY, Some(&signature), None));
        assert!(!verify_helio_signature(BODY, Some(&signature), Some("")));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = sign("other-secret", BODY);
        assert!(!verify_helio_signature(BODY, Some(&signature), Some(SECRET)));
    }

    #[test]
    fn test_verify_signature_body_is_byte_exact() {
        let signature = sign(SECRET, BODY);
        let reformatted = br#"{"event": "payment.completed", "data": {"id": "tx_1", "amount": 100}}"#;
        assert!(!verify_helio_signature(reformatted, Some(&signature), Some(SECRET)));
    }

    #[test]
    fn test_verify_signature_malformed_hex() {
        assert!(!verify_helio_signature(BODY, Some("zz-not-hex"), Some(SECRET)));
        assert!(!verify_helio_signature(BODY, Some("abc"), Some(SECRET)));
        assert!(!verify_helio_signature(BODY, Some("sha256="), Some(SECRET)));
    }

    #[test]
    fn test_verify_signature_truncated() {
        let signature = sign(SECRET, BODY);
        assert!(!verify_helio_signature(BODY, Some(&signature[..32]), Some(SECRET)));
    }

    #[test]
    fn test_compute_signature_known_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            compute_signature("Jefe", b"what do ya want for nothing?").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
    }

    #[test]
    fn test_is_signature_verification_enabled() {
        assert!(!is_signature_verification_enabled(None));
        assert!(!is_signature_verification_enabled(Some("")));
        assert!(!is_signature_verification_enabled(Some("   ")));
        assert!(is_signature_verification_enabled(Some("key123")));
    }
}
