//! AWS Signature Version 4 request signing.
//!
//! Minimal SigV4 for the two S3 operations the store needs (HEAD and
//! PUT with a known payload hash). Only host, x-amz-content-sha256 and
//! x-amz-date are signed; other headers travel unsigned.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of the empty string, used as the payload hash for bodyless
/// requests.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Everything needed to sign one request.
pub struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub method: &'a str,
    pub host: &'a str,
    /// Absolute path, already percent-encoded per segment.
    pub canonical_uri: &'a str,
    /// Hex SHA-256 of the request body.
    pub payload_hash: &'a str,
    pub timestamp: DateTime<Utc>,
}

/// Header values produced by signing.
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
}

/// Sign a request and return the Authorization and x-amz-date values.
pub fn sign_request(params: &SigningParams<'_>) -> SignedHeaders {
    let amz_date = params.timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.timestamp.format("%Y%m%d").to_string();

    let canonical_headers = format!(
        "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        params.host, params.payload_hash, amz_date
    );

    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        params.method, params.canonical_uri, canonical_headers, SIGNED_HEADERS, params.payload_hash
    );

    let scope = format!("{}/{}/s3/aws4_request", date, params.region);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let date_key = hmac_sha256(
        format!("AWS4{}", params.secret_access_key).as_bytes(),
        date.as_bytes(),
    );
    let region_key = hmac_sha256(&date_key, params.region.as_bytes());
    let service_key = hmac_sha256(&region_key, b"s3");
    let signing_key = hmac_sha256(&service_key, b"aws4_request");
    let signature = hex(&hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        params.access_key_id, scope, SIGNED_HEADERS, signature
    );

    SignedHeaders {
        authorization,
        amz_date,
    }
}

/// Percent-encode an object key for use in a canonical URI, keeping
/// `/` separators intact.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC key of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params<'a>(timestamp: DateTime<Utc>) -> SigningParams<'a> {
        SigningParams {
            access_key_id: "AKIDEXAMPLE",
            secret_access_key: "secret",
            region: "auto",
            method: "HEAD",
            host: "acct.r2.cloudflarestorage.com",
            canonical_uri: "/bucket/video.mp4",
            payload_hash: EMPTY_PAYLOAD_SHA256,
            timestamp,
        }
    }

    #[test]
    fn test_empty_payload_constant() {
        assert_eq!(sha256_hex(b""), EMPTY_PAYLOAD_SHA256);
    }

    #[test]
    fn test_signature_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let signed = sign_request(&params(ts));

        assert_eq!(signed.amz_date, "20240601T123000Z");
        assert!(signed
            .authorization
            .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240601/auto/s3/aws4_request"));
        assert!(signed
            .authorization
            .contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date"));

        // Signature is 32 bytes of lowercase hex.
        let sig = signed
            .authorization
            .rsplit("Signature=")
            .next()
            .unwrap()
            .to_string();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let a = sign_request(&params(ts));
        let b = sign_request(&params(ts));
        assert_eq!(a.authorization, b.authorization);
    }

    #[test]
    fn test_signature_depends_on_payload() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let a = sign_request(&params(ts));
        let mut p = params(ts);
        p.payload_hash = "11223344556677889900aabbccddeeff11223344556677889900aabbccddeeff";
        let b = sign_request(&p);
        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("video.mp4"), "video.mp4");
        assert_eq!(encode_key("my video.mp4"), "my%20video.mp4");
        assert_eq!(encode_key("a/b c.mp4"), "a/b%20c.mp4");
    }
}
