//! Privacy shield helpers.
//!
//! Produces obfuscated labels for the demo's "external" queries. These are
//! truncated general-purpose digests and time-derived tokens: illustrative
//! only, they provide no confidentiality.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Non-cryptographic hash used for synthetic identifiers (PNRs, request ids).
/// Stable within a process.
pub fn identifier_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash a piece of PII into a short display label
pub fn hash_pii(data: &str) -> String {
    let digest = hex::encode(Sha256::digest(data.as_bytes()));
    format!("SHA256:{}...", &digest[..12])
}

/// Corporate token derived from the current minute
pub fn create_anonymous_token() -> String {
    anonymous_token_at(&Local::now())
}

/// Corporate token derived from the given instant (minute resolution)
pub fn anonymous_token_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let minute = at.format("%Y%m%d%H%M").to_string();
    let digest = hex::encode(Sha256::digest(minute.as_bytes()));
    format!("CORP_TOKEN_{}", digest[..8].to_uppercase())
}

/// Outgoing request before redaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TravelRequest {
    pub passenger: String,
    pub mission: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

/// What actually leaves the sovereign perimeter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedRequest {
    pub request_id: String,
    pub passenger_type: String,
    pub identity_status: String,
    pub pii_redaction: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_code: Option<String>,
}

/// Strip identity and mission from a request; only route codes pass through
pub fn redact_request(request: &TravelRequest) -> AnonymizedRequest {
    AnonymizedRequest {
        request_id: format!("REQ-{:04}-X", identifier_hash(request) % 10_000),
        passenger_type: "VIP_PREMIUM".to_string(),
        identity_status: "HASHED_OAUTH2".to_string(),
        pii_redaction: "ACTIVE".to_string(),
        timestamp: Local::now().to_rfc3339(),
        origin_code: request.origin.clone(),
        destination_code: request.destination.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedBooking {
    pub encrypted_pnr: String,
    pub payment_method: String,
    pub audit_trail: String,
}

/// Wrap booking data before it is stored
pub fn encrypt_booking<T: Hash + ?Sized>(booking: &T) -> EncryptedBooking {
    EncryptedBooking {
        encrypted_pnr: format!("ENC_{:03}_ALPHA", identifier_hash(booking) % 1_000),
        payment_method: "CORPORATE_TOKEN".to_string(),
        audit_trail: "SOVEREIGN_COMPLIANT".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request() -> TravelRequest {
        TravelRequest {
            passenger: "CEO Global Tech".to_string(),
            mission: "Operation Sakura".to_string(),
            origin: Some("CDG".to_string()),
            destination: Some("KIX".to_string()),
        }
    }

    #[test]
    fn test_hash_pii_is_deterministic() {
        let first = hash_pii("CEO Global Tech");
        assert_eq!(first, hash_pii("CEO Global Tech"));
        assert!(first.starts_with("SHA256:"));
        assert!(first.ends_with("..."));
        assert_eq!(first.len(), "SHA256:".len() + 12 + 3);
        assert_ne!(first, hash_pii("CEO Other Corp"));
    }

    #[test]
    fn test_token_shape() {
        let token = create_anonymous_token();
        let suffix = token.strip_prefix("CORP_TOKEN_").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_token_depends_on_minute() {
        let a = Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 5).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 55).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 3, 1, 23, 1, 0).unwrap();
        assert_eq!(anonymous_token_at(&a), anonymous_token_at(&b));
        assert_ne!(anonymous_token_at(&a), anonymous_token_at(&c));
    }

    #[test]
    fn test_redact_request_drops_identity() {
        let redacted = redact_request(&request());
        let json = serde_json::to_string(&redacted).unwrap();
        assert!(!json.contains("CEO Global Tech"));
        assert!(!json.contains("Operation Sakura"));
        assert_eq!(redacted.origin_code.as_deref(), Some("CDG"));
        assert_eq!(redacted.destination_code.as_deref(), Some("KIX"));
        assert!(redacted.request_id.starts_with("REQ-"));
        assert!(redacted.request_id.ends_with("-X"));
        assert_eq!(redacted.request_id.len(), "REQ-0000-X".len());
    }

    #[test]
    fn test_redact_request_without_route() {
        let mut req = request();
        req.origin = None;
        req.destination = None;
        let json = serde_json::to_value(redact_request(&req)).unwrap();
        assert!(json.get("origin_code").is_none());
        assert!(json.get("destination_code").is_none());
    }

    #[test]
    fn test_encrypt_booking() {
        let encrypted = encrypt_booking("JL416 CDG-KIX");
        assert!(encrypted.encrypted_pnr.starts_with("ENC_"));
        assert!(encrypted.encrypted_pnr.ends_with("_ALPHA"));
        assert_eq!(encrypted, encrypt_booking("JL416 CDG-KIX"));
        assert_eq!(encrypted.payment_method, "CORPORATE_TOKEN");
    }
}
