//! Inbound webhook signature verification (Slack v0 and Linear).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Requests older (or newer) than this are treated as replays.
pub const SLACK_REPLAY_WINDOW_SECS: i64 = 60 * 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing signature header")]
    MissingSignature,

    #[error("Missing or malformed request timestamp")]
    InvalidTimestamp,

    #[error("Request timestamp outside the replay window")]
    Stale,

    #[error("Signature mismatch")]
    Mismatch,
}

fn mac(secret: &str) -> HmacSha256 {
    // HMAC-SHA256 takes keys of any length
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts any key length"),
    }
}

/// `v0=<hex>` signature over `v0:{timestamp}:{body}`.
pub fn sign_slack_request(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = mac(secret);
    mac.update(format!("v0:{}:", timestamp).as_bytes());
    mac.update(body);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify the `X-Slack-Signature` / `X-Slack-Request-Timestamp` pair.
pub fn verify_slack_request(
    secret: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    now_unix: i64,
) -> Result<(), SignatureError> {
    let signature = signature.ok_or(SignatureError::MissingSignature)?;
    let timestamp = timestamp.ok_or(SignatureError::InvalidTimestamp)?;
    let sent_at: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;

    if (now_unix - sent_at).abs() > SLACK_REPLAY_WINDOW_SECS {
        return Err(SignatureError::Stale);
    }

    let provided = signature
        .strip_prefix("v0=")
        .and_then(|h| hex::decode(h).ok())
        .ok_or(SignatureError::Mismatch)?;

    let mut mac = mac(secret);
    mac.update(format!("v0:{}:", timestamp).as_bytes());
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

/// Hex HMAC-SHA256 of the raw body, as sent in `Linear-Signature`.
pub fn sign_linear_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = mac(secret);
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_linear_payload(
    secret: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    let signature = signature.ok_or(SignatureError::MissingSignature)?;
    let provided = hex::decode(signature.trim()).map_err(|_| SignatureError::Mismatch)?;

    let mut mac = mac(secret);
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_531_420_618;

    #[test]
    fn accepts_own_signature() {
        let body = br#"{"type":"event_callback"}"#;
        let sig = sign_slack_request(SECRET, "1531420618", body);
        assert!(sig.starts_with("v0="));
        assert_eq!(
            verify_slack_request(SECRET, Some("1531420618"), Some(&sig), body, NOW),
            Ok(())
        );
    }

    #[test]
    fn rejects_tampered_body() {
        let sig = sign_slack_request(SECRET, "1531420618", b"original");
        assert_eq!(
            verify_slack_request(SECRET, Some("1531420618"), Some(&sig), b"tampered", NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let body = b"{}";
        let sig = sign_slack_request(SECRET, "1531420618", body);
        let later = NOW + SLACK_REPLAY_WINDOW_SECS + 1;
        assert_eq!(
            verify_slack_request(SECRET, Some("1531420618"), Some(&sig), body, later),
            Err(SignatureError::Stale)
        );
    }

    #[test]
    fn rejects_missing_headers() {
        assert_eq!(
            verify_slack_request(SECRET, Some("1531420618"), None, b"{}", NOW),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verify_slack_request(SECRET, None, Some("v0=00"), b"{}", NOW),
            Err(SignatureError::InvalidTimestamp)
        );
    }

    #[test]
    fn linear_signature_round_trip() {
        let body = br#"{"action":"update"}"#;
        let sig = sign_linear_payload("lin_wh_secret", body);
        assert_eq!(verify_linear_payload("lin_wh_secret", Some(&sig), body), Ok(()));
        assert_eq!(
            verify_linear_payload("other", Some(&sig), body),
            Err(SignatureError::Mismatch)
        );
    }
}
