//! Minimal, unverified JWT payload decoding.
//!
//! Only used to show who is signed in. The server validates tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of a JWT without checking its signature.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// `preferred_username` claim, falling back to `email`.
pub fn preferred_username(token: &str) -> Option<String> {
    let claims = decode_claims(token)?;
    claims.preferred_username.or(claims.email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fake_jwt(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        let signature = URL_SAFE_NO_PAD.encode(b"sig");
        format!("{header}.{body}.{signature}")
    }

    #[test]
    fn test_preferred_username() {
        let token = fake_jwt(json!({"preferred_username": "neteng", "exp": 1}));
        assert_eq!(preferred_username(&token).as_deref(), Some("neteng"));
        assert_eq!(decode_claims(&token).unwrap().exp, Some(1));
    }

    #[test]
    fn test_email_fallback() {
        let token = fake_jwt(json!({"email": "ops@example.com"}));
        assert_eq!(preferred_username(&token).as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_garbage_token() {
        assert!(decode_claims("not-a-jwt").is_none());
        assert!(decode_claims("a.%%%.c").is_none());
    }
}
