//! Verification of identity-provider session tokens.
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Caller authenticated by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider subject, stored on profiles as `clerk_id`.
    pub clerk_id: String,
    pub email: Option<String>,
}

pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, ServiceError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct IdentityClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    exp: usize,
}

/// HS256 tokens signed with a shared secret; issuer checked when configured.
pub struct Hs256IdentityVerifier {
    secret: String,
    issuer: Option<String>,
}

impl Hs256IdentityVerifier {
    pub fn new(secret: impl Into<String>, issuer: Option<String>) -> Self {
        Self { secret: secret.into(), issuer }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self::new(cfg.identity_secret.clone(), cfg.identity_issuer.clone())
    }

    /// Mint a token this verifier accepts. Used by local tooling and tests.
    pub fn issue(&self, clerk_id: &str, email: Option<&str>, ttl_minutes: i64) -> Result<String, ServiceError> {
        let claims = IdentityClaims {
            sub: clerk_id.to_string(),
            email: email.map(str::to_string),
            iss: self.issuer.clone(),
            exp: (Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| ServiceError::Internal(format!("identity token encode: {e}")))
    }
}

impl IdentityVerifier for Hs256IdentityVerifier {
    fn verify(&self, token: &str) -> Result<Identity, ServiceError> {
        let mut validation = Validation::default();
        if let Some(iss) = &self.issuer {
            validation.set_issuer(&[iss.as_str()]);
        }
        let data = decode::<IdentityClaims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "identity token rejected");
                ServiceError::unauthorized("INVALID_SESSION", "Session invalid or expired")
            })?;
        if data.claims.sub.trim().is_empty() {
            return Err(ServiceError::unauthorized("INVALID_SESSION", "Session has no subject"));
        }
        Ok(Identity { clerk_id: data.claims.sub, email: data.claims.email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let v = Hs256IdentityVerifier::new("id-secret", None);
        let token = v.issue("user_2abc", Some("a@b.in"), 5).unwrap();
        let id = v.verify(&token).unwrap();
        assert_eq!(id.clerk_id, "user_2abc");
        assert_eq!(id.email.as_deref(), Some("a@b.in"));
    }

    #[test]
    fn wrong_secret_or_issuer_is_rejected() {
        let signer = Hs256IdentityVerifier::new("one", Some("https://issuer.a".into()));
        let token = signer.issue("user_x", None, 5).unwrap();

        let other_secret = Hs256IdentityVerifier::new("two", Some("https://issuer.a".into()));
        assert_eq!(other_secret.verify(&token).unwrap_err().code(), "INVALID_SESSION");

        let other_issuer = Hs256IdentityVerifier::new("one", Some("https://issuer.b".into()));
        assert!(other_issuer.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let v = Hs256IdentityVerifier::new("s", None);
        let token = v.issue("user_x", None, -10).unwrap();
        assert!(v.verify(&token).is_err());
    }
}
