//! Identity-token verification.
//!
//! Authorization is claims-based: the identity provider stamps role claims
//! into the access token, and admin endpoints require the `admin` role. The
//! verifier is injected through `AppState` rather than read from process-wide
//! environment state.

use crate::config::AuthConfig;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::fs;

pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by an access token issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Role claims granted to this account
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AccessTokenClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Verifies bearer tokens against the identity provider's key material.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from configuration: an RSA public key file when one
    /// is configured, otherwise the HMAC shared secret.
    pub fn from_config(config: &AuthConfig) -> Result<Self, anyhow::Error> {
        if let Some(path) = &config.public_key_path {
            let public_key_pem = fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read identity public key from {}: {}", path, e)
            })?;
            let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
                .map_err(|e| anyhow::anyhow!("Failed to parse identity public key: {}", e))?;
            tracing::info!("Token verifier initialized with RS256 public key");
            Ok(Self {
                decoding_key,
                validation: Validation::new(Algorithm::RS256),
            })
        } else if let Some(secret) = &config.hmac_secret {
            tracing::info!("Token verifier initialized with HS256 shared secret");
            Ok(Self::from_hmac_secret(secret.expose_secret()))
        } else {
            Err(anyhow::anyhow!(
                "No identity verification key configured (AUTH_JWT_PUBLIC_KEY_PATH or AUTH_JWT_SECRET)"
            ))
        }
    }

    pub fn from_hmac_secret(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a bearer token and return its claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AppError> {
        decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::AuthError(anyhow::anyhow!("Invalid identity token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn issue_token(secret: &str, roles: Vec<String>) -> String {
        let now = chrono_now();
        let claims = AccessTokenClaims {
            sub: "user_123".to_string(),
            email: "creator@example.com".to_string(),
            exp: now + 3600,
            iat: now,
            roles,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn chrono_now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    #[test]
    fn test_verify_round_trip() {
        let verifier = TokenVerifier::from_hmac_secret("test-secret");
        let token = issue_token("test-secret", vec!["admin".to_string()]);

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email, "creator@example.com");
        assert!(claims.has_role(ADMIN_ROLE));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = TokenVerifier::from_hmac_secret("test-secret");
        let token = issue_token("other-secret", vec![]);

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_from_config_requires_key_material() {
        // No public key and no shared secret: there is no default to fall
        // back to, so the verifier cannot be built and startup fails.
        let config = AuthConfig {
            public_key_path: None,
            hmac_secret: None,
        };
        assert!(TokenVerifier::from_config(&config).is_err());
    }

    #[test]
    fn test_missing_roles_claim_defaults_to_empty() {
        let verifier = TokenVerifier::from_hmac_secret("test-secret");
        let token = issue_token("test-secret", vec![]);

        let claims = verifier.verify(&token).unwrap();
        assert!(!claims.has_role(ADMIN_ROLE));
    }
}
