//! Authenticated-user extractor.
//!
//! Pulls the bearer token from the `Authorization` header and verifies it
//! against the identity provider's key material held in `AppState`. Admin
//! endpoints additionally require the `admin` role claim.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use service_core::error::AppError;

use crate::services::auth::{AccessTokenClaims, ADMIN_ROLE};
use crate::AppState;

/// The verified caller of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub claims: AccessTokenClaims,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.claims.sub
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    /// Admin endpoints require the `admin` role claim on the identity token.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.claims.has_role(ADMIN_ROLE) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id(), "Admin endpoint called without admin role");
            Err(AppError::Forbidden(anyhow::anyhow!("Admin role required")))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Missing Authorization header")))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::AuthError(anyhow::anyhow!("Authorization header must be a bearer token"))
        })?;

        let claims = state.verifier.verify(token)?;

        let span = tracing::Span::current();
        span.record("user_id", claims.sub.as_str());

        Ok(CurrentUser { claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_user(roles: Vec<String>) -> CurrentUser {
        CurrentUser {
            claims: AccessTokenClaims {
                sub: "user_123".to_string(),
                email: "creator@example.com".to_string(),
                exp: 0,
                iat: 0,
                roles,
            },
        }
    }

    #[test]
    fn test_admin_role_passes_the_gate() {
        let user = current_user(vec![ADMIN_ROLE.to_string()]);
        assert!(user.require_admin().is_ok());
    }

    #[test]
    fn test_missing_admin_role_is_forbidden() {
        let user = current_user(vec!["creator".to_string()]);
        let err = user.require_admin().unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
