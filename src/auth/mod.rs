//! Authentication and authorization.
//!
//! Credentials are HS256 JWTs carrying identity, role, and display name,
//! valid for a configured horizon (12 hours by default). Every protected
//! route goes through [`auth_middleware`], which validates the bearer token
//! and stores an [`AuthUser`] in the request extensions; handlers then call
//! [`authorize`] against a per-operation allowed-role constant from
//! [`gate`]. Membership checks are exact-set, not hierarchical.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::user;
use crate::errors::ServiceError;

pub mod password;

/// Closed role set. Endpoints enumerate their allowed roles explicitly;
/// there is no privilege hierarchy in the checks themselves.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

/// Per-operation allowed-role constants, checked by [`authorize`].
pub mod gate {
    use super::Role;

    pub const REFERENCE_READ: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];
    pub const VISIT_WRITE: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];
    pub const VISIT_SUBMIT: &[Role] = &[Role::Employee];
    pub const VISIT_APPROVE: &[Role] = &[Role::Manager, Role::Admin];
    pub const REPORT_VIEW: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];
    pub const REPORT_SEND: &[Role] = &[Role::Manager, Role::Admin];
    pub const ADMIN_MANAGE: &[Role] = &[Role::Manager, Role::Admin];
    pub const ADMIN_DELETE: &[Role] = &[Role::Admin];
}

/// Single authorization gate: exact-set membership or `Forbidden`.
pub fn authorize(user: &AuthUser, allowed: &[Role]) -> Result<(), ServiceError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "role '{}' may not perform this operation",
            user.role
        )))
    }
}

/// Claim structure for issued credentials.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated identity extracted from a validated credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
    pub name: String,
}

/// Authentication configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            token_expiration,
        }
    }
}

/// Login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public user profile returned alongside the credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Issues and validates credentials against the user store.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Verify credentials and issue a signed, time-bounded token.
    ///
    /// Unknown email, inactive account, and wrong password all collapse to
    /// the same `InvalidCredentials` failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::IsActive.eq(true))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let account = match account {
            Some(account) if password::verify_password(password, &account.password_hash) => account,
            _ => {
                debug!("login rejected");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let role: Role = account
            .role
            .parse()
            .map_err(|_| ServiceError::InternalError(format!("unknown role '{}'", account.role)))?;

        let token = self.issue_token(account.id, role, &account.full_name)?;

        Ok(LoginResponse {
            token,
            expires_in: self.config.token_expiration.as_secs() as i64,
            user: UserProfile {
                id: account.id,
                name: account.full_name,
                email: account.email,
                phone: account.phone,
                role,
            },
        })
    }

    /// Encode a credential for the given identity.
    pub fn issue_token(&self, user_id: i64, role: Role, name: &str) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| ServiceError::InternalError("invalid token duration".into()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            name: name.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token creation failed: {e}")))
    }

    /// Validate a credential and extract its claims. Expiry is enforced by
    /// the decoder.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Unauthenticated("credential expired".into())
            }
            _ => ServiceError::Unauthenticated("invalid credential".into()),
        })
    }
}

/// Middleware validating the bearer token and storing [`AuthUser`] in the
/// request extensions. Applied to every protected route.
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, ServiceError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::Unauthenticated("missing credential".into()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| ServiceError::Unauthenticated("missing bearer credential".into()))?;

    let claims = auth_service.validate_token(token)?;
    let id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| ServiceError::Unauthenticated("invalid credential subject".into()))?;

    Ok(AuthUser {
        id,
        role: claims.role,
        name: claims.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let config = AuthConfig::new(
            "unit_test_secret_that_is_long_enough_123".into(),
            Duration::from_secs(12 * 60 * 60),
        );
        // The db handle is unused by pure token operations.
        let db = Arc::new(DatabaseConnection::Disconnected);
        AuthService::new(config, db)
    }

    #[test]
    fn token_roundtrip_preserves_identity_and_role() {
        let svc = service();
        let token = svc.issue_token(7, Role::Manager, "Dana").unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.name, "Dana");
        // expires at the configured horizon (within clock slop)
        let horizon = claims.exp - claims.iat;
        assert_eq!(horizon, 12 * 60 * 60);
    }

    #[test]
    fn garbage_token_is_unauthenticated() {
        let svc = service();
        let err = svc.validate_token("not.a.jwt").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[test]
    fn authorize_is_exact_set_membership() {
        let admin = AuthUser {
            id: 1,
            role: Role::Admin,
            name: "A".into(),
        };
        let employee = AuthUser {
            id: 2,
            role: Role::Employee,
            name: "E".into(),
        };

        assert!(authorize(&admin, gate::VISIT_APPROVE).is_ok());
        assert!(authorize(&employee, gate::VISIT_APPROVE).is_err());
        // admin is NOT implicitly an employee: submit is employee-only
        assert!(authorize(&admin, gate::VISIT_SUBMIT).is_err());
        assert!(authorize(&employee, gate::VISIT_SUBMIT).is_ok());
    }

    #[test]
    fn role_strings_roundtrip() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!(Role::Employee.to_string(), "employee");
        assert!("superuser".parse::<Role>().is_err());
    }
}
