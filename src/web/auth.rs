//! Cookie session authentication: signed JWT claims in an HTTP-only cookie.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::core::config::AppConfig;
use crate::shared::state::AppState;
use crate::tenancy::DbUser;

pub const AUTH_COOKIE: &str = "auth_token";

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub session_id: String,
    pub org_id: Option<String>, // company id of the tenant
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_expiry_hours: i64,
}

impl AuthConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.auth.jwt_secret.clone(),
            session_expiry_hours: config.auth.session_hours,
        }
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn issue_token(
        &self,
        user: &DbUser,
        company_id: Option<Uuid>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.session_expiry_hours);

        let mut roles = vec!["user".to_string()];
        if user.is_superuser {
            roles.push("admin".to_string());
        }

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.username.clone(),
            roles,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            session_id: Uuid::new_v4().to_string(),
            org_id: company_id.map(|id| id.to_string()),
        };

        encode(&Header::default(), &claims, &self.encoding_key())
    }

    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key(), &Validation::default())
            .ok()
            .map(|data| data.claims)
            .filter(|claims| claims.exp >= Utc::now().timestamp())
    }
}

/// Authenticated user extractor. Browsers without a valid session are sent
/// to the login page.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.claims.sub).ok()
    }

    pub fn company_id(&self) -> Option<Uuid> {
        self.claims
            .org_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
    }

    pub fn display_name(&self) -> &str {
        &self.claims.name
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/login"))?;

        let token = cookies
            .get(AUTH_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to("/login"))?;

        let claims = app_state.auth_config.verify_token(&token).ok_or_else(|| {
            tracing::debug!("Rejected invalid or expired session token");
            Redirect::to("/login")
        })?;

        Ok(AuthenticatedUser { claims })
    }
}

/// Optional authenticated user (doesn't fail if not authenticated)
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthenticatedUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalAuth(Some(user))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

pub use tower_cookies::Cookie;

pub fn create_auth_cookie(token: &str, expires_in_hours: i64) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(tower_cookies::cookie::SameSite::Lax)
        .max_age(time::Duration::hours(expires_in_hours))
        .build()
}

/// Cookie matching the session cookie's path, for removal.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, "")).path("/").build()
}
