use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{auth::claims::Claims, config::JwtConfig, error::ApiError, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("token lifetime out of range")]
    InvalidTtl,

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Signing and verification keys plus the claim values this service stamps.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    has_secret: bool,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            has_secret: !cfg.secret.is_empty(),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::seconds(cfg.ttl_seconds),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        if !self.has_secret {
            return Err(TokenError::EmptySecret);
        }
        if !self.ttl.is_positive() {
            return Err(TokenError::InvalidTtl);
        }
        let now = OffsetDateTime::now_utc();
        let expires_at = now.checked_add(self.ttl).ok_or(TokenError::InvalidTtl)?;
        let claims = Claims {
            user_id: user_id.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: usize::try_from(expires_at.unix_timestamp()).map_err(|_| TokenError::InvalidTtl)?,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token =
            encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Signing)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, expiry, issuer and audience; returns the user id.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        if !self.has_secret {
            return Err(TokenError::EmptySecret);
        }
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        let user_id = data
            .claims
            .user_id
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid("userID is not a number".into()))?;
        debug!(user_id, "jwt verified");
        Ok(user_id)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

/// Id of the caller, taken from a valid `Authorization: Bearer` token.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("invalid Authorization header".into()))?;

        match keys.verify(token) {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(e) => {
                warn!(error = %e, "rejected bearer token");
                Err(ApiError::Unauthorized("invalid or expired token".into()))
            }
        }
    }
}
