use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password_blocking, verify_dummy, verify_password_blocking},
        validate::{validate_login, validate_register},
    },
    db::RepoError,
    error::ApiError,
    state::AppState,
    users::{NewUser, User},
};

/// The only message a failed login ever returns.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn already_exists(email: &str) -> ApiError {
    ApiError::BadRequest(format!("user with email {email} already exists"))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(mut payload) = payload?;

    let violations = validate_register(&mut payload);
    if !violations.is_empty() {
        warn!(?violations, "register payload rejected");
        return Err(ApiError::Validation(violations));
    }

    match state.users.get_by_email(&payload.email).await {
        Ok(_) => {
            warn!(email = %payload.email, "email already registered");
            return Err(already_exists(&payload.email));
        }
        Err(RepoError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    let password_hash = hash_password_blocking(payload.password)
        .await
        .map_err(ApiError::internal)?;

    let user = match state
        .users
        .create(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email.clone(),
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(RepoError::Duplicate) => {
            warn!(email = %payload.email, "lost registration race on unique email");
            return Err(already_exists(&payload.email));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(mut payload) = payload?;

    let violations = validate_login(&mut payload);
    if !violations.is_empty() {
        return Err(ApiError::Validation(violations));
    }

    let user = match state.users.get_by_email(&payload.email).await {
        Ok(u) => Some(u),
        Err(RepoError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    let ok = match &user {
        Some(u) => verify_password_blocking(u.password.clone(), payload.password).await,
        None => verify_dummy(payload.password).await,
    }
    .map_err(ApiError::internal)?;

    let user = match user {
        Some(u) if ok => u,
        _ => {
            warn!(email = %payload.email, "login rejected");
            return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id).map_err(|e| {
        error!(error = %e, user_id = user.id, "jwt issue failed");
        ApiError::internal(e)
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    match state.users.get_by_id(user_id).await {
        Ok(user) => Ok(Json(user)),
        Err(RepoError::NotFound) => Err(ApiError::NotFound("user not found".into())),
        Err(e) => Err(e.into()),
    }
}
