use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, PublicUser, RegisterRequest},
        jwt::AuthUser,
    },
    error::ApiError,
    state::AppState,
    users::{is_valid_email, model::normalize_email, NewUser},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/api/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload?;

    let (Some(username), Some(email), Some(password)) = (
        payload.username.filter(|u| !u.trim().is_empty()),
        payload.email.map(|e| normalize_email(&e)).filter(|e| !e.is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        warn!("registration with missing fields");
        return Err(ApiError::MissingField("All fields are required"));
    };

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let hash = state.hasher.hash_blocking(password).await?;
    let new_user = NewUser::new(&username, &email, hash)?;

    let user = state.users.create(new_user).await.map_err(|e| {
        warn!(email = %email, error = %e, "create user failed");
        ApiError::from(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;

    let (Some(email), Some(password)) = (
        payload.email.map(|e| normalize_email(&e)).filter(|e| !e.is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        warn!("login with missing fields");
        return Err(ApiError::MissingField("Email and password are required"));
    };

    let Some(user) = state.users.find_by_email(&email).await? else {
        // Same Argon2 work as a wrong password, so timing does not reveal
        // whether the email is registered.
        let dummy = state.hasher.dummy_hash().to_string();
        state.hasher.verify_blocking(password, dummy).await?;
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let ok = state
        .hasher
        .verify_blocking(password, user.password_hash.clone())
        .await?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.jwt.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        username: user.username,
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let Some(user) = state.users.find_by_id(user_id).await? else {
        warn!(user_id = %user_id, "token for unknown user");
        return Err(ApiError::Unauthorized("User not found"));
    };

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}
