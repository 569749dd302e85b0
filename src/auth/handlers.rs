use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::{
        cookie::{cleared_cookie, token_cookie},
        dto::{LoginRequest, PublicClaims, RegisterRequest},
        errors::AuthError,
        jwt::AuthUser,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| {
            debug!(error = %rejection.body_text(), "request body rejected");
            AuthError::Validation("Validation error".into())
        })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let res = state.auth.register(body(payload)?).await?;
    let cookie = token_cookie(&res.token, state.auth.keys().ttl, state.config.production);
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(res)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let res = state.auth.login(body(payload)?).await?;
    let cookie = token_cookie(&res.token, state.auth.keys().ttl, state.config.production);
    Ok(([(header::SET_COOKIE, cookie)], Json(res)))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let res = state.auth.logout();
    (
        [(header::SET_COOKIE, cleared_cookie(state.config.production))],
        Json(res),
    )
}

#[instrument(skip_all)]
pub async fn me(AuthUser(claims): AuthUser) -> Json<PublicClaims> {
    Json(PublicClaims::from(claims))
}
