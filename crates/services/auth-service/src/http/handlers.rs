//! Register, login and profile endpoints.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use common::{AppError, AppResult};
use domain::{Password, TOKEN_TYPE_BEARER};

use super::extractors::JsonBody;
use super::state::AppState;
use crate::app::command::RegisterUser;
use crate::app::query::{GetUser, LoginUser, UserView};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub id: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users/:id", get(get_user))
}

/// Create a user. Answers 201 with the profile location.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let location = HeaderValue::from_str(&format!("/users/{}", body.id))
        .map_err(|_| AppError::validation("id contains characters not allowed in a URL"))?;

    let (ctx, _guard) = state.request_context();
    state
        .app
        .commands
        .register_user
        .handle(
            &ctx,
            RegisterUser {
                id: body.id,
                email: body.email,
                password: Password::new(body.password),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, [(header::CONTENT_LOCATION, location)]))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let (ctx, _guard) = state.request_context();
    let token = state
        .app
        .queries
        .login_user
        .handle(
            &ctx,
            LoginUser {
                email: body.email,
                password: Password::new(body.password),
            },
        )
        .await?;

    let expires_in = token.expires_in();
    Ok(Json(TokenResponse {
        access_token: token.token,
        token_type: TOKEN_TYPE_BEARER,
        expires_in,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserView>> {
    let (ctx, _guard) = state.request_context();
    let user = state
        .app
        .queries
        .get_user
        .handle(&ctx, GetUser { id })
        .await?;

    Ok(Json(user))
}
