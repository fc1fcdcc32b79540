use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::ApiJson;
use crate::{
    errors::HttpError,
    middleware::CurrentUser,
    models::{CreateUser, LoginRequest, UserResponse},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub token_type: &'static str,
}

pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, HttpError> {
    let (_, access) = state.auth.login(req.username.trim(), &req.password).await?;

    Ok(Json(TokenResponse {
        access,
        token_type: "Bearer",
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(req): ApiJson<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), HttpError> {
    let user = state.auth.create_user(&current_user, &req).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
