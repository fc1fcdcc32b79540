use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::{Cookies, Cookie};

use crate::{
    errors::{PageError, ServiceError},
    middleware::{PageUser, AUTH_COOKIE},
    state::AppState,
};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
    username: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub async fn home(current_user: Result<PageUser, PageError>) -> Result<Redirect, PageError> {
    match current_user {
        Ok(_) => Ok(Redirect::to("/dashboard")),
        Err(PageError::Login) => Ok(Redirect::to("/login")),
        Err(err) => Err(err),
    }
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {
        error: String::new(),
        username: String::new(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.auth.login(form.username.trim(), &form.password).await {
        Ok((_, token)) => {
            // Set secure HTTP-only cookie with JWT token
            let cookie = Cookie::build((AUTH_COOKIE, token))
                .path("/")
                .http_only(true)
                .max_age(time::Duration::hours(state.auth.token_ttl_hours()))
                .build();

            cookies.add(cookie);

            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(ServiceError::InvalidCredentials) => {
            let template = LoginTemplate {
                error: "Invalid credentials".to_string(),
                username: form.username,
            };
            Ok((StatusCode::UNAUTHORIZED, template).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn logout(cookies: Cookies) -> impl IntoResponse {
    cookies.remove(Cookie::build((AUTH_COOKIE, "")).path("/").build());
    Redirect::to("/login")
}
