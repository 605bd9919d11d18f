use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::{self, Credentials, Signup};
use crate::state::AppState;

use super::HttpError;
use super::pages::login_page;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/", get(login_page).post(login))
        .route("/signup/", post(signup))
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    token_type: &'static str,
    expires_in: i64,
    intern_id: i32,
}

#[derive(Debug, Serialize)]
struct SignupResponse {
    message: &'static str,
    user_id: i32,
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, HttpError> {
    let Json(credentials) = payload?;
    let session = auth::authenticate(&state.database, &state.tokens, credentials).await?;

    Ok(Json(LoginResponse {
        token: session.token,
        token_type: "Bearer",
        expires_in: session.expires_in,
        intern_id: session.intern_id,
    }))
}

async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Signup>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), HttpError> {
    let Json(request) = payload?;
    let intern = auth::register(&state.database, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Signup successful",
            user_id: intern.id,
        }),
    ))
}
