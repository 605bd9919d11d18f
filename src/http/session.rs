use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::AuthError;
use crate::state::AppState;

use super::HttpError;

/// Intern id resolved from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedIntern(pub i32);

impl FromRequestParts<AppState> for AuthenticatedIntern {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::NotAuthenticated)?;

        let intern_id = state.tokens.validate(token)?;
        Ok(Self(intern_id))
    }
}
