// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::CurrentUser,
};

// Valida o Bearer token e deixa o `CurrentUser` nos extensions da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());

    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        tracing::debug!(path = %request.uri().path(), "Requisição sem Bearer token");
        return Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n));
    };

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(user) => Ok(AuthenticatedUser(user.clone())),
            None => {
                let app_state = AppState::from_ref(state);
                Err(AppError::InvalidToken
                    .to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n))
            }
        }
    }
}
