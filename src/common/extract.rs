// src/common/extract.rs

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

/// Corpo JSON desserializado e validado.
/// JSON quebrado e enums desconhecidos viram 400, não o 422 padrão do axum.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(req.headers());

        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "Payload rejeitado");
            AppError::MalformedPayload(rejection.body_text()).to_api_error(&locale, &app_state.i18n)
        })?;

        value
            .validate()
            .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

        Ok(ValidatedJson(value))
    }
}

/// Parâmetros de rota (ex: UUID) com erro 400 no mesmo formato `{error, details}`.
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                let app_state = AppState::from_ref(state);
                let locale = Locale::from_headers(&parts.headers);
                tracing::debug!(reason = %rejection.body_text(), "Parâmetro de rota rejeitado");
                Err(AppError::MalformedPayload(rejection.body_text())
                    .to_api_error(&locale, &app_state.i18n))
            }
        }
    }
}

/// Query string desserializada, com o mesmo contrato de erro do corpo.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let Query(value) = Query::<T>::from_request_parts(parts, state).await.map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "Query rejeitada");
            AppError::MalformedPayload(rejection.body_text()).to_api_error(&locale, &app_state.i18n)
        })?;

        value
            .validate()
            .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n))?;

        Ok(ValidatedQuery(value))
    }
}
