// src/handlers/metrics.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::pipeline::MetricsOverview,
};

// GET /api/admin/metrics/overview
#[utoipa::path(
    get,
    path = "/api/admin/metrics/overview",
    tag = "Métricas",
    responses(
        (status = 200, description = "Totais do funil e taxa de conversão", body = MetricsOverview)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .metrics_service
        .overview(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(overview)))
}
