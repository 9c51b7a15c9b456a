// src/handlers/leads.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::ApiError,
        extract::{ApiPath, ValidatedJson, ValidatedQuery},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        lead::{Lead, LeadSource, LeadStage, NewLead, PropertyType, TriageSubmission},
        pipeline::KanbanBoard,
    },
};

// =============================================================================
//  ÁREA 1: CAPTAÇÃO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[validate(length(min = 10, message = "too_short"))]
    #[schema(example = "11987654321")]
    pub phone: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@email.com")]
    pub email: String,

    pub source: LeadSource,
    pub interest_type: PropertyType,

    #[schema(example = "300000")]
    pub budget_min: Option<Decimal>,
    #[schema(example = "500000")]
    pub budget_max: Option<Decimal>,

    #[validate(length(max = 120, message = "too_long"))]
    #[schema(example = "Curitiba")]
    pub city_preference: Option<String>,

    #[validate(length(max = 4000, message = "too_long"))]
    pub notes: Option<String>,
}

impl From<CreateLeadPayload> for NewLead {
    fn from(p: CreateLeadPayload) -> Self {
        NewLead {
            name: p.name,
            phone: p.phone,
            email: p.email,
            source: p.source,
            interest_type: p.interest_type,
            budget_min: p.budget_min,
            budget_max: p.budget_max,
            city_preference: p.city_preference,
            notes: p.notes,
        }
    }
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado no estágio NEW", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Requer papel ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .create_lead(&user, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::CREATED, Json(lead)))
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsQuery {
    /// Filtra por estágio (ex: QUALIFIED)
    pub stage: Option<LeadStage>,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "Leads ordenados por criação", body = Vec<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<ListLeadsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = app_state
        .lead_service
        .list_leads(&user, query.stage)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(leads)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .get_lead(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(lead)))
}

// =============================================================================
//  ÁREA 2: FUNIL
// =============================================================================

// GET /api/leads/kanban
#[utoipa::path(
    get,
    path = "/api/leads/kanban",
    tag = "Leads",
    responses(
        (status = 200, description = "Uma coluna por estágio, todas sempre presentes", body = KanbanBoard)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_kanban(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let board = app_state
        .lead_service
        .kanban_board(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(board)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStagePayload {
    #[schema(example = "CONTACTED")]
    pub stage: LeadStage,
}

// PATCH /api/leads/{id}/stage
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/stage",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateStagePayload,
    responses(
        (status = 200, description = "Lead no estágio pedido", body = Lead),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead em estágio terminal ou alterado concorrentemente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stage(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .set_lead_stage(&user, id, payload.stage)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/leads/{id}/triage
#[utoipa::path(
    post,
    path = "/api/leads/{id}/triage",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = TriageSubmission,
    responses(
        (status = 200, description = "Lead pontuado e, se for o caso, avançado", body = Lead),
        (status = 400, description = "Orçamento ou urgência inválidos"),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead em estágio terminal")
    ),
    security(("api_jwt" = []))
)]
pub async fn triage_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(submission): ValidatedJson<TriageSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .triage_lead(&user, id, submission)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(lead)))
}
