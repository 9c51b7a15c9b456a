// src/handlers/clients.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::ApiError,
        extract::{ApiPath, ValidatedJson},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::client::{Client, ContactChannel, OutboundMessage},
    pipeline::conversion::ConversionRequest,
    services::client_service::MAX_MESSAGE_CHARS,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertLeadPayload {
    pub preferred_channel: Option<ContactChannel>,
    #[schema(example = json!(["vip", "investidor"]))]
    pub tags: Option<Vec<String>>,
}

// POST /api/clients/from-lead/{leadId}
#[utoipa::path(
    post,
    path = "/api/clients/from-lead/{leadId}",
    tag = "Clientes",
    params(("leadId" = Uuid, Path, description = "ID do lead a converter")),
    request_body = ConvertLeadPayload,
    responses(
        (status = 201, description = "Cliente criado e lead em WON", body = Client),
        (status = 404, description = "Lead não encontrado"),
        (status = 409, description = "Lead perdido ou já convertido")
    ),
    security(("api_jwt" = []))
)]
pub async fn convert_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(lead_id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ConvertLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = ConversionRequest {
        preferred_channel: payload.preferred_channel,
        tags: payload.tags,
    };

    let client = app_state
        .client_service
        .convert_lead(&user, lead_id, request)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    responses((status = 200, body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .client_service
        .list_clients(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state
        .client_service
        .get_client(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::OK, Json(client)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    // Sem canal, usa o preferido do cliente
    pub channel: Option<ContactChannel>,

    #[validate(length(min = 1, max = MAX_MESSAGE_CHARS, message = "length"))]
    #[schema(example = "Olá! Temos um imóvel novo no seu perfil.")]
    pub content: String,
}

// POST /api/clients/{id}/messages
#[utoipa::path(
    post,
    path = "/api/clients/{id}/messages",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem despachada e registrada", body = OutboundMessage),
        (status = 400, description = "Conteúdo vazio ou longo demais"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .client_service
        .send_message(&user, id, payload.channel, &payload.content)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n))?;

    Ok((StatusCode::CREATED, Json(message)))
}
