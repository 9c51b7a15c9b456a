// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::get_kanban,
        handlers::leads::update_stage,
        handlers::leads::triage_lead,

        // --- Clientes ---
        handlers::clients::convert_lead,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::send_message,

        // --- Métricas ---
        handlers::metrics::get_overview,
    ),
    components(
        schemas(
            // --- Leads ---
            models::lead::LeadSource,
            models::lead::LeadStage,
            models::lead::PropertyType,
            models::lead::Lead,
            models::lead::TriageSubmission,
            models::lead::TriageSession,

            // --- Clientes ---
            models::client::ContactChannel,
            models::client::Client,
            models::client::OutboundMessage,

            // --- Funil ---
            models::pipeline::KanbanBoard,
            models::pipeline::MetricsOverview,

            // --- Payloads ---
            handlers::leads::CreateLeadPayload,
            handlers::leads::UpdateStagePayload,
            handlers::clients::ConvertLeadPayload,
            handlers::clients::SendMessagePayload,
        )
    ),
    tags(
        (name = "Leads", description = "Captação, triagem e funil de vendas"),
        (name = "Clientes", description = "Clientes convertidos e mensagens"),
        (name = "Métricas", description = "Indicadores do funil")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/leads",
            "/api/leads/kanban",
            "/api/leads/{id}",
            "/api/leads/{id}/stage",
            "/api/leads/{id}/triage",
            "/api/clients",
            "/api/clients/from-lead/{leadId}",
            "/api/clients/{id}",
            "/api/clients/{id}/messages",
            "/api/admin/metrics/overview",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota sem doc: {path}");
        }
    }
}
