// src/services/client_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::{
        auth::CurrentUser,
        client::{Client, ContactChannel, OutboundMessage},
    },
    pipeline::conversion::{self, ConversionRequest},
    services::gateway::OutboundGateway,
};

pub const MAX_MESSAGE_CHARS: u64 = 2000;

#[derive(Clone)]
pub struct ClientService {
    store: Arc<dyn CrmStore>,
    gateway: Arc<dyn OutboundGateway>,
}

impl ClientService {
    pub fn new(store: Arc<dyn CrmStore>, gateway: Arc<dyn OutboundGateway>) -> Self {
        Self { store, gateway }
    }

    // =========================================================================
    //  CONVERSÃO LEAD -> CLIENTE
    // =========================================================================

    /// Cria o cliente e leva o lead a WON numa única escrita atômica.
    pub async fn convert_lead(
        &self,
        actor: &CurrentUser,
        lead_id: Uuid,
        request: ConversionRequest,
    ) -> Result<Client, AppError> {
        actor.require_admin()?;

        let lead = self
            .store
            .find_lead(lead_id)
            .await?
            .ok_or(AppError::LeadNotFound(lead_id))?;

        if self.store.find_client_by_lead(lead_id).await?.is_some() {
            tracing::warn!(lead_id = %lead_id, "Conversão rejeitada: lead já possui cliente");
            return Err(AppError::AlreadyConverted(lead_id));
        }

        let plan = conversion::plan_conversion(&lead, request, Utc::now())?;
        let (client, won) = self
            .store
            .convert_lead(&plan.client, &plan.lead, lead.version)
            .await?;

        tracing::info!(
            lead_id = %lead_id,
            client_id = %client.id,
            from = ?lead.stage,
            to = ?won.stage,
            user_id = %actor.id,
            "🤝 Lead convertido em cliente"
        );
        Ok(client)
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_clients(&self, actor: &CurrentUser) -> Result<Vec<Client>, AppError> {
        tracing::debug!(user_id = %actor.id, "Listando clientes");
        self.store.list_clients().await
    }

    pub async fn get_client(&self, actor: &CurrentUser, id: Uuid) -> Result<Client, AppError> {
        tracing::debug!(user_id = %actor.id, client_id = %id, "Buscando cliente");
        self.store
            .find_client(id)
            .await?
            .ok_or(AppError::ClientNotFound(id))
    }

    /// Despacha pelo gateway e registra o envio.
    /// Sem canal explícito, usa o canal preferido do cliente.
    /// Se o registro falhar depois do despacho, o id da mensagem enviada vai para o log de erro.
    pub async fn send_message(
        &self,
        actor: &CurrentUser,
        client_id: Uuid,
        channel: Option<ContactChannel>,
        content: &str,
    ) -> Result<OutboundMessage, AppError> {
        actor.require_admin()?;

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::invalid_field("content", "required"));
        }
        if content.chars().count() as u64 > MAX_MESSAGE_CHARS {
            return Err(AppError::invalid_field("content", "too_long"));
        }

        let client = self
            .store
            .find_client(client_id)
            .await?
            .ok_or(AppError::ClientNotFound(client_id))?;

        let message = OutboundMessage {
            id: Uuid::new_v4(),
            client_id,
            channel: channel.unwrap_or(client.preferred_channel),
            content: content.to_string(),
            sent_at: Utc::now(),
        };

        self.gateway.dispatch(&client, &message).await?;
        let saved = self
            .store
            .insert_outbound_message(&message)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    client_id = %client_id,
                    message_id = %message.id,
                    channel = ?message.channel,
                    error = ?e,
                    "🔥 Mensagem despachada mas não registrada: não reenviar"
                );
            })?;

        tracing::info!(client_id = %client_id, message_id = %saved.id, user_id = %actor.id, "Mensagem registrada");
        Ok(saved)
    }
}
