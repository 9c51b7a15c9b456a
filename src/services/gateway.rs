// src/services/gateway.rs

use async_trait::async_trait;

use crate::{common::error::AppError, models::client::{Client, OutboundMessage}};

/// Gateway de comunicação externa (WhatsApp, e-mail, SMS...).
#[async_trait]
pub trait OutboundGateway: Send + Sync {
    async fn dispatch(&self, client: &Client, message: &OutboundMessage) -> Result<(), AppError>;
}

// Sem provedor configurado: só registra o envio no log
#[derive(Debug, Clone, Default)]
pub struct TracingGateway;

#[async_trait]
impl OutboundGateway for TracingGateway {
    async fn dispatch(&self, client: &Client, message: &OutboundMessage) -> Result<(), AppError> {
        tracing::info!(
            client_id = %client.id,
            message_id = %message.id,
            channel = ?message.channel,
            chars = message.content.chars().count(),
            "📨 Mensagem despachada"
        );
        Ok(())
    }
}
