// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use serde_json::json;

// O frontend envia os canais em minúsculas ("whatsapp", "email"...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contact_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactChannel {
    #[default]
    Whatsapp,
    Email,
    Sms,
    Phone,
}

// --- CLIENTE (lead convertido) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Maria da Silva")]
    pub name: String,
    #[schema(example = "maria@email.com")]
    pub email: String,
    #[schema(example = "11987654321")]
    pub phone: String,
    #[schema(example = "Curitiba")]
    pub city: Option<String>,
    pub preferred_channel: ContactChannel,
    #[schema(example = json!(["vip"]))]
    pub tags: Vec<String>,
    // Só proveniência ("convertido do lead X"), nunca posse
    pub lead_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- MENSAGENS ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub id: Uuid,
    pub client_id: Uuid,
    pub channel: ContactChannel,
    #[schema(example = "Olá! Temos novidades para você.")]
    pub content: String,
    pub sent_at: DateTime<Utc>,
}
