// src/models/lead.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Canal de aquisição. Fixado na criação do lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_source", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeadSource {
    Website,
    Whatsapp,
    Instagram,
    Referral,
    Manual,
}

// Posição do lead no funil. Só muda através de `pipeline::stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_stage", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeadStage {
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
}

impl LeadStage {
    /// As seis colunas do kanban, na ordem de exibição.
    pub const ALL: [LeadStage; 6] = [
        LeadStage::New,
        LeadStage::Contacted,
        LeadStage::Qualified,
        LeadStage::Proposal,
        LeadStage::Won,
        LeadStage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Contacted => "CONTACTED",
            Self::Qualified => "QUALIFIED",
            Self::Proposal => "PROPOSAL",
            Self::Won => "WON",
            Self::Lost => "LOST",
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Won | Self::Lost => true,
            Self::New | Self::Contacted | Self::Qualified | Self::Proposal => false,
        }
    }

    /// Índice da coluna no quadro (0..=5).
    pub fn position(&self) -> usize {
        match self {
            Self::New => 0,
            Self::Contacted => 1,
            Self::Qualified => 2,
            Self::Proposal => 3,
            Self::Won => 4,
            Self::Lost => 5,
        }
    }
}

// Tipo de imóvel de interesse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    House,
    Apartment,
    Commercial,
    Land,
    Studio,
}

// --- LEAD ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Maria da Silva")]
    pub name: String,
    #[schema(example = "11987654321")]
    pub phone: String,
    #[schema(example = "maria@email.com")]
    pub email: String,
    pub source: LeadSource,
    pub stage: LeadStage,
    pub interest_type: PropertyType,
    #[schema(example = "300000")]
    pub budget_min: Option<Decimal>,
    #[schema(example = "500000")]
    pub budget_max: Option<Decimal>,
    #[schema(example = "Curitiba")]
    pub city_preference: Option<String>,
    pub notes: Option<String>,
    // Calculado pela triagem, nunca informado pelo chamador
    #[schema(example = 72)]
    pub score: Option<i32>,
    // Controle otimista: incrementa a cada escrita
    #[schema(example = 1)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados já validados para inserir um lead novo
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub source: LeadSource,
    pub interest_type: PropertyType,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub city_preference: Option<String>,
    pub notes: Option<String>,
}

// --- TRIAGEM ---

// Entrada transitória da triagem. `budget` é um valor único,
// diferente da faixa budgetMin/budgetMax do lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriageSubmission {
    pub interest_type: PropertyType,
    #[schema(example = "450000")]
    pub budget: Decimal,
    #[schema(example = "Curitiba")]
    pub city_preference: Option<String>,
    #[schema(example = true)]
    pub financing_approved: Option<bool>,
    #[schema(example = 4)]
    pub urgency: Option<i32>,
    #[validate(length(max = 2000, message = "too_long"))]
    #[schema(example = "Procura 3 quartos perto do metrô")]
    pub summary: Option<String>,
}

// Registro de uma sessão de triagem (alimenta `qualifiedSessions`)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriageSession {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub interest_type: PropertyType,
    pub budget: Decimal,
    pub city_preference: Option<String>,
    pub financing_approved: Option<bool>,
    pub urgency: Option<i32>,
    pub summary: Option<String>,
    pub score: i32,
    pub resulting_stage: LeadStage,
    pub created_at: DateTime<Utc>,
}
