// src/pipeline/conversion.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::client::{Client, ContactChannel};
use crate::models::lead::{Lead, LeadStage};
use crate::pipeline::stage;

#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    pub preferred_channel: Option<ContactChannel>,
    pub tags: Option<Vec<String>>,
}

/// Resultado da conversão: o cliente novo e o lead já em WON,
/// para serem gravados juntos.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub client: Client,
    pub lead: Lead,
}

// Tags são um conjunto: remove vazias e repetidas, preserva a primeira ocorrência
fn normalize_tags(tags: Option<Vec<String>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags.unwrap_or_default() {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Converter é a ação que leva o lead a WON.
/// Um lead que já está em WON (arrastado manualmente) e ainda não tem
/// cliente também pode ser convertido; de LOST não há saída.
pub fn plan_conversion(
    lead: &Lead,
    request: ConversionRequest,
    now: DateTime<Utc>,
) -> Result<ConversionPlan, AppError> {
    let mut won = match lead.stage {
        LeadStage::Won => lead.clone(),
        _ => stage::apply_transition(lead, LeadStage::Won, now)?
            .unwrap_or_else(|| lead.clone()),
    };
    won.updated_at = now;

    let client = Client {
        id: Uuid::new_v4(),
        name: lead.name.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone(),
        city: lead.city_preference.clone(),
        preferred_channel: request.preferred_channel.unwrap_or_default(),
        tags: normalize_tags(request.tags),
        lead_id: Some(lead.id),
        created_at: now,
        updated_at: now,
    };

    Ok(ConversionPlan { client, lead: won })
}
