// src/pipeline/stage.rs

use chrono::{DateTime, Utc};

use crate::common::error::AppError;
use crate::models::lead::{Lead, LeadStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    // Mesmo estágio: sucesso sem escrita (updatedAt não muda)
    Unchanged,
    Move { from: LeadStage, to: LeadStage },
}

/// Única regra do funil: nada sai de WON ou LOST.
/// Entre NEW, CONTACTED, QUALIFIED e PROPOSAL o movimento é livre,
/// e qualquer um deles pode ir para WON ou LOST.
pub fn validate_transition(from: LeadStage, to: LeadStage) -> Result<Transition, AppError> {
    match from {
        LeadStage::Won | LeadStage::Lost => Err(AppError::InvalidTransition { from, to }),
        LeadStage::New | LeadStage::Contacted | LeadStage::Qualified | LeadStage::Proposal => {
            if from == to {
                Ok(Transition::Unchanged)
            } else {
                Ok(Transition::Move { from, to })
            }
        }
    }
}

/// Monta a versão candidata do lead no novo estágio.
/// Retorna `None` quando não há nada para gravar.
pub fn apply_transition(
    lead: &Lead,
    to: LeadStage,
    now: DateTime<Utc>,
) -> Result<Option<Lead>, AppError> {
    match validate_transition(lead.stage, to)? {
        Transition::Unchanged => Ok(None),
        Transition::Move { to, .. } => {
            let mut next = lead.clone();
            next.stage = to;
            next.updated_at = now;
            Ok(Some(next))
        }
    }
}
