// src/models/pipeline.rs

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::lead::{Lead, LeadStage};

// Quadro kanban: projeção derivada, reconstruída a cada leitura.
// Serializa como { "NEW": [...], "CONTACTED": [...], ... }
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct KanbanBoard {
    #[serde(rename = "NEW")]
    pub new: Vec<Lead>,
    #[serde(rename = "CONTACTED")]
    pub contacted: Vec<Lead>,
    #[serde(rename = "QUALIFIED")]
    pub qualified: Vec<Lead>,
    #[serde(rename = "PROPOSAL")]
    pub proposal: Vec<Lead>,
    #[serde(rename = "WON")]
    pub won: Vec<Lead>,
    #[serde(rename = "LOST")]
    pub lost: Vec<Lead>,
}

impl KanbanBoard {
    pub fn column(&self, stage: LeadStage) -> &[Lead] {
        match stage {
            LeadStage::New => &self.new,
            LeadStage::Contacted => &self.contacted,
            LeadStage::Qualified => &self.qualified,
            LeadStage::Proposal => &self.proposal,
            LeadStage::Won => &self.won,
            LeadStage::Lost => &self.lost,
        }
    }

    pub fn column_mut(&mut self, stage: LeadStage) -> &mut Vec<Lead> {
        match stage {
            LeadStage::New => &mut self.new,
            LeadStage::Contacted => &mut self.contacted,
            LeadStage::Qualified => &mut self.qualified,
            LeadStage::Proposal => &mut self.proposal,
            LeadStage::Won => &mut self.won,
            LeadStage::Lost => &mut self.lost,
        }
    }

    pub fn total(&self) -> usize {
        LeadStage::ALL.iter().map(|s| self.column(*s).len()).sum()
    }
}

// Resultado puro da triagem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageOutcome {
    pub score: i32,
    pub recommended_stage: Option<LeadStage>,
}

// Indicadores da tela de métricas
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsOverview {
    pub total_leads: usize,
    pub won_leads: usize,
    // Percentual (0..=100)
    pub conversion_rate: f64,
    pub qualified_sessions: u64,
    pub leads_by_stage: BTreeMap<LeadStage, usize>,
}
