// src/services/lead_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::{
        auth::CurrentUser,
        lead::{Lead, LeadStage, NewLead, TriageSession, TriageSubmission},
        pipeline::KanbanBoard,
    },
    pipeline::{
        kanban,
        scoring::{self, LeadScorer},
        stage,
    },
};

#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn CrmStore>,
    scorer: Arc<dyn LeadScorer>,
}

// Campo de texto opcional: vazio vira None
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn append_note(notes: Option<String>, summary: &str) -> Option<String> {
    match notes {
        Some(existing) if !existing.trim().is_empty() => Some(format!("{existing}\n\n{summary}")),
        _ => Some(summary.to_string()),
    }
}

/// Regras de entrada do lead que o `validator` não cobre.
fn check_intake(lead: &NewLead) -> Result<(), AppError> {
    if lead.name.trim().is_empty() {
        return Err(AppError::invalid_field("name", "required"));
    }
    if lead.phone.trim().is_empty() {
        return Err(AppError::invalid_field("phone", "required"));
    }
    if lead.phone.trim().chars().count() < 10 {
        return Err(AppError::invalid_field("phone", "too_short"));
    }
    if lead.email.trim().is_empty() {
        return Err(AppError::invalid_field("email", "required"));
    }
    if lead.budget_min.is_some_and(|b| b < Decimal::ZERO) {
        return Err(AppError::invalid_field("budgetMin", "must_be_non_negative"));
    }
    if lead.budget_max.is_some_and(|b| b < Decimal::ZERO) {
        return Err(AppError::invalid_field("budgetMax", "must_be_non_negative"));
    }
    if let Some(min) = lead.budget_min {
        scoring::check_budget_bounds("budgetMin", min)?;
    }
    if let Some(max) = lead.budget_max {
        scoring::check_budget_bounds("budgetMax", max)?;
    }
    if let (Some(min), Some(max)) = (lead.budget_min, lead.budget_max) {
        if min > max {
            return Err(AppError::invalid_field("budgetMax", "below_budget_min"));
        }
    }
    Ok(())
}

impl LeadService {
    pub fn new(store: Arc<dyn CrmStore>, scorer: Arc<dyn LeadScorer>) -> Self {
        Self { store, scorer }
    }

    async fn load(&self, id: Uuid) -> Result<Lead, AppError> {
        self.store.find_lead(id).await?.ok_or(AppError::LeadNotFound(id))
    }

    // =========================================================================
    //  CAPTAÇÃO
    // =========================================================================

    pub async fn create_lead(&self, actor: &CurrentUser, data: NewLead) -> Result<Lead, AppError> {
        actor.require_admin()?;
        check_intake(&data)?;

        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            name: data.name.trim().to_string(),
            phone: data.phone.trim().to_string(),
            email: data.email.trim().to_string(),
            source: data.source,
            stage: LeadStage::New,
            interest_type: data.interest_type,
            budget_min: data.budget_min,
            budget_max: data.budget_max,
            city_preference: non_blank(data.city_preference),
            notes: non_blank(data.notes),
            score: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let lead = self.store.insert_lead(&lead).await?;
        tracing::info!(lead_id = %lead.id, source = ?lead.source, user_id = %actor.id, "🆕 Lead criado");
        Ok(lead)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list_leads(
        &self,
        actor: &CurrentUser,
        stage: Option<LeadStage>,
    ) -> Result<Vec<Lead>, AppError> {
        tracing::debug!(user_id = %actor.id, stage = ?stage, "Listando leads");
        self.store.list_leads(stage).await
    }

    pub async fn get_lead(&self, actor: &CurrentUser, id: Uuid) -> Result<Lead, AppError> {
        tracing::debug!(user_id = %actor.id, lead_id = %id, "Buscando lead");
        self.load(id).await
    }

    pub async fn kanban_board(&self, actor: &CurrentUser) -> Result<KanbanBoard, AppError> {
        tracing::debug!(user_id = %actor.id, "Montando kanban");
        let leads = self.store.list_leads(None).await?;
        Ok(kanban::project(leads))
    }

    // =========================================================================
    //  TRANSIÇÕES
    // =========================================================================

    /// Caminho manual (arrastar no quadro). Mesmo estágio = sucesso sem escrita.
    pub async fn set_lead_stage(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        to: LeadStage,
    ) -> Result<Lead, AppError> {
        actor.require_admin()?;
        let lead = self.load(id).await?;

        let Some(next) = stage::apply_transition(&lead, to, Utc::now()).inspect_err(|_| {
            tracing::warn!(lead_id = %id, from = ?lead.stage, to = ?to, "Transição rejeitada");
        })?
        else {
            return Ok(lead);
        };

        let saved = self.store.update_lead(&next, lead.version).await?;
        tracing::info!(
            lead_id = %id,
            from = ?lead.stage,
            to = ?saved.stage,
            user_id = %actor.id,
            "🔀 Estágio do lead atualizado"
        );
        Ok(saved)
    }

    /// Caminho automático: avalia, aplica a recomendação e grava a pontuação.
    pub async fn triage_lead(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        submission: TriageSubmission,
    ) -> Result<Lead, AppError> {
        actor.require_admin()?;
        let lead = self.load(id).await?;

        let outcome = self.scorer.evaluate(&lead, &submission)?;

        // Triagem em lead encerrado também é uma tentativa de transição
        if lead.stage.is_terminal() {
            tracing::warn!(lead_id = %id, stage = ?lead.stage, "Triagem rejeitada em lead encerrado");
            return Err(AppError::InvalidTransition {
                from: lead.stage,
                to: outcome.recommended_stage.unwrap_or(lead.stage),
            });
        }

        let now = Utc::now();
        let mut next = match outcome.recommended_stage {
            Some(to) => stage::apply_transition(&lead, to, now)?.unwrap_or_else(|| lead.clone()),
            None => lead.clone(),
        };
        next.score = Some(outcome.score);
        next.interest_type = submission.interest_type;
        if let Some(city) = non_blank(submission.city_preference.clone()) {
            next.city_preference = Some(city);
        }
        if let Some(summary) = non_blank(submission.summary.clone()) {
            next.notes = append_note(next.notes.take(), &summary);
        }
        next.updated_at = now;

        let session = TriageSession {
            id: Uuid::new_v4(),
            lead_id: lead.id,
            interest_type: submission.interest_type,
            budget: submission.budget,
            city_preference: submission.city_preference,
            financing_approved: submission.financing_approved,
            urgency: submission.urgency,
            summary: submission.summary,
            score: outcome.score,
            resulting_stage: next.stage,
            created_at: now,
        };

        let saved = self.store.record_triage(&next, lead.version, &session).await?;
        tracing::info!(
            lead_id = %id,
            score = outcome.score,
            from = ?lead.stage,
            to = ?saved.stage,
            user_id = %actor.id,
            "🎯 Triagem registrada"
        );
        Ok(saved)
    }
}
