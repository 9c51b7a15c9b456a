// src/pipeline/scoring.rs

//! Avaliador de triagem.
//!
//! A fórmula é uma política trocável ([`LeadScorer`]); a padrão
//! ([`WeightedScorer`]) soma contribuições independentes e não negativas,
//! então aumentar orçamento, urgência ou aprovar o financiamento nunca
//! diminui a pontuação:
//!
//! ```text
//! score = min(floor(budget / budget_step) * budget_points_per_step, budget_cap)
//!       + urgency * urgency_weight                  (urgência ausente = 0)
//!       + financing_bonus      se financingApproved == true
//!       + floor_match_bonus    se budget alcança o piso declarado pelo lead
//!       + completeness_bonus   se há cidade preferida (triagem ou lead)
//!       + completeness_bonus   se há resumo não vazio
//! ```
//!
//! Recomendação: `score >= qualified_threshold` sugere QUALIFIED, senão
//! CONTACTED. Só recomenda avançar; nunca sugere voltar de coluna.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::models::lead::{Lead, LeadStage, TriageSubmission};
use crate::models::pipeline::TriageOutcome;

pub const MIN_URGENCY: i32 = 1;
pub const MAX_URGENCY: i32 = 5;

// Limites da coluna NUMERIC(14, 2): até 999_999_999_999.99
pub const MAX_BUDGET: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);
pub const BUDGET_SCALE: u32 = 2;

/// Política de pontuação trocável. Implementações devem ser puras.
pub trait LeadScorer: Send + Sync {
    fn evaluate(&self, lead: &Lead, submission: &TriageSubmission) -> Result<TriageOutcome, AppError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    pub budget_step: Decimal,
    pub budget_points_per_step: i32,
    pub budget_cap: i32,
    pub urgency_weight: i32,
    pub financing_bonus: i32,
    pub floor_match_bonus: i32,
    pub completeness_bonus: i32,
    pub qualified_threshold: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            budget_step: Decimal::from(50_000),
            budget_points_per_step: 2,
            budget_cap: 40,
            urgency_weight: 8,
            financing_bonus: 20,
            floor_match_bonus: 10,
            completeness_bonus: 5,
            qualified_threshold: 60,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    policy: ScoringPolicy,
}

impl WeightedScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    fn budget_points(&self, budget: Decimal) -> i32 {
        let steps = budget
            .checked_div(self.policy.budget_step)
            .unwrap_or(Decimal::ZERO)
            .floor();
        let cap = Decimal::from(self.policy.budget_cap);
        let points = (steps * Decimal::from(self.policy.budget_points_per_step)).min(cap);
        points.to_i32().unwrap_or(self.policy.budget_cap)
    }

    // Piso = menor limite declarado (faixas invertidas de dados antigos
    // são normalizadas aqui). Comparar só com o piso mantém a monotonia.
    fn meets_declared_floor(lead: &Lead, budget: Decimal) -> bool {
        let floor = match (lead.budget_min, lead.budget_max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        floor.is_some_and(|f| budget >= f)
    }

    fn recommend(&self, current: LeadStage, score: i32) -> Option<LeadStage> {
        if current.is_terminal() {
            return None;
        }
        let target = if score >= self.policy.qualified_threshold {
            LeadStage::Qualified
        } else {
            LeadStage::Contacted
        };
        (target.position() > current.position()).then_some(target)
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Orçamento precisa caber no armazenamento sem arredondar nem estourar.
pub fn check_budget_bounds(field: &'static str, budget: Decimal) -> Result<(), AppError> {
    if budget.abs() > MAX_BUDGET {
        return Err(AppError::invalid_field(field, "too_large"));
    }
    if budget.normalize().scale() > BUDGET_SCALE {
        return Err(AppError::invalid_field(field, "too_many_decimals"));
    }
    Ok(())
}

/// Valida a submissão antes de qualquer cálculo.
pub fn validate_submission(submission: &TriageSubmission) -> Result<(), AppError> {
    if submission.budget <= Decimal::ZERO {
        return Err(AppError::invalid_field("budget", "must_be_positive"));
    }
    check_budget_bounds("budget", submission.budget)?;
    if let Some(urgency) = submission.urgency {
        if !(MIN_URGENCY..=MAX_URGENCY).contains(&urgency) {
            return Err(AppError::invalid_field("urgency", "out_of_range"));
        }
    }
    Ok(())
}

impl LeadScorer for WeightedScorer {
    fn evaluate(&self, lead: &Lead, submission: &TriageSubmission) -> Result<TriageOutcome, AppError> {
        validate_submission(submission)?;
        let p = &self.policy;

        // Soma satura em i32::MAX
        let mut score = self.budget_points(submission.budget);
        score = score.saturating_add(submission.urgency.unwrap_or(0).saturating_mul(p.urgency_weight));

        if submission.financing_approved == Some(true) {
            score = score.saturating_add(p.financing_bonus);
        }
        if Self::meets_declared_floor(lead, submission.budget) {
            score = score.saturating_add(p.floor_match_bonus);
        }
        if has_text(submission.city_preference.as_deref()) || has_text(lead.city_preference.as_deref()) {
            score = score.saturating_add(p.completeness_bonus);
        }
        if has_text(submission.summary.as_deref()) {
            score = score.saturating_add(p.completeness_bonus);
        }

        Ok(TriageOutcome {
            score,
            recommended_stage: self.recommend(lead.stage, score),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::lead::{LeadSource, PropertyType};
    use chrono::Utc;
    use uuid::Uuid;

    pub(crate) fn sample_lead(stage: LeadStage) -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            name: "Ana Souza".into(),
            phone: "41999990000".into(),
            email: "ana@example.com".into(),
            source: LeadSource::Website,
            stage,
            interest_type: PropertyType::Apartment,
            budget_min: Some(Decimal::from(300_000)),
            budget_max: Some(Decimal::from(500_000)),
            city_preference: None,
            notes: None,
            score: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(budget: i64, urgency: Option<i32>, financing: Option<bool>) -> TriageSubmission {
        TriageSubmission {
            interest_type: PropertyType::Apartment,
            budget: Decimal::from(budget),
            city_preference: None,
            financing_approved: financing,
            urgency,
            summary: None,
        }
    }

    #[test]
    fn same_input_same_score() {
        let scorer = WeightedScorer::default();
        let lead = sample_lead(LeadStage::New);
        let sub = submission(450_000, Some(3), Some(true));

        let a = scorer.evaluate(&lead, &sub).unwrap();
        let b = scorer.evaluate(&lead, &sub).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn urgent_financed_lead_scores_higher() {
        let scorer = WeightedScorer::default();
        let lead = sample_lead(LeadStage::New);

        let hot = scorer.evaluate(&lead, &submission(450_000, Some(5), Some(true))).unwrap();
        let cold = scorer.evaluate(&lead, &submission(450_000, Some(1), Some(false))).unwrap();

        assert!(hot.score > cold.score);
        assert_eq!(hot.score, 88);
        assert_eq!(cold.score, 36);
    }

    #[test]
    fn each_factor_is_monotonic() {
        let scorer = WeightedScorer::default();
        let lead = sample_lead(LeadStage::New);
        let score = |b, u, f| scorer.evaluate(&lead, &submission(b, u, f)).unwrap().score;

        for budget in [10_000, 100_000, 250_000, 300_000, 500_000, 1_000_000, 50_000_000] {
            assert!(score(budget * 2, Some(3), None) >= score(budget, Some(3), None));
        }
        for u in MIN_URGENCY..MAX_URGENCY {
            assert!(score(200_000, Some(u + 1), None) > score(200_000, Some(u), None));
        }
        assert!(score(200_000, Some(2), Some(true)) > score(200_000, Some(2), Some(false)));
    }

    #[test]
    fn budget_points_are_capped() {
        let scorer = WeightedScorer::default();
        let lead = sample_lead(LeadStage::New);
        let huge = scorer.evaluate(&lead, &submission(900_000_000, None, None)).unwrap();
        let p = scorer.policy();
        assert_eq!(huge.score, p.budget_cap + p.floor_match_bonus);
    }

    #[test]
    fn zero_or_negative_budget_is_rejected() {
        let scorer = WeightedScorer::default();
        let lead = sample_lead(LeadStage::New);

        for budget in [0, -1, -450_000] {
            let err = scorer.evaluate(&lead, &submission(budget, Some(3), None)).unwrap_err();
            assert!(matches!(err, AppError::InvalidField { field: "budget", .. }));
        }
    }

    #[test]
    fn budget_must_fit_storage() {
        let scorer = WeightedScorer::default();
        let lead = sample_lead(LeadStage::New);
        assert_eq!(MAX_BUDGET.to_string(), "999999999999.99");

        let mut sub = submission(450_000, Some(3), None);
        sub.budget = Decimal::from(1_000_000_000_000i64);
        let err = scorer.evaluate(&lead, &sub).unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "budget", code: "too_large" }));

        sub.budget = Decimal::new(450_000_125, 3);
        let err = scorer.evaluate(&lead, &sub).unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "budget", code: "too_many_decimals" }));

        // Zeros à direita não contam como casas extras
        sub.budget = Decimal::new(450_000_000, 3);
        assert!(scorer.evaluate(&lead, &sub).is_ok());
        sub.budget = MAX_BUDGET;
        assert!(scorer.evaluate(&lead, &sub).is_ok());
    }

    #[test]
    fn huge_weights_saturate_instead_of_overflowing() {
        let scorer = WeightedScorer::new(ScoringPolicy {
            urgency_weight: i32::MAX / 4,
            financing_bonus: i32::MAX / 2,
            ..ScoringPolicy::default()
        });
        let lead = sample_lead(LeadStage::New);

        let hot = scorer.evaluate(&lead, &submission(450_000, Some(5), Some(true))).unwrap();
        let warm = scorer.evaluate(&lead, &submission(450_000, Some(1), None)).unwrap();
        assert_eq!(hot.score, i32::MAX);
        assert!(hot.score >= warm.score);
        assert_eq!(hot.recommended_stage, Some(LeadStage::Qualified));
    }

    #[test]
    fn urgency_outside_range_is_rejected() {
        let scorer = WeightedScorer::default();
        let lead = sample_lead(LeadStage::New);

        for urgency in [0, 6, -3] {
            let err = scorer.evaluate(&lead, &submission(100_000, Some(urgency), None)).unwrap_err();
            assert!(matches!(err, AppError::InvalidField { field: "urgency", .. }));
        }
    }

    #[test]
    fn missing_optional_fields_are_neutral() {
        let scorer = WeightedScorer::default();
        let mut lead = sample_lead(LeadStage::New);
        lead.budget_min = None;
        lead.budget_max = None;

        let outcome = scorer.evaluate(&lead, &submission(100_000, None, None)).unwrap();
        assert_eq!(outcome.score, 4);
        assert_eq!(outcome.recommended_stage, Some(LeadStage::Contacted));
    }

    #[test]
    fn inverted_lead_range_is_normalized() {
        let scorer = WeightedScorer::default();
        let mut lead = sample_lead(LeadStage::New);
        lead.budget_min = Some(Decimal::from(500_000));
        lead.budget_max = Some(Decimal::from(300_000));

        let inverted = scorer.evaluate(&lead, &submission(400_000, None, None)).unwrap();
        let normal = scorer
            .evaluate(&sample_lead(LeadStage::New), &submission(400_000, None, None))
            .unwrap();
        assert_eq!(inverted.score, normal.score);
    }

    #[test]
    fn recommendation_only_moves_forward() {
        let scorer = WeightedScorer::default();
        let hot = submission(450_000, Some(5), Some(true));
        let cold = submission(450_000, Some(1), None);

        let rec = |stage, sub: &TriageSubmission| {
            scorer.evaluate(&sample_lead(stage), sub).unwrap().recommended_stage
        };

        assert_eq!(rec(LeadStage::New, &hot), Some(LeadStage::Qualified));
        assert_eq!(rec(LeadStage::Contacted, &hot), Some(LeadStage::Qualified));
        assert_eq!(rec(LeadStage::Proposal, &hot), None);
        assert_eq!(rec(LeadStage::New, &cold), Some(LeadStage::Contacted));
        assert_eq!(rec(LeadStage::Qualified, &cold), None);
        assert_eq!(rec(LeadStage::Won, &hot), None);
    }
}
