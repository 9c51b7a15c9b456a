// src/pipeline/metrics.rs

use std::collections::BTreeMap;

use crate::models::lead::{Lead, LeadStage};
use crate::models::pipeline::MetricsOverview;

pub fn overview(leads: &[Lead], triage_sessions: u64) -> MetricsOverview {
    let mut leads_by_stage: BTreeMap<LeadStage, usize> =
        LeadStage::ALL.iter().map(|s| (*s, 0)).collect();
    for lead in leads {
        *leads_by_stage.entry(lead.stage).or_default() += 1;
    }

    let total_leads = leads.len();
    let won_leads = leads_by_stage[&LeadStage::Won];
    let conversion_rate = if total_leads > 0 {
        won_leads as f64 / total_leads as f64 * 100.0
    } else {
        0.0
    };

    MetricsOverview {
        total_leads,
        won_leads,
        conversion_rate,
        qualified_sessions: triage_sessions,
        leads_by_stage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scoring::tests::sample_lead;

    #[test]
    fn three_won_out_of_ten_is_thirty_percent() {
        let mut leads: Vec<Lead> = (0..3).map(|_| sample_lead(LeadStage::Won)).collect();
        leads.extend((0..4).map(|_| sample_lead(LeadStage::New)));
        leads.extend((0..3).map(|_| sample_lead(LeadStage::Lost)));

        let m = overview(&leads, 7);
        assert_eq!(m.total_leads, 10);
        assert_eq!(m.won_leads, 3);
        assert!((m.conversion_rate - 30.0).abs() < f64::EPSILON);
        assert_eq!(m.qualified_sessions, 7);
        assert_eq!(m.leads_by_stage[&LeadStage::New], 4);
        assert_eq!(m.leads_by_stage[&LeadStage::Lost], 3);
        assert_eq!(m.leads_by_stage[&LeadStage::Proposal], 0);
    }

    #[test]
    fn empty_set_has_zero_rate_and_all_stages() {
        let m = overview(&[], 0);
        assert_eq!(m.conversion_rate, 0.0);
        assert_eq!(m.leads_by_stage.len(), 6);
        assert!(m.leads_by_stage.values().all(|v| *v == 0));
    }
}
