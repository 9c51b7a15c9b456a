// src/pipeline/kanban.rs

use crate::models::lead::{Lead, LeadStage};
use crate::models::pipeline::KanbanBoard;

/// Distribui os leads nas seis colunas. Cada lead cai em exatamente uma
/// coluna; dentro da coluna a ordem é por criação (id desempata).
pub fn project<I>(leads: I) -> KanbanBoard
where
    I: IntoIterator<Item = Lead>,
{
    let mut board = KanbanBoard::default();
    for lead in leads {
        board.column_mut(lead.stage).push(lead);
    }

    for stage in LeadStage::ALL {
        board
            .column_mut(stage)
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scoring::tests::sample_lead;
    use std::collections::HashSet;

    #[test]
    fn empty_set_gives_empty_board() {
        let board = project(Vec::new());
        assert_eq!(board.total(), 0);
        for stage in LeadStage::ALL {
            assert!(board.column(stage).is_empty());
        }
    }

    #[test]
    fn every_lead_lands_in_exactly_one_column() {
        let leads: Vec<Lead> = LeadStage::ALL
            .iter()
            .cycle()
            .take(23)
            .map(|s| sample_lead(*s))
            .collect();
        let ids: HashSet<_> = leads.iter().map(|l| l.id).collect();

        let board = project(leads);
        assert_eq!(board.total(), 23);

        let mut seen = HashSet::new();
        for stage in LeadStage::ALL {
            for lead in board.column(stage) {
                assert_eq!(lead.stage, stage);
                assert!(seen.insert(lead.id), "lead {} repetido", lead.id);
            }
        }
        assert_eq!(seen, ids);
    }

    #[test]
    fn columns_are_ordered_by_creation() {
        let mut older = sample_lead(LeadStage::Contacted);
        let mut newer = sample_lead(LeadStage::Contacted);
        older.created_at = newer.created_at - chrono::Duration::hours(1);
        newer.name = "Mais novo".into();

        let board = project(vec![newer.clone(), older.clone()]);
        let column = board.column(LeadStage::Contacted);
        assert_eq!(column[0].id, older.id);
        assert_eq!(column[1].id, newer.id);
    }
}
