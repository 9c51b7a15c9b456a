// src/db/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::CrmStore,
    models::{
        client::{Client, OutboundMessage},
        lead::{Lead, LeadStage, TriageSession},
    },
};

#[derive(Debug, Default)]
struct MemoryState {
    leads: HashMap<Uuid, Lead>,
    clients: HashMap<Uuid, Client>,
    triage_sessions: Vec<TriageSession>,
    messages: Vec<OutboundMessage>,
}

impl MemoryState {
    // Verificação + escrita acontecem sob o mesmo lock de escrita
    fn check_version(&self, id: Uuid, expected_version: i64) -> Result<(), AppError> {
        match self.leads.get(&id) {
            None => Err(AppError::LeadNotFound(id)),
            Some(current) if current.version != expected_version => {
                Err(AppError::ConcurrencyConflict(id))
            }
            Some(_) => Ok(()),
        }
    }

    fn write_lead(&mut self, lead: &Lead, expected_version: i64) -> Lead {
        let mut stored = lead.clone();
        stored.version = expected_version + 1;
        self.leads.insert(stored.id, stored.clone());
        stored
    }
}

/// Store em memória para `STORAGE_BACKEND=memory` e para os testes.
#[derive(Debug, Default)]
pub struct InMemoryCrmStore {
    state: RwLock<MemoryState>,
}

impl InMemoryCrmStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn message_count(&self) -> usize {
        self.state.read().await.messages.len()
    }
}

#[async_trait]
impl CrmStore for InMemoryCrmStore {
    async fn insert_lead(&self, lead: &Lead) -> Result<Lead, AppError> {
        let mut state = self.state.write().await;
        state.leads.insert(lead.id, lead.clone());
        Ok(lead.clone())
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self.state.read().await.leads.get(&id).cloned())
    }

    async fn list_leads(&self, stage: Option<LeadStage>) -> Result<Vec<Lead>, AppError> {
        let state = self.state.read().await;
        let mut leads: Vec<Lead> = state
            .leads
            .values()
            .filter(|l| stage.is_none_or(|s| l.stage == s))
            .cloned()
            .collect();
        leads.sort_by_key(|l| (l.created_at, l.id));
        Ok(leads)
    }

    async fn update_lead(&self, lead: &Lead, expected_version: i64) -> Result<Lead, AppError> {
        let mut state = self.state.write().await;
        state.check_version(lead.id, expected_version)?;
        Ok(state.write_lead(lead, expected_version))
    }

    async fn record_triage(
        &self,
        lead: &Lead,
        expected_version: i64,
        session: &TriageSession,
    ) -> Result<Lead, AppError> {
        let mut state = self.state.write().await;
        state.check_version(lead.id, expected_version)?;
        state.triage_sessions.push(session.clone());
        Ok(state.write_lead(lead, expected_version))
    }

    async fn convert_lead(
        &self,
        client: &Client,
        lead: &Lead,
        expected_version: i64,
    ) -> Result<(Client, Lead), AppError> {
        let mut state = self.state.write().await;
        if state.clients.values().any(|c| c.lead_id == Some(lead.id)) {
            return Err(AppError::AlreadyConverted(lead.id));
        }
        state.check_version(lead.id, expected_version)?;

        state.clients.insert(client.id, client.clone());
        let stored = state.write_lead(lead, expected_version);
        Ok((client.clone(), stored))
    }

    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let state = self.state.read().await;
        let mut clients: Vec<Client> = state.clients.values().cloned().collect();
        clients.sort_by_key(|c| (c.created_at, c.id));
        Ok(clients)
    }

    async fn find_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        Ok(self.state.read().await.clients.get(&id).cloned())
    }

    async fn find_client_by_lead(&self, lead_id: Uuid) -> Result<Option<Client>, AppError> {
        let state = self.state.read().await;
        Ok(state.clients.values().find(|c| c.lead_id == Some(lead_id)).cloned())
    }

    async fn insert_outbound_message(
        &self,
        message: &OutboundMessage,
    ) -> Result<OutboundMessage, AppError> {
        self.state.write().await.messages.push(message.clone());
        Ok(message.clone())
    }

    async fn count_triage_sessions(&self) -> Result<u64, AppError> {
        Ok(self.state.read().await.triage_sessions.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scoring::tests::sample_lead;

    #[tokio::test]
    async fn stale_version_is_a_conflict_and_writes_nothing() {
        let store = InMemoryCrmStore::new();
        let lead = store.insert_lead(&sample_lead(LeadStage::New)).await.unwrap();

        let mut first = lead.clone();
        first.stage = LeadStage::Contacted;
        let stored = store.update_lead(&first, lead.version).await.unwrap();
        assert_eq!(stored.version, lead.version + 1);

        // Segunda escrita ainda baseada na versão antiga
        let mut second = lead.clone();
        second.stage = LeadStage::Lost;
        let err = store.update_lead(&second, lead.version).await.unwrap_err();
        assert!(matches!(err, AppError::ConcurrencyConflict(id) if id == lead.id));

        let current = store.find_lead(lead.id).await.unwrap().unwrap();
        assert_eq!(current.stage, LeadStage::Contacted);
    }

    #[tokio::test]
    async fn update_of_unknown_lead_is_not_found() {
        let store = InMemoryCrmStore::new();
        let lead = sample_lead(LeadStage::New);
        let err = store.update_lead(&lead, 1).await.unwrap_err();
        assert!(matches!(err, AppError::LeadNotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_by_stage_in_creation_order() {
        let store = InMemoryCrmStore::new();
        let mut a = sample_lead(LeadStage::New);
        let b = sample_lead(LeadStage::New);
        let c = sample_lead(LeadStage::Won);
        a.created_at = b.created_at - chrono::Duration::seconds(30);

        for lead in [&b, &c, &a] {
            store.insert_lead(lead).await.unwrap();
        }

        let new_ones = store.list_leads(Some(LeadStage::New)).await.unwrap();
        assert_eq!(new_ones.iter().map(|l| l.id).collect::<Vec<_>>(), vec![a.id, b.id]);
        assert_eq!(store.list_leads(None).await.unwrap().len(), 3);
    }
}
