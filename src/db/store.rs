// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        client::{Client, OutboundMessage},
        lead::{Lead, LeadStage, TriageSession},
    },
};

/// Colaborador de persistência do funil.
///
/// Toda escrita em lead é otimista: grava só se a versão atual no banco
/// for `expected_version`, incrementando-a. Caso contrário devolve
/// `ConcurrencyConflict` (ou `LeadNotFound`) e nada é gravado.
#[async_trait]
pub trait CrmStore: Send + Sync {
    async fn insert_lead(&self, lead: &Lead) -> Result<Lead, AppError>;

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError>;

    /// Ordenado por criação.
    async fn list_leads(&self, stage: Option<LeadStage>) -> Result<Vec<Lead>, AppError>;

    async fn update_lead(&self, lead: &Lead, expected_version: i64) -> Result<Lead, AppError>;

    /// Atualiza o lead e registra a sessão de triagem na mesma unidade.
    async fn record_triage(
        &self,
        lead: &Lead,
        expected_version: i64,
        session: &TriageSession,
    ) -> Result<Lead, AppError>;

    /// Cria o cliente e atualiza o lead juntos: ou os dois, ou nenhum.
    /// Um cliente já ligado ao lead resulta em `AlreadyConverted`.
    async fn convert_lead(
        &self,
        client: &Client,
        lead: &Lead,
        expected_version: i64,
    ) -> Result<(Client, Lead), AppError>;

    async fn list_clients(&self) -> Result<Vec<Client>, AppError>;

    async fn find_client(&self, id: Uuid) -> Result<Option<Client>, AppError>;

    async fn find_client_by_lead(&self, lead_id: Uuid) -> Result<Option<Client>, AppError>;

    async fn insert_outbound_message(
        &self,
        message: &OutboundMessage,
    ) -> Result<OutboundMessage, AppError>;

    async fn count_triage_sessions(&self) -> Result<u64, AppError>;
}
