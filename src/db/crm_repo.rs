// src/db/crm_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::CrmStore,
    models::{
        client::{Client, OutboundMessage},
        lead::{Lead, LeadStage, TriageSession},
    },
};

const LEAD_COLUMNS: &str = r#"
    id, name, phone, email, source, stage, interest_type,
    budget_min, budget_max, city_preference, notes, score,
    version, created_at, updated_at
"#;

const CLIENT_COLUMNS: &str = r#"
    id, name, email, phone, city, preferred_channel, tags,
    lead_id, created_at, updated_at
"#;

// Implementação Postgres do store do funil
#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  HELPERS (recebem o executor para rodar dentro de transações)
    // =========================================================================

    /// Compare-and-swap na versão. `None` = nada foi gravado.
    async fn cas_update_lead<'e, E>(
        executor: E,
        lead: &Lead,
        expected_version: i64,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads
            SET stage = $3,
                interest_type = $4,
                city_preference = $5,
                notes = $6,
                score = $7,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Lead>(&sql)
            .bind(lead.id)
            .bind(expected_version)
            .bind(lead.stage)
            .bind(lead.interest_type)
            .bind(&lead.city_preference)
            .bind(&lead.notes)
            .bind(lead.score)
            .bind(lead.updated_at)
            .fetch_optional(executor)
            .await?;

        Ok(updated)
    }

    // Diferencia "não existe" de "perdeu a corrida" depois de um CAS sem efeito
    async fn missed_update<'e, E>(executor: E, id: Uuid) -> Result<AppError, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM leads WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(if exists {
            AppError::ConcurrencyConflict(id)
        } else {
            AppError::LeadNotFound(id)
        })
    }
}

#[async_trait]
impl CrmStore for CrmRepository {
    // =========================================================================
    //  LEADS
    // =========================================================================

    async fn insert_lead(&self, lead: &Lead) -> Result<Lead, AppError> {
        let sql = format!(
            r#"
            INSERT INTO leads (
                id, name, phone, email, source, stage, interest_type,
                budget_min, budget_max, city_preference, notes, score,
                version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Lead>(&sql)
            .bind(lead.id)
            .bind(&lead.name)
            .bind(&lead.phone)
            .bind(&lead.email)
            .bind(lead.source)
            .bind(lead.stage)
            .bind(lead.interest_type)
            .bind(lead.budget_min)
            .bind(lead.budget_max)
            .bind(&lead.city_preference)
            .bind(&lead.notes)
            .bind(lead.score)
            .bind(lead.version)
            .bind(lead.created_at)
            .bind(lead.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1");
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    async fn list_leads(&self, stage: Option<LeadStage>) -> Result<Vec<Lead>, AppError> {
        // `$1 IS NULL` deixa o filtro opcional sem montar SQL dinâmico
        let sql = format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            WHERE ($1::lead_stage IS NULL OR stage = $1)
            ORDER BY created_at ASC, id ASC
            "#
        );
        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(stage)
            .fetch_all(&self.pool)
            .await?;

        Ok(leads)
    }

    async fn update_lead(&self, lead: &Lead, expected_version: i64) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(updated) = Self::cas_update_lead(&mut *tx, lead, expected_version).await? else {
            return Err(Self::missed_update(&mut *tx, lead.id).await?);
        };

        tx.commit().await?;
        Ok(updated)
    }

    async fn record_triage(
        &self,
        lead: &Lead,
        expected_version: i64,
        session: &TriageSession,
    ) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(updated) = Self::cas_update_lead(&mut *tx, lead, expected_version).await? else {
            // Drop do tx = rollback
            return Err(Self::missed_update(&mut *tx, lead.id).await?);
        };

        sqlx::query(
            r#"
            INSERT INTO triage_sessions (
                id, lead_id, interest_type, budget, city_preference,
                financing_approved, urgency, summary, score, resulting_stage, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(session.id)
        .bind(session.lead_id)
        .bind(session.interest_type)
        .bind(session.budget)
        .bind(&session.city_preference)
        .bind(session.financing_approved)
        .bind(session.urgency)
        .bind(&session.summary)
        .bind(session.score)
        .bind(session.resulting_stage)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // =========================================================================
    //  CONVERSÃO (cliente + lead na mesma transação)
    // =========================================================================

    async fn convert_lead(
        &self,
        client: &Client,
        lead: &Lead,
        expected_version: i64,
    ) -> Result<(Client, Lead), AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO clients (
                id, name, email, phone, city, preferred_channel, tags,
                lead_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Client>(&sql)
            .bind(client.id)
            .bind(&client.name)
            .bind(&client.email)
            .bind(&client.phone)
            .bind(&client.city)
            .bind(client.preferred_channel)
            .bind(&client.tags)
            .bind(client.lead_id)
            .bind(client.created_at)
            .bind(client.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                // UNIQUE(lead_id): outro pedido converteu primeiro
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::AlreadyConverted(lead.id);
                    }
                }
                e.into()
            })?;

        let Some(updated) = Self::cas_update_lead(&mut *tx, lead, expected_version).await? else {
            return Err(Self::missed_update(&mut *tx, lead.id).await?);
        };

        tx.commit().await?;
        Ok((created, updated))
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at ASC, id ASC");
        let clients = sqlx::query_as::<_, Client>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    async fn find_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn find_client_by_lead(&self, lead_id: Uuid) -> Result<Option<Client>, AppError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE lead_id = $1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(lead_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn insert_outbound_message(
        &self,
        message: &OutboundMessage,
    ) -> Result<OutboundMessage, AppError> {
        let saved = sqlx::query_as::<_, OutboundMessage>(
            r#"
            INSERT INTO outbound_messages (id, client_id, channel, content, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, client_id, channel, content, sent_at
            "#,
        )
        .bind(message.id)
        .bind(message.client_id)
        .bind(message.channel)
        .bind(&message.content)
        .bind(message.sent_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn count_triage_sessions(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM triage_sessions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
