// src/services/metrics_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::CrmStore,
    models::{auth::CurrentUser, pipeline::MetricsOverview},
    pipeline::metrics,
};

#[derive(Clone)]
pub struct MetricsService {
    store: Arc<dyn CrmStore>,
}

impl MetricsService {
    pub fn new(store: Arc<dyn CrmStore>) -> Self {
        Self { store }
    }

    pub async fn overview(&self, actor: &CurrentUser) -> Result<MetricsOverview, AppError> {
        tracing::debug!(user_id = %actor.id, "Calculando métricas");
        let leads = self.store.list_leads(None).await?;
        let sessions = self.store.count_triage_sessions().await?;
        Ok(metrics::overview(&leads, sessions))
    }
}
