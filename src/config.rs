// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::{
    common::i18n::I18nStore,
    db::{CrmRepository, CrmStore, InMemoryCrmStore},
    pipeline::scoring::{ScoringPolicy, WeightedScorer},
    services::{
        auth::AuthService,
        client_service::ClientService,
        gateway::TracingGateway,
        lead_service::LeadService,
        metrics_service::MetricsService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("STORAGE_BACKEND desconhecido: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_statement_timeout: Duration,
    pub scoring: ScoringPolicy,
}

// Lê uma variável opcional, aplicando o padrão quando ausente
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Valor inválido para {key}: {e}")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let storage = env_or("STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida quando STORAGE_BACKEND=postgres");
        }

        let defaults = ScoringPolicy::default();
        let scoring = ScoringPolicy {
            budget_step: env_or::<Decimal>("SCORING_BUDGET_STEP", defaults.budget_step)?,
            budget_points_per_step: env_or("SCORING_BUDGET_POINTS_PER_STEP", defaults.budget_points_per_step)?,
            budget_cap: env_or("SCORING_BUDGET_CAP", defaults.budget_cap)?,
            urgency_weight: env_or("SCORING_URGENCY_WEIGHT", defaults.urgency_weight)?,
            financing_bonus: env_or("SCORING_FINANCING_BONUS", defaults.financing_bonus)?,
            floor_match_bonus: env_or("SCORING_FLOOR_MATCH_BONUS", defaults.floor_match_bonus)?,
            completeness_bonus: env_or("SCORING_COMPLETENESS_BONUS", defaults.completeness_bonus)?,
            qualified_threshold: env_or("SCORING_QUALIFIED_THRESHOLD", defaults.qualified_threshold)?,
        };
        validate_policy(&scoring)?;

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            jwt_secret,
            storage,
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(env_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            db_statement_timeout: Duration::from_millis(env_or("DB_STATEMENT_TIMEOUT_MS", 5000)?),
            scoring,
        })
    }
}

// Teto por peso: a soma de todos os termos cabe folgada em i32
const MAX_WEIGHT: i32 = 1_000_000;

// Pesos negativos quebrariam a monotonia da pontuação
fn validate_policy(policy: &ScoringPolicy) -> anyhow::Result<()> {
    if policy.budget_step <= Decimal::ZERO {
        bail!("SCORING_BUDGET_STEP deve ser positivo");
    }
    let weights = [
        ("SCORING_BUDGET_POINTS_PER_STEP", policy.budget_points_per_step),
        ("SCORING_BUDGET_CAP", policy.budget_cap),
        ("SCORING_URGENCY_WEIGHT", policy.urgency_weight),
        ("SCORING_FINANCING_BONUS", policy.financing_bonus),
        ("SCORING_FLOOR_MATCH_BONUS", policy.floor_match_bonus),
        ("SCORING_COMPLETENESS_BONUS", policy.completeness_bonus),
    ];
    for (key, value) in weights {
        if value < 0 {
            bail!("{key} não pode ser negativo");
        }
        if value > MAX_WEIGHT {
            bail!("{key} não pode passar de {MAX_WEIGHT}");
        }
    }
    Ok(())
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub i18n: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub client_service: ClientService,
    pub metrics_service: MetricsService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn CrmStore> = match settings.storage {
            StorageBackend::Postgres => {
                let url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                // statement_timeout limita toda chamada ao banco
                let timeout_ms = settings.db_statement_timeout.as_millis().to_string();
                let options = PgConnectOptions::from_str(url)?
                    .options([("statement_timeout", timeout_ms.as_str())]);

                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(settings.db_acquire_timeout)
                    .connect_with(options)
                    .await?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(CrmRepository::new(db_pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Usando store em memória: os dados somem ao reiniciar");
                Arc::new(InMemoryCrmStore::new())
            }
        };

        Ok(Self::with_store(settings, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(settings: Settings, store: Arc<dyn CrmStore>) -> Self {
        let scorer = Arc::new(WeightedScorer::new(settings.scoring.clone()));
        let gateway = Arc::new(TracingGateway);

        let auth_service = AuthService::new(settings.jwt_secret.clone());
        let lead_service = LeadService::new(store.clone(), scorer);
        let client_service = ClientService::new(store.clone(), gateway);
        let metrics_service = MetricsService::new(store);

        Self {
            settings: Arc::new(settings),
            i18n: Arc::new(I18nStore::new()),
            auth_service,
            lead_service,
            client_service,
            metrics_service,
        }
    }
}
