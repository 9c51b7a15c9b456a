// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::models::lead::LeadStage;

// Taxonomia interna de erros. Nenhuma variante é re-tentada automaticamente:
// quem decide repetir é o chamador.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras de domínio que não cabem nos atributos do `validator`
    // (orçamento <= 0, urgência fora de 1..=5, faixa invertida...)
    #[error("Campo inválido: {field} ({code})")]
    InvalidField { field: &'static str, code: &'static str },

    // JSON mal formado ou enum desconhecido
    #[error("Payload inválido: {0}")]
    MalformedPayload(String),

    #[error("Transição inválida: {from:?} -> {to:?}")]
    InvalidTransition { from: LeadStage, to: LeadStage },

    #[error("Lead não encontrado: {0}")]
    LeadNotFound(Uuid),

    #[error("Cliente não encontrado: {0}")]
    ClientNotFound(Uuid),

    #[error("Lead já convertido: {0}")]
    AlreadyConverted(Uuid),

    #[error("Conflito de concorrência no lead {0}")]
    ConcurrencyConflict(Uuid),

    #[error("Acesso negado")]
    Forbidden,

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_field(field: &'static str, code: &'static str) -> Self {
        AppError::InvalidField { field, code }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidField { .. }
            | AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::LeadNotFound(_) | AppError::ClientNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. }
            | AppError::AlreadyConverted(_)
            | AppError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte o erro interno na resposta pública, traduzida para o idioma do chamador.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let (key, details) = match self {
            AppError::ValidationError(errors) => {
                // Retorna os códigos de cada campo, o frontend monta as frases
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), codes);
                }
                ("validation_failed", Some(json!(fields)))
            }
            AppError::InvalidField { field, code } => {
                ("validation_failed", Some(json!({ *field: [code] })))
            }
            AppError::MalformedPayload(reason) => {
                ("malformed_payload", Some(json!({ "reason": reason })))
            }
            AppError::InvalidTransition { from, to } => (
                "invalid_transition",
                Some(json!({ "from": from, "to": to })),
            ),
            AppError::LeadNotFound(id) => ("lead_not_found", Some(json!({ "leadId": id }))),
            AppError::ClientNotFound(id) => ("client_not_found", Some(json!({ "clientId": id }))),
            AppError::AlreadyConverted(id) => {
                ("already_converted", Some(json!({ "leadId": id })))
            }
            AppError::ConcurrencyConflict(id) => {
                ("concurrency_conflict", Some(json!({ "leadId": id })))
            }
            AppError::Forbidden => ("forbidden", None),
            AppError::InvalidToken => ("invalid_token", None),

            // Falhas de infraestrutura: loga o detalhe, devolve mensagem opaca
            e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!(error = ?e, "🔥 Erro interno do servidor");
                ("internal_error", None)
            }
        };

        ApiError {
            status,
            error: i18n.translate(lang, key),
            details,
        }
    }
}

// Resposta de erro que vai para o cliente HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_expected_status() {
        let id = Uuid::new_v4();
        assert_eq!(
            AppError::invalid_field("budget", "must_be_positive").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::LeadNotFound(id).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::AlreadyConverted(id).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::ConcurrencyConflict(id).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidTransition { from: LeadStage::Lost, to: LeadStage::New }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn infrastructure_errors_are_opaque() {
        let i18n = I18nStore::new();
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exhausted at 10.0.0.3"));
        let api = err.to_api_error(&Locale("en".into()), &i18n);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("10.0.0.3"));
        assert!(api.details.is_none());
    }

    #[test]
    fn messages_follow_the_locale() {
        let i18n = I18nStore::new();
        let err = AppError::LeadNotFound(Uuid::new_v4());

        let pt = err.to_api_error(&Locale("pt".into()), &i18n);
        let en = err.to_api_error(&Locale("en".into()), &i18n);
        assert_ne!(pt.error, en.error);
    }
}
