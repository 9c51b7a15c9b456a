// src/common/i18n.rs

use std::collections::HashMap;

pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "pt"];
pub const DEFAULT_LANGUAGE: &str = "en";

// Catálogo de mensagens públicas, indexado por idioma e depois por código
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let en = HashMap::from([
            ("validation_failed", "One or more fields are invalid."),
            ("malformed_payload", "The request body could not be read."),
            ("invalid_transition", "This stage change is not allowed for the lead."),
            ("lead_not_found", "Lead not found."),
            ("client_not_found", "Client not found."),
            ("already_converted", "This lead has already been converted into a client."),
            ("concurrency_conflict", "The lead was changed by another request. Reload and try again."),
            ("forbidden", "You do not have permission to perform this action."),
            ("invalid_token", "Invalid or missing authentication token."),
            ("internal_error", "An unexpected error occurred."),
        ]);

        let pt = HashMap::from([
            ("validation_failed", "Um ou mais campos são inválidos."),
            ("malformed_payload", "Não foi possível ler o corpo da requisição."),
            ("invalid_transition", "Esta mudança de estágio não é permitida para o lead."),
            ("lead_not_found", "Lead não encontrado."),
            ("client_not_found", "Cliente não encontrado."),
            ("already_converted", "Este lead já foi convertido em cliente."),
            ("concurrency_conflict", "O lead foi alterado por outra requisição. Recarregue e tente novamente."),
            ("forbidden", "Você não tem permissão para realizar esta ação."),
            ("invalid_token", "Token de autenticação inválido ou ausente."),
            ("internal_error", "Ocorreu um erro inesperado."),
        ]);

        Self {
            messages: HashMap::from([("en", en), ("pt", pt)]),
        }
    }

    /// Traduz um código; cai para o idioma padrão e, por fim, devolve o próprio código.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANGUAGE).and_then(|m| m.get(key)))
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
