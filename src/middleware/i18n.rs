// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::common::i18n::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};

// Idioma negociado a partir do Accept-Language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let lang = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| {
                // Já vem ordenado por qualidade; "pt-BR" -> "pt"
                accept_language::parse(raw).into_iter().find_map(|tag| {
                    let primary = tag.split('-').next().unwrap_or(&tag).to_lowercase();
                    SUPPORTED_LANGUAGES
                        .iter()
                        .find(|supported| **supported == primary)
                        .map(|supported| supported.to_string())
                })
            })
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}
