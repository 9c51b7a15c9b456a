// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    User,
}

// Quem está chamando. Vem do token e é passado explicitamente para os serviços.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl CurrentUser {
    /// Operações que alteram dados exigem ADMIN.
    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role {
            UserRole::Admin => Ok(()),
            UserRole::User => {
                tracing::warn!(user_id = %self.id, "Operação de escrita negada para usuário sem papel ADMIN");
                Err(AppError::Forbidden)
            }
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo serviço de autenticação
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // Subject (ID do usuário)
    pub role: UserRole, // Papel do usuário
    pub exp: usize,     // Expiration time
    pub iat: usize,     // Issued At
}
