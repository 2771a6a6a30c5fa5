// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // As porcentagens das formas de pagamento não fecham em 100%.
    #[error("As porcentagens precisam fechar em 100% (total atual: {total_percent}%)")]
    PaymentSplitIncomplete { total_percent: Decimal },

    // Corpo JSON que não vira um rascunho de cliente
    #[error("Payload inválido: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado para o perfil atual")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cliente já existe")]
    ClientAlreadyExists,

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Usina não encontrada")]
    PowerPlantNotFound,

    #[error("Integração não encontrada")]
    IntegrationNotFound,

    #[error("CEP inválido")]
    InvalidCep,

    #[error("Endereço não encontrado para o CEP")]
    AddressNotFound,

    #[error("Falha na consulta de CEP: {0}")]
    AddressLookupFailed(#[from] reqwest::Error),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPayload(_) | AppError::InvalidCep => {
                StatusCode::BAD_REQUEST
            }
            AppError::PaymentSplitIncomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmailAlreadyExists | AppError::ClientAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::ClientNotFound
            | AppError::PowerPlantNotFound
            | AppError::IntegrationNotFound
            | AppError::AddressNotFound => StatusCode::NOT_FOUND,
            AppError::AddressLookupFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::PaymentSplitIncomplete { total_percent } => {
                let body = Json(json!({
                    "error": "As porcentagens precisam fechar em 100%.",
                    "totalPercent": total_percent,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidPayload(ref e) => format!("Payload inválido: {}", e),
            AppError::EmailAlreadyExists => "Este e-mail já está em uso.".to_string(),
            AppError::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::Forbidden => "Seu perfil não tem acesso a este recurso.".to_string(),
            AppError::UserNotFound => "Usuário não encontrado.".to_string(),
            AppError::ClientAlreadyExists => "Já existe um cliente com este id.".to_string(),
            AppError::ClientNotFound => "Cliente não encontrado.".to_string(),
            AppError::PowerPlantNotFound => "Usina não encontrada.".to_string(),
            AppError::IntegrationNotFound => "Integração não encontrada.".to_string(),
            AppError::InvalidCep => "O CEP deve ter 8 dígitos.".to_string(),
            AppError::AddressNotFound => "Nenhum endereço encontrado para este CEP.".to_string(),
            AppError::AddressLookupFailed(ref e) => {
                tracing::warn!("Falha ao consultar o ViaCEP: {}", e);
                "Serviço de CEP indisponível no momento.".to_string()
            }

            // Todos os outros erros viram 500. O `tracing` loga a mensagem detalhada.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
