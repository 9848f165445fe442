// src/common/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::common::naming::to_camel_case;

// O tipo de erro único dos services e dos stores.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo que nem chega a virar o struct (JSON quebrado, data ou status inválidos)
    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Lead {0} não encontrado")]
    LeadNotFound(Uuid),

    #[error("Versão de schema {found} não suportada (máximo {supported})")]
    UnsupportedSchemaVersion { found: u64, supported: u64 },

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de migração: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de armazenamento local: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Snapshot local inválido: {0}")]
    SnapshotError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Detalhes de validação por campo, já com o nome externo (camelCase).
    pub fn validation_details(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
        errors
            .field_errors()
            .into_iter()
            .map(|(field, field_errors)| {
                let messages = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (to_camel_case(&field), messages)
            })
            .collect()
    }

    /// Detalhes de um corpo rejeitado pelo extrator `Json`. Quando a mensagem
    /// aponta o campo (`currentStatus: unknown variant ...`) o erro vai nele,
    /// senão fica em `body`.
    pub fn rejection_details(rejection: &JsonRejection) -> BTreeMap<String, Vec<String>> {
        let text = rejection.body_text();
        let reason = text
            .split_once("target type: ")
            .map(|(_, rest)| rest.to_string())
            .unwrap_or(text);

        let (field, message) = match reason.split_once(": ") {
            Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
                (path.to_string(), message.to_string())
            }
            _ => ("body".to_string(), reason),
        };

        BTreeMap::from([(field, vec![message])])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": AppError::validation_details(&errors),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidBody(rejection) => {
                tracing::debug!("Corpo rejeitado: {}", rejection.body_text());
                let status = match rejection {
                    JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                let body = Json(json!({
                    "error": "O corpo da requisição é inválido.",
                    "details": AppError::rejection_details(&rejection),
                }));
                return (status, body).into_response();
            }
            AppError::LeadNotFound(id) => {
                tracing::debug!(lead_id = %id, "Lead não encontrado");
                (StatusCode::NOT_FOUND, "Lead não encontrado.")
            }

            // Todos os outros erros viram 500 com mensagem genérica.
            // O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn test_not_found_maps_to_404() {
        let resp = AppError::LeadNotFound(Uuid::new_v4()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_error_is_generic_500() {
        let err = std::io::Error::other("disco cheio");
        let resp = AppError::StorageError(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_details_use_external_names() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("invalid_characters");
        err.message = Some("inválido".into());
        errors.add("restaurant_name", err);
        errors.add("phone", ValidationError::new("invalid_phone"));

        let details = AppError::validation_details(&errors);
        assert_eq!(details["restaurantName"], vec!["inválido".to_string()]);
        assert_eq!(details["phone"], vec!["invalid_phone".to_string()]);

        let resp = AppError::ValidationError(errors).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
