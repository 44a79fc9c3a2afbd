use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No encontrado: {0}")]
    NotFound(String),

    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("Transición inválida: {0}")]
    InvalidTransition(String),

    #[error("Clave duplicada: {0}")]
    DuplicateKey(String),

    #[error("Error de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error de JSON: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Error interno del servidor: {0}")]
    InternalError(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidTransition(msg) => {
                log::warn!("Invalid transition: {msg}");
                (StatusCode::BAD_REQUEST, "INVALID_TRANSITION", msg.clone())
            }
            AppError::DuplicateKey(msg) => {
                log::warn!("Duplicate key: {msg}");
                (StatusCode::BAD_REQUEST, "DUPLICATE_KEY", msg.clone())
            }
            AppError::IoError(err) => {
                log::error!("Storage I/O error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    err.to_string(),
                )
            }
            AppError::SerdeJsonError(err) => {
                log::error!("JSON parse error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PARSE_ERROR",
                    err.to_string(),
                )
            }
            AppError::InternalError(msg) => {
                log::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
