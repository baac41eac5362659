use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::form::FieldErrors;
use contracts::shared::notice::Notice;
use serde_json::json;
use thiserror::Error;

/// Ошибки админки каталога
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Локальная ошибка формы, до сервиса данных не доходит
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Ошибка запроса или записи в сервисе данных
    #[error("{message}")]
    Backend {
        message: String,
        code: Option<String>,
    },

    /// Запрос одной записи вернул ноль строк
    #[error("Запись {id} не найдена в {table}")]
    NotFound { table: String, id: String },

    /// Ошибка загрузки файла в хранилище
    #[error("{0}")]
    Storage(String),

    /// Строка сервиса данных не соответствует сущности
    #[error("Unexpected row shape: {0}")]
    Decode(String),
}

impl CatalogError {
    pub fn backend(message: impl Into<String>) -> Self {
        CatalogError::Backend {
            message: message.into(),
            code: None,
        }
    }

    pub fn not_found(table: &str, id: impl ToString) -> Self {
        CatalogError::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        }
    }

    /// Ошибка пришла от сервиса данных или хранилища (а не из формы)
    pub fn is_remote(&self) -> bool {
        !matches!(self, CatalogError::Validation(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
            CatalogError::Backend { .. } | CatalogError::Storage(_) | CatalogError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Decode(e.to_string())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            CatalogError::Validation(errors) => json!({ "errors": errors }),
            other => json!({ "notice": Notice::error(other.to_string()) }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_verbatim() {
        let err = CatalogError::Backend {
            message: "duplicate key value violates unique constraint".into(),
            code: Some("23505".into()),
        };
        assert_eq!(err.to_string(), "duplicate key value violates unique constraint");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_validation_is_local() {
        let mut errors = FieldErrors::new();
        errors.insert("title", "required");
        let err = CatalogError::Validation(errors);
        assert!(!err.is_remote());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(CatalogError::not_found("products", 42).is_remote());
    }
}
