use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    BookingRejected(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("transaction could not be executed")]
    TransactionError(#[source] sqlx::Error),
    #[error("an error occurred while executing a database operation")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("login failed")]
    UnauthenticatedError,
    #[error("invalid authorization")]
    UnauthorizedError,
    #[error("operation not permitted")]
    ForbiddenOperation,
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("{0}")]
    ExternalServiceError(String),
    #[error("payment gateway is unavailable: {message}")]
    PaymentGatewayUnavailable { retry_path: String, message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, message) = match self {
            AppError::UnprocessableEntity(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            AppError::BookingRejected(m) => (StatusCode::BAD_REQUEST, m),
            // 存在の有無を漏らさないよう、詳細は返さない
            AppError::EntityNotFound(_) => (StatusCode::NOT_FOUND, "not found".into()),
            e @ (AppError::ValidationError(_) | AppError::ConvertToUuidError(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::UnauthenticatedError | AppError::ForbiddenOperation => {
                (StatusCode::FORBIDDEN, "forbidden".into())
            }
            AppError::UnauthorizedError => (StatusCode::UNAUTHORIZED, "unauthorized".into()),
            AppError::PaymentGatewayUnavailable {
                retry_path,
                message,
            } => {
                tracing::error!(error.message = %message, retry_path, "Payment gateway error");
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({
                        "message": "Failed to create the payment. Please try again.",
                        "retryPath": retry_path,
                    })),
                )
                    .into_response();
            }
            e @ AppError::ExternalServiceError(_) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "External service error"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    "external service is temporarily unavailable".into(),
                )
            }
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::BcryptError(_)
            | AppError::ConversionEntityError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".into(),
                )
            }
        };

        (status_code, Json(json!({ "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
