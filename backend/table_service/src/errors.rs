//! Application-wide error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ordering(#[from] tableside::Error),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        use tableside::Error as E;

        match self {
            Self::Ordering(
                E::UnknownItem(_) | E::OrderNotFound(_) | E::ReviewNotFound { .. },
            ) => StatusCode::NOT_FOUND,
            Self::Ordering(
                E::InvalidTransition { .. }
                | E::AlreadyServed(_)
                | E::DuplicateOrderId(_)
                | E::PaymentInProgress
                | E::AlreadyPaid
                | E::PaymentCancelled,
            ) => StatusCode::CONFLICT,
            Self::Ordering(E::EmptyBill) => StatusCode::BAD_REQUEST,
            Self::Ordering(E::PaymentDeclined(_)) => StatusCode::PAYMENT_REQUIRED,
            Self::TableNotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
