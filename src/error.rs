use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    StockUnavailable {
        product_id: uuid::Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Data unavailable")]
    DataUnavailable(#[source] DbErr),

    #[error("Checkout could not be completed: {0}")]
    Persistence(String),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable tag clients can branch on.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Forbidden => "forbidden",
            AppError::Validation(_) => "validation",
            AppError::StockUnavailable { .. } => "stock",
            AppError::Conflict(_) => "conflict",
            AppError::DataUnavailable(_) => "unavailable",
            AppError::Persistence(_) | AppError::OrmError(_) => "persistence",
            AppError::Internal(_) => "internal",
        }
    }

    /// Maps connection-level failures to `DataUnavailable`, everything else
    /// passes through as an ORM error.
    pub fn from_read(err: DbErr) -> AppError {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => AppError::DataUnavailable(err),
            other => AppError::OrmError(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    kind: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StockUnavailable { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, kind = self.kind(), "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                kind: self.kind(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
