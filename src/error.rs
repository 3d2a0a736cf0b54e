use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::models::Money;

/// Machine-readable reason attached to validation, conflict and invariant failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    OrderNotAvailable,
    InvalidTransition,
    NotPermitted,
    AlreadySettled,
    CourierNotEligible,
    OrderNotEligible,
    OrderAlreadyClaimed,
    AmountMismatch,
    RemittanceAlreadyReviewed,
    InvalidInput,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::OrderNotAvailable => "ORDER_NOT_AVAILABLE",
            ReasonCode::InvalidTransition => "INVALID_TRANSITION",
            ReasonCode::NotPermitted => "NOT_PERMITTED",
            ReasonCode::AlreadySettled => "ALREADY_SETTLED",
            ReasonCode::CourierNotEligible => "COURIER_NOT_ELIGIBLE",
            ReasonCode::OrderNotEligible => "ORDER_NOT_ELIGIBLE",
            ReasonCode::OrderAlreadyClaimed => "ORDER_ALREADY_CLAIMED",
            ReasonCode::AmountMismatch => "AMOUNT_MISMATCH",
            ReasonCode::RemittanceAlreadyReviewed => "REMITTANCE_ALREADY_REVIEWED",
            ReasonCode::InvalidInput => "INVALID_INPUT",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed ({code}): {message}")]
    Validation { code: ReasonCode, message: String },

    #[error("conflict ({code}): {message}")]
    Conflict { code: ReasonCode, message: String },

    #[error("invariant violated ({code}): discrepancy {discrepancy}")]
    InvariantViolation { code: ReasonCode, discrepancy: Money },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            code: ReasonCode::InvalidInput,
            message: message.into(),
        }
    }

    pub fn conflict(code: ReasonCode, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn order_not_available(order_id: impl fmt::Display) -> Self {
        AppError::conflict(
            ReasonCode::OrderNotAvailable,
            format!("order {order_id} is not available"),
        )
    }

    /// Reason code for failures that carry one.
    pub fn code(&self) -> Option<ReasonCode> {
        match self {
            AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::InvariantViolation { code, .. } => Some(*code),
            AppError::NotFound(_) | AppError::Internal(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            AppError::Validation { code, .. } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "code": code }),
            ),
            AppError::Conflict { code, .. } => (
                StatusCode::CONFLICT,
                json!({ "error": message, "code": code }),
            ),
            AppError::InvariantViolation { code, discrepancy } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": message, "code": code, "discrepancy": discrepancy }),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
