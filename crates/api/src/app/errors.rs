use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use stockledger_core::DomainError;
use stockledger_infra::LedgerError;
use stockledger_infra::stock_store::StockStoreError;

/// Map a ledger failure to its HTTP response.
///
/// Store failures never expose their detail; it has already been logged.
pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        LedgerError::InvalidTransfer(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_transfer", msg)
        }
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        LedgerError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        e @ LedgerError::Store(_) if e.is_unavailable() => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            "stock store temporarily unavailable",
        ),
        LedgerError::Store(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "internal error",
        ),
    }
}

/// Map a read-side store failure. Infrastructure detail goes to the log only.
pub fn store_error_to_response(err: StockStoreError) -> axum::response::Response {
    if !matches!(err, StockStoreError::Rejected(_) | StockStoreError::NotFound) {
        error!(error = %err, "stock query failed");
    }
    ledger_error_to_response(err.into())
}

/// Reject a request body that does not map onto a ledger command.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    ledger_error_to_response(err.into())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (LedgerError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (LedgerError::InvalidTransfer("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (LedgerError::NotFound, StatusCode::NOT_FOUND),
            (LedgerError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                LedgerError::Store(StockStoreError::Database("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                LedgerError::Store(StockStoreError::Unavailable("pool".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ledger_error_to_response(err).status(), status);
        }
    }
}
