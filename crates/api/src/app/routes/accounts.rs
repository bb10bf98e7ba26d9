use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use ledgerbank_core::AccountNumber;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/accounts/:number/balance", get(balance))
        .route("/accounts/:number/transactions", get(transactions))
}

fn parse_number(raw: &str) -> Result<AccountNumber, axum::response::Response> {
    AccountNumber::parse(raw).map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    })
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number = match parse_number(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.engine().balance(principal.principal(), &number).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "account_number": number.as_str(),
                "balance": balance.minor_units(),
            })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number = match parse_number(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.engine().history(principal.principal(), &number).await {
        Ok(records) => {
            let items = records.iter().map(dto::transaction_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::engine_error_to_response(e),
    }
}
