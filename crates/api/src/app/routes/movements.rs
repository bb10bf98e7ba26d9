use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use ledgerbank_ledger::{RawMovement, RawTransfer};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/transfer", post(transfer))
}

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<RawMovement>,
) -> axum::response::Response {
    match services.engine().deposit(principal.principal(), body).await {
        Ok(receipt) => (StatusCode::OK, Json(dto::receipt_to_json(receipt))).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<RawMovement>,
) -> axum::response::Response {
    match services.engine().withdraw(principal.principal(), body).await {
        Ok(receipt) => (StatusCode::OK, Json(dto::receipt_to_json(receipt))).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<RawTransfer>,
) -> axum::response::Response {
    match services.engine().transfer(principal.principal(), body).await {
        Ok(receipt) => {
            (StatusCode::OK, Json(dto::transfer_receipt_to_json(receipt))).into_response()
        }
        Err(e) => errors::engine_error_to_response(e),
    }
}
