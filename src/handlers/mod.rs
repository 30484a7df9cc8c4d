/// HTTP handlers module
/// One submodule per exercise group, sharing the store-error mapping.

pub mod bank;
pub mod courses;
pub mod posts;
pub mod tasks;

use actix_web::{HttpResponse, Result as ActixResult};
use serde_json::json;

use crate::db::StoreError;

/// Map a store error onto its HTTP response.
pub(crate) fn error_response(err: StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(entity) => not_found(entity),
        StoreError::BadRequest => bad_request(),
        StoreError::TransactionDecided => HttpResponse::Forbidden().json(json!({
            "Forbidden": "Can not edit this transaction."
        })),
        StoreError::Sqlite(e) => {
            log::error!("Database error: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }))
        }
    }
}

pub(crate) fn not_found(entity: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": format!("{entity} not found")
    }))
}

pub(crate) fn bad_request() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "error": "Bad request"
    }))
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "error": "Unauthorized"
    }))
}

/// Health check endpoint
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok"
    })))
}
