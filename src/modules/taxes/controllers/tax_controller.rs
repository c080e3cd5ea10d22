//! Tax endpoints used by the document editing forms
//!
//! The form recalculates on every amount-relevant change, so the preview
//! endpoint only validates and calculates; it never touches storage.

use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::documents::models::CalculationRequest;
use crate::modules::documents::services::DocumentService;

/// Calculate amounts for unsaved line items
///
/// POST /taxes/calculate
pub async fn calculate_amounts(
    service: web::Data<Arc<DocumentService>>,
    request: web::Json<CalculationRequest>,
) -> Result<HttpResponse, AppError> {
    let amounts = service.preview(&request)?;

    Ok(HttpResponse::Ok().json(amounts))
}

/// Default tax settings pre-filled into new documents
///
/// GET /taxes/defaults
pub async fn get_defaults(service: web::Data<Arc<DocumentService>>) -> HttpResponse {
    HttpResponse::Ok().json(service.defaults())
}

/// Configure tax routes
pub fn configure_tax_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/taxes")
            .route("/calculate", web::post().to(calculate_amounts))
            .route("/defaults", web::get().to(get_defaults)),
    );
}
