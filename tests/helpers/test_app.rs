// Service and HTTP app builders backed by the in-memory repository

use std::sync::Arc;

use actix_web::{web, App};
use rust_decimal::Decimal;

use bizdocs::core::RoundingPolicy;
use bizdocs::documents::{DocumentRepository, DocumentService};
use bizdocs::middleware::{json_error_handler, ErrorHandler, RequestId};
use bizdocs::taxes::{DocumentTaxSettings, TaxMode};

use super::InMemoryDocumentRepository;

/// Defaults used by every test service: 10 %, tax-exclusive, floor
pub fn test_defaults() -> DocumentTaxSettings {
    DocumentTaxSettings::new(TaxMode::Exclusive, Decimal::from(10), RoundingPolicy::Floor)
}

/// Service plus a handle on its repository for direct inspection
pub fn test_service() -> (Arc<DocumentService>, Arc<InMemoryDocumentRepository>) {
    let repo = Arc::new(InMemoryDocumentRepository::new());
    let dyn_repo: Arc<dyn DocumentRepository> = repo.clone();
    let service = Arc::new(DocumentService::new(dyn_repo, test_defaults()));
    (service, repo)
}

/// Full application as wired in main, minus the database pool and CORS
pub fn test_app(
    service: Arc<DocumentService>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(ErrorHandler)
        .wrap(RequestId)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::Data::new(service))
        .configure(bizdocs::configure_routes)
}
