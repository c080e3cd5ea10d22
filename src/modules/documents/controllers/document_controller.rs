use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::documents::models::{
    ConvertRequest, DocumentRequest, DocumentType, ListDocumentsParams, StatusChangeRequest,
};
use crate::modules::documents::services::DocumentService;

/// Create a new document
/// POST /{type}
pub async fn create_document(
    service: web::Data<Arc<DocumentService>>,
    document_type: web::Data<DocumentType>,
    request: web::Json<DocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let document = service
        .create(**document_type, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(document))
}

/// List documents
/// GET /{type}?status=&department=&client=&limit=&offset=
pub async fn list_documents(
    service: web::Data<Arc<DocumentService>>,
    document_type: web::Data<DocumentType>,
    params: web::Query<ListDocumentsParams>,
) -> Result<HttpResponse, AppError> {
    let query = params.into_inner().into_query(**document_type);
    let documents = service.list(query).await?;

    Ok(HttpResponse::Ok().json(documents))
}

/// Get document by ID
/// GET /{type}/{id}
pub async fn get_document(
    service: web::Data<Arc<DocumentService>>,
    document_type: web::Data<DocumentType>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let document = service.get(**document_type, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(document))
}

/// Replace document contents
/// PUT /{type}/{id}
pub async fn update_document(
    service: web::Data<Arc<DocumentService>>,
    document_type: web::Data<DocumentType>,
    path: web::Path<String>,
    request: web::Json<DocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let document = service
        .update(**document_type, &path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(document))
}

/// Change document status
/// POST /{type}/{id}/status
pub async fn change_status(
    service: web::Data<Arc<DocumentService>>,
    document_type: web::Data<DocumentType>,
    path: web::Path<String>,
    request: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let document = service
        .change_status(**document_type, &path.into_inner(), request.status)
        .await?;

    Ok(HttpResponse::Ok().json(document))
}

/// Convert into a new document of another type
/// POST /{type}/{id}/convert
pub async fn convert_document(
    service: web::Data<Arc<DocumentService>>,
    document_type: web::Data<DocumentType>,
    path: web::Path<String>,
    request: web::Json<ConvertRequest>,
) -> Result<HttpResponse, AppError> {
    let document = service
        .convert(**document_type, &path.into_inner(), request.target_type)
        .await?;

    Ok(HttpResponse::Created().json(document))
}

/// Delete a document
/// DELETE /{type}/{id}
pub async fn delete_document(
    service: web::Data<Arc<DocumentService>>,
    document_type: web::Data<DocumentType>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(**document_type, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure document routes, one scope per document type
pub fn configure(cfg: &mut web::ServiceConfig) {
    for document_type in DocumentType::ALL {
        cfg.service(
            web::scope(document_type.route_segment())
                .app_data(web::Data::new(document_type))
                .route("", web::post().to(create_document))
                .route("", web::get().to(list_documents))
                .route("/{id}", web::get().to(get_document))
                .route("/{id}", web::put().to(update_document))
                .route("/{id}", web::delete().to(delete_document))
                .route("/{id}/status", web::post().to(change_status))
                .route("/{id}/convert", web::post().to(convert_document)),
        );
    }
}
