use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::Result;
use crate::modules::documents::models::{
    CalculationRequest, Document, DocumentQuery, DocumentRequest, DocumentResponse,
    DocumentStatus, DocumentType, LineItem,
};
use crate::modules::documents::repositories::DocumentRepository;
use crate::modules::taxes::models::{CalculatedAmounts, DocumentTaxSettings, TaxableLine};

/// Service for document business logic
pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    /// Tax settings applied when a request leaves them out
    defaults: DocumentTaxSettings,
}

impl DocumentService {
    pub fn new(repo: Arc<dyn DocumentRepository>, defaults: DocumentTaxSettings) -> Self {
        Self { repo, defaults }
    }

    pub fn defaults(&self) -> &DocumentTaxSettings {
        &self.defaults
    }

    /// Create a new draft document with calculated amounts
    pub async fn create(
        &self,
        document_type: DocumentType,
        request: DocumentRequest,
    ) -> Result<DocumentResponse> {
        let tax_settings = request.tax_settings.resolve(&self.defaults);
        let line_items = LineItem::from_requests(&request.line_items)?;
        let document = Document::new(document_type, request.header, tax_settings, line_items)?;

        self.ensure_number_available(document_type, &document.header.document_number)
            .await?;
        self.repo.create(&document).await?;

        tracing::info!(
            document_id = %document.id,
            document_type = %document_type,
            total_amount = %document.amounts.total_amount,
            "Document created"
        );

        Ok(DocumentResponse::from(document))
    }

    pub async fn get(&self, document_type: DocumentType, id: &str) -> Result<DocumentResponse> {
        let document = self.load(document_type, id).await?;
        Ok(DocumentResponse::from(document))
    }

    pub async fn list(&self, query: DocumentQuery) -> Result<Vec<DocumentResponse>> {
        let query = query.normalized();
        let documents = self.repo.list(&query).await?;

        Ok(documents
            .into_iter()
            .map(DocumentResponse::summary)
            .collect())
    }

    /// Replace the contents of an editable document and recalculate its amounts
    pub async fn update(
        &self,
        document_type: DocumentType,
        id: &str,
        request: DocumentRequest,
    ) -> Result<DocumentResponse> {
        let mut document = self.load(document_type, id).await?;

        let number_changed = document.header.document_number != request.header.document_number;
        let tax_settings = request.tax_settings.resolve(&self.defaults);
        let line_items = LineItem::from_requests(&request.line_items)?;
        document.replace_contents(request.header, tax_settings, line_items)?;

        if number_changed {
            self.ensure_number_available(document_type, &document.header.document_number)
                .await?;
        }
        self.repo.update(&document).await?;

        tracing::info!(
            document_id = %document.id,
            document_type = %document_type,
            total_amount = %document.amounts.total_amount,
            "Document updated"
        );

        Ok(DocumentResponse::from(document))
    }

    pub async fn change_status(
        &self,
        document_type: DocumentType,
        id: &str,
        status: DocumentStatus,
    ) -> Result<DocumentResponse> {
        let mut document = self.load(document_type, id).await?;
        let previous = document.status;

        document.update_status(status)?;
        self.repo
            .update_status(document_type, id, document.status, document.updated_at)
            .await?;

        tracing::info!(
            document_id = %id,
            from = %previous,
            to = %status,
            "Document status changed"
        );

        Ok(DocumentResponse::from(document))
    }

    pub async fn delete(&self, document_type: DocumentType, id: &str) -> Result<()> {
        let document = self.load(document_type, id).await?;

        if !document.is_deletable() {
            return Err(AppError::conflict(format!(
                "{} in status '{}' cannot be deleted",
                document_type.label(),
                document.status
            )));
        }

        self.repo.delete(document_type, id).await?;
        tracing::info!(document_id = %id, document_type = %document_type, "Document deleted");

        Ok(())
    }

    /// Copy a document into a new draft of another type
    pub async fn convert(
        &self,
        document_type: DocumentType,
        id: &str,
        target_type: DocumentType,
    ) -> Result<DocumentResponse> {
        let source = self.load(document_type, id).await?;
        let number = generate_document_number(target_type);
        let converted = source.convert_to(target_type, number)?;

        self.ensure_number_available(target_type, &converted.header.document_number)
            .await?;
        self.repo.create(&converted).await?;

        tracing::info!(
            source_id = %source.id,
            document_id = %converted.id,
            from = %document_type,
            to = %target_type,
            "Document converted"
        );

        Ok(DocumentResponse::from(converted))
    }

    /// Calculate amounts for unsaved form contents
    pub fn preview(&self, request: &CalculationRequest) -> Result<CalculatedAmounts> {
        let tax_settings = request.tax_settings.resolve(&self.defaults);
        tax_settings.validate()?;

        let line_items = LineItem::from_requests(&request.line_items)?;
        let lines: Vec<TaxableLine> = line_items.iter().map(LineItem::taxable).collect();

        Ok(request
            .document_type
            .calculator()
            .calculate(&lines, &tax_settings))
    }

    async fn load(&self, document_type: DocumentType, id: &str) -> Result<Document> {
        self.repo
            .find_by_id(document_type, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} '{}' not found", document_type.label(), id)))
    }

    async fn ensure_number_available(&self, document_type: DocumentType, number: &str) -> Result<()> {
        if self.repo.exists_by_number(document_type, number).await? {
            return Err(AppError::conflict(format!(
                "Document number '{}' already exists",
                number
            )));
        }
        Ok(())
    }
}

/// Number for a converted document: type prefix plus a short unique suffix
fn generate_document_number(document_type: DocumentType) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("{}-{}", document_type.number_prefix(), suffix)
}
