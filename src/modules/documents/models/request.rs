use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::{Document, DocumentHeader, DocumentStatus, DocumentType};
use super::line_item::{LineItem, LineItemRequest};
use crate::core::RoundingPolicy;
use crate::modules::taxes::models::{CalculatedAmounts, DocumentTaxSettings, TaxMode};

/// Tax settings as submitted; omitted fields take the configured defaults
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TaxSettingsRequest {
    #[serde(default)]
    pub tax_mode: Option<TaxMode>,
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub rounding_policy: Option<RoundingPolicy>,
}

impl TaxSettingsRequest {
    pub fn resolve(&self, defaults: &DocumentTaxSettings) -> DocumentTaxSettings {
        DocumentTaxSettings {
            tax_mode: self.tax_mode.unwrap_or(defaults.tax_mode),
            tax_rate: self.tax_rate.unwrap_or(defaults.tax_rate),
            rounding_policy: self.rounding_policy.unwrap_or(defaults.rounding_policy),
        }
    }
}

/// Body of create and update requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(flatten)]
    pub header: DocumentHeader,
    #[serde(default)]
    pub tax_settings: TaxSettingsRequest,
    pub line_items: Vec<LineItemRequest>,
}

/// Body of the amount preview request sent while a form is being edited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub document_type: DocumentType,
    #[serde(default)]
    pub tax_settings: TaxSettingsRequest,
    #[serde(default)]
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub target_type: DocumentType,
}

/// Document as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    pub document_type: DocumentType,
    #[serde(flatten)]
    pub header: DocumentHeader,
    pub status: DocumentStatus,
    pub is_editable: bool,
    pub tax_settings: DocumentTaxSettings,
    pub amounts: CalculatedAmounts,
    pub source_document_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Omitted in list views
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        let is_editable = document.is_editable();

        Self {
            id: document.id,
            document_type: document.document_type,
            header: document.header,
            status: document.status,
            is_editable,
            tax_settings: document.tax_settings,
            amounts: document.amounts,
            source_document_id: document.source_document_id,
            created_at: document.created_at.to_rfc3339(),
            updated_at: document.updated_at.to_rfc3339(),
            line_items: document.line_items,
        }
    }
}

impl DocumentResponse {
    /// Summary form used by list endpoints
    pub fn summary(document: Document) -> Self {
        let mut response = Self::from(document);
        response.line_items.clear();
        response
    }
}
