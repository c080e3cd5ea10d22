// Commercial documents: invoices, estimates, purchase orders and delivery notes.
//
// All four share one shape. The document type decides which calculator
// features apply (per-line rates, subtotal rounding) and which conversions
// are allowed. Amounts are a snapshot recalculated whenever the contents
// change and stored with the document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::line_item::LineItem;
use crate::core::{AppError, Result};
use crate::modules::taxes::models::{CalculatedAmounts, DocumentTaxSettings, TaxableLine};
use crate::modules::taxes::services::{AmountCalculator, CalculatorProfile};

/// Kind of commercial document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    Estimate,
    PurchaseOrder,
    DeliveryNote,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Invoice,
        DocumentType::Estimate,
        DocumentType::PurchaseOrder,
        DocumentType::DeliveryNote,
    ];

    /// Calculator features this document type supports
    pub fn profile(&self) -> CalculatorProfile {
        match self {
            DocumentType::Invoice | DocumentType::DeliveryNote => CalculatorProfile {
                per_line_rate_override: true,
                round_subtotal: false,
            },
            DocumentType::Estimate => CalculatorProfile {
                per_line_rate_override: false,
                round_subtotal: false,
            },
            DocumentType::PurchaseOrder => CalculatorProfile {
                per_line_rate_override: true,
                round_subtotal: true,
            },
        }
    }

    pub fn calculator(&self) -> AmountCalculator {
        AmountCalculator::new(self.profile())
    }

    /// URL path segment for this type's resources
    pub fn route_segment(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "/invoices",
            DocumentType::Estimate => "/estimates",
            DocumentType::PurchaseOrder => "/purchase-orders",
            DocumentType::DeliveryNote => "/delivery-notes",
        }
    }

    /// Prefix for generated document numbers
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "INV",
            DocumentType::Estimate => "EST",
            DocumentType::PurchaseOrder => "PO",
            DocumentType::DeliveryNote => "DN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::Estimate => "Estimate",
            DocumentType::PurchaseOrder => "Purchase order",
            DocumentType::DeliveryNote => "Delivery note",
        }
    }

    pub fn can_convert_to(&self, target: DocumentType) -> bool {
        matches!(
            (self, target),
            (DocumentType::Estimate, DocumentType::Invoice)
                | (DocumentType::Estimate, DocumentType::PurchaseOrder)
                | (DocumentType::PurchaseOrder, DocumentType::DeliveryNote)
                | (DocumentType::DeliveryNote, DocumentType::Invoice)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Estimate => "estimate",
            DocumentType::PurchaseOrder => "purchase_order",
            DocumentType::DeliveryNote => "delivery_note",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DocumentType::Invoice),
            "estimate" => Ok(DocumentType::Estimate),
            "purchase_order" => Ok(DocumentType::PurchaseOrder),
            "delivery_note" => Ok(DocumentType::DeliveryNote),
            _ => Err(format!("Invalid document type: {}", s)),
        }
    }
}

/// Document status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being prepared, not yet sent to the client
    #[default]
    Draft,
    /// Sent to the client
    Issued,
    /// Paid, accepted or delivered, depending on the document type
    Completed,
    Cancelled,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Issued => "issued",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Draft, DocumentStatus::Issued)
                | (DocumentStatus::Draft, DocumentStatus::Cancelled)
                | (DocumentStatus::Issued, DocumentStatus::Draft)
                | (DocumentStatus::Issued, DocumentStatus::Completed)
                | (DocumentStatus::Issued, DocumentStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "issued" => Ok(DocumentStatus::Issued),
            "completed" => Ok(DocumentStatus::Completed),
            "cancelled" => Ok(DocumentStatus::Cancelled),
            _ => Err(format!("Invalid document status: {}", s)),
        }
    }
}

/// Descriptive fields of a document, everything except lines and tax settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub document_number: String,
    pub title: String,
    pub client_name: String,
    #[serde(default)]
    pub department: Option<String>,
    pub issue_date: NaiveDate,
    /// Payment due date, validity limit or delivery date depending on type
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DocumentHeader {
    pub fn validate(&self) -> Result<()> {
        validate_text("Document number", &self.document_number, 50)?;
        validate_text("Title", &self.title, 255)?;
        validate_text("Client name", &self.client_name, 255)?;

        if let Some(due_date) = self.due_date {
            if due_date < self.issue_date {
                return Err(AppError::validation(
                    "Due date cannot be earlier than issue date",
                ));
            }
        }

        Ok(())
    }
}

fn validate_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} cannot be empty", field)));
    }

    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }

    Ok(())
}

/// A commercial document with its cached amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub document_type: DocumentType,
    #[serde(flatten)]
    pub header: DocumentHeader,
    pub status: DocumentStatus,
    pub tax_settings: DocumentTaxSettings,
    pub amounts: CalculatedAmounts,
    /// Document this one was converted from
    pub source_document_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
}

impl Document {
    /// Create a new draft document with validation and calculated amounts
    pub fn new(
        document_type: DocumentType,
        header: DocumentHeader,
        tax_settings: DocumentTaxSettings,
        line_items: Vec<LineItem>,
    ) -> Result<Self> {
        header.validate()?;
        tax_settings.validate()?;
        Self::validate_line_items(&line_items)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut document = Self {
            id,
            document_type,
            header,
            status: DocumentStatus::Draft,
            tax_settings,
            amounts: CalculatedAmounts::zero(),
            source_document_id: None,
            created_at: now,
            updated_at: now,
            line_items,
        };
        document.attach_line_items();
        document.recalculate();

        Ok(document)
    }

    /// Lines and settings can change only before the document is settled
    pub fn is_editable(&self) -> bool {
        matches!(self.status, DocumentStatus::Draft | DocumentStatus::Issued)
    }

    pub fn is_deletable(&self) -> bool {
        matches!(self.status, DocumentStatus::Draft | DocumentStatus::Cancelled)
    }

    /// Recompute the amounts snapshot from the current lines and settings
    pub fn recalculate(&mut self) {
        let calculator = self.document_type.calculator();

        if !calculator.profile().per_line_rate_override {
            for item in &mut self.line_items {
                if item.tax_rate.take().is_some() {
                    tracing::debug!(
                        document_type = %self.document_type,
                        position = item.position,
                        "Dropping per-line tax rate not supported by document type"
                    );
                }
            }
        }

        let lines: Vec<TaxableLine> = self.line_items.iter().map(LineItem::taxable).collect();
        self.amounts = calculator.calculate(&lines, &self.tax_settings);
    }

    /// Replace header, settings and lines of an editable document
    pub fn replace_contents(
        &mut self,
        header: DocumentHeader,
        tax_settings: DocumentTaxSettings,
        line_items: Vec<LineItem>,
    ) -> Result<()> {
        if !self.is_editable() {
            return Err(AppError::conflict(format!(
                "{} in status '{}' cannot be edited",
                self.document_type.label(),
                self.status
            )));
        }

        header.validate()?;
        tax_settings.validate()?;
        Self::validate_line_items(&line_items)?;

        self.header = header;
        self.tax_settings = tax_settings;
        self.line_items = line_items;
        self.attach_line_items();
        self.recalculate();
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Update status, enforcing the allowed transitions
    pub fn update_status(&mut self, new_status: DocumentStatus) -> Result<()> {
        if !self.status.can_transition_to(new_status) {
            return Err(AppError::conflict(format!(
                "Invalid status transition from {} to {}",
                self.status, new_status
            )));
        }

        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Copy this document into a new draft of another type
    pub fn convert_to(&self, target: DocumentType, document_number: String) -> Result<Self> {
        if !self.document_type.can_convert_to(target) {
            return Err(AppError::validation(format!(
                "{} cannot be converted to {}",
                self.document_type.label(),
                target.label().to_lowercase()
            )));
        }

        if self.status == DocumentStatus::Cancelled {
            return Err(AppError::conflict("Cancelled documents cannot be converted"));
        }

        let header = DocumentHeader {
            document_number,
            ..self.header.clone()
        };
        let line_items = self
            .line_items
            .iter()
            .map(|item| LineItem {
                id: None,
                document_id: None,
                ..item.clone()
            })
            .collect();

        let mut converted = Self::new(target, header, self.tax_settings, line_items)?;
        converted.source_document_id = Some(self.id.clone());
        Ok(converted)
    }

    fn attach_line_items(&mut self) {
        for (idx, item) in self.line_items.iter_mut().enumerate() {
            item.id.get_or_insert_with(|| Uuid::new_v4().to_string());
            item.document_id = Some(self.id.clone());
            item.position = idx as u32 + 1;
        }
    }

    fn validate_line_items(line_items: &[LineItem]) -> Result<()> {
        if line_items.is_empty() {
            return Err(AppError::validation(
                "Document must have at least one line item",
            ));
        }

        Ok(())
    }
}
