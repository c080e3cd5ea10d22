mod document;
mod line_item;
mod query;
mod request;

pub use document::{Document, DocumentHeader, DocumentStatus, DocumentType};
pub use line_item::{LineItem, LineItemRequest};
pub use query::{DocumentQuery, ListDocumentsParams, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use request::{
    CalculationRequest, ConvertRequest, DocumentRequest, DocumentResponse, StatusChangeRequest,
    TaxSettingsRequest,
};
