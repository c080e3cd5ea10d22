use serde::Deserialize;

use super::document::{DocumentStatus, DocumentType};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 100;

/// Filters for document list views.
///
/// Callers pass the viewing context (for example the user's department)
/// explicitly instead of the repository reading it from session state.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub document_type: DocumentType,
    pub status: Option<DocumentStatus>,
    pub department: Option<String>,
    /// Case-insensitive substring of the client name
    pub client: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl DocumentQuery {
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            status: None,
            department: None,
            client: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }

    /// Clamp paging values into the supported range
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_LIST_LIMIT);
        self.offset = self.offset.max(0);
        self.department = self.department.filter(|d| !d.trim().is_empty());
        self.client = self.client.filter(|c| !c.trim().is_empty());
        self
    }
}

/// Query string accepted by list endpoints
#[derive(Debug, Deserialize)]
pub struct ListDocumentsParams {
    pub status: Option<DocumentStatus>,
    pub department: Option<String>,
    pub client: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

impl ListDocumentsParams {
    pub fn into_query(self, document_type: DocumentType) -> DocumentQuery {
        DocumentQuery {
            document_type,
            status: self.status,
            department: self.department,
            client: self.client,
            limit: self.limit,
            offset: self.offset,
        }
        .normalized()
    }
}
