// Documents module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Document, DocumentStatus, DocumentType, LineItem};
pub use repositories::{DocumentRepository, MySqlDocumentRepository};
pub use services::DocumentService;
