//! Business document service library
//!
//! Invoices, estimates, purchase orders and delivery notes with multi-rate
//! tax calculation, persisted through sqlx and served over actix-web.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::documents;
pub use modules::taxes;

use actix_web::web;

/// Register every HTTP route of the service
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(modules::health::controllers::configure)
        .configure(modules::taxes::controllers::configure_tax_routes)
        .configure(modules::documents::controllers::configure);
}
