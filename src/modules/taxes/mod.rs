pub mod controllers;
pub mod models;
pub mod services;

pub use models::{CalculatedAmounts, DocumentTaxSettings, TaxClass, TaxMode};
pub use services::{AmountCalculator, CalculatorProfile};
