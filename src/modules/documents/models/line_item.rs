// A line item is one product or service row on a commercial document.
// Its amount is quantity × unit_price, kept exact; rounding happens only
// when the document's tax buckets and totals are calculated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::taxes::models::{
    max_line_value, validate_decimal_places, validate_tax_rate, TaxClass, TaxableLine,
};

/// Represents a single line item on a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub document_id: Option<String>,

    /// Display order within the document, starting at 1
    #[serde(default)]
    pub position: u32,

    /// Product or service name
    pub name: String,

    pub quantity: Decimal,

    pub unit_price: Decimal,

    pub tax_class: TaxClass,

    /// Per-line rate; falls back to the document rate when absent
    #[serde(default)]
    pub tax_rate: Option<Decimal>,

    #[serde(default)]
    pub remarks: Option<String>,

    /// quantity × unit_price
    pub amount: Decimal,
}

/// Line item payload as submitted by the editing form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub tax_class: TaxClass,
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl LineItem {
    /// Create a new line item with validation
    ///
    /// # Arguments
    /// * `name` - Product/service name (max 255 chars)
    /// * `quantity` - Must be positive, at most 4 decimal places
    /// * `unit_price` - Must be non-negative, at most 4 decimal places
    /// * `tax_class` - Tax treatment of this line
    /// * `tax_rate` - Optional percentage overriding the document rate
    pub fn new(
        name: String,
        quantity: Decimal,
        unit_price: Decimal,
        tax_class: TaxClass,
        tax_rate: Option<Decimal>,
    ) -> Result<Self> {
        Self::validate_name(&name)?;
        Self::validate_quantity(quantity)?;
        Self::validate_unit_price(unit_price)?;
        if let Some(rate) = tax_rate {
            validate_tax_rate(rate)?;
        }
        let amount = Self::line_amount(quantity, unit_price)?;

        Ok(Self {
            id: None,
            document_id: None,
            position: 0,
            name,
            quantity,
            unit_price,
            tax_class,
            tax_rate,
            remarks: None,
            amount,
        })
    }

    pub fn with_remarks(mut self, remarks: Option<String>) -> Self {
        self.remarks = remarks.filter(|r| !r.trim().is_empty());
        self
    }

    /// Build validated line items from form input, numbering them in order
    pub fn from_requests(requests: &[LineItemRequest]) -> Result<Vec<Self>> {
        requests
            .iter()
            .enumerate()
            .map(|(idx, req)| {
                let mut item = Self::new(
                    req.name.clone(),
                    req.quantity,
                    req.unit_price,
                    req.tax_class,
                    req.tax_rate,
                )
                .map_err(|e| match e {
                    AppError::Validation(msg) => {
                        AppError::Validation(format!("Line item {}: {}", idx + 1, msg))
                    }
                    other => other,
                })?
                .with_remarks(req.remarks.clone());
                item.position = idx as u32 + 1;
                Ok(item)
            })
            .collect()
    }

    /// The calculator's view of this line
    pub fn taxable(&self) -> TaxableLine {
        TaxableLine {
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_class: self.tax_class,
            tax_rate: self.tax_rate,
        }
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Line item name cannot be empty"));
        }

        if name.chars().count() > 255 {
            return Err(AppError::validation(
                "Line item name cannot exceed 255 characters",
            ));
        }

        Ok(())
    }

    fn validate_quantity(quantity: Decimal) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Quantity must be positive, got: {}",
                quantity
            )));
        }

        if quantity > max_line_value() {
            return Err(AppError::validation(format!(
                "Quantity cannot exceed {}, got: {}",
                max_line_value(),
                quantity
            )));
        }

        validate_decimal_places("Quantity", quantity)?;

        Ok(())
    }

    fn validate_unit_price(unit_price: Decimal) -> Result<()> {
        if unit_price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Unit price must be non-negative, got: {}",
                unit_price
            )));
        }

        if unit_price > max_line_value() {
            return Err(AppError::validation(format!(
                "Unit price cannot exceed {}, got: {}",
                max_line_value(),
                unit_price
            )));
        }

        validate_decimal_places("Unit price", unit_price)?;

        Ok(())
    }

    /// quantity × unit_price, bounded so document totals stay representable
    fn line_amount(quantity: Decimal, unit_price: Decimal) -> Result<Decimal> {
        quantity
            .checked_mul(unit_price)
            .filter(|amount| *amount <= max_line_value())
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Line amount cannot exceed {}, got quantity {} at unit price {}",
                    max_line_value(),
                    quantity,
                    unit_price
                ))
            })
    }
}
