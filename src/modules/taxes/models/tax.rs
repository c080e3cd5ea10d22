// Tax vocabulary shared by every document type.
//
// Rates are percentages (8 means 8 %). Amounts are exact decimals; rounding
// to whole currency units only happens inside the calculator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{AppError, Result, RoundingPolicy};

/// Per-line tax classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaxClass {
    /// Taxed according to the document's tax mode
    #[default]
    Taxable,
    /// Never taxed
    NonTaxable,
    /// Price already contains tax at the effective rate
    TaxIncluded,
}

impl TaxClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxClass::Taxable => "taxable",
            TaxClass::NonTaxable => "non-taxable",
            TaxClass::TaxIncluded => "tax-included",
        }
    }
}

impl fmt::Display for TaxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaxClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "taxable" => Ok(TaxClass::Taxable),
            "non-taxable" => Ok(TaxClass::NonTaxable),
            "tax-included" => Ok(TaxClass::TaxIncluded),
            _ => Err(format!("Invalid tax class: {}", s)),
        }
    }
}

/// Whether document prices are stated with or without tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaxMode {
    #[default]
    Exclusive,
    Inclusive,
}

impl TaxMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxMode::Exclusive => "exclusive",
            TaxMode::Inclusive => "inclusive",
        }
    }
}

impl fmt::Display for TaxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaxMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclusive" => Ok(TaxMode::Exclusive),
            "inclusive" => Ok(TaxMode::Inclusive),
            _ => Err(format!("Invalid tax mode: {}", s)),
        }
    }
}

/// Document-level tax settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTaxSettings {
    pub tax_mode: TaxMode,
    /// Default rate for lines that carry no rate of their own
    pub tax_rate: Decimal,
    pub rounding_policy: RoundingPolicy,
}

impl DocumentTaxSettings {
    pub fn new(tax_mode: TaxMode, tax_rate: Decimal, rounding_policy: RoundingPolicy) -> Self {
        Self {
            tax_mode,
            tax_rate,
            rounding_policy,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_tax_rate(self.tax_rate)
    }
}

/// Decimal places stored for quantities, prices and rates
pub const MAX_DECIMAL_PLACES: u32 = 4;

/// Upper bound for a quantity, a unit price and their product (10^15)
pub fn max_line_value() -> Decimal {
    Decimal::from(1_000_000_000_000_000_i64)
}

/// Reject values with more decimal places than storage keeps
pub fn validate_decimal_places(field: &str, value: Decimal) -> Result<()> {
    if value.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(AppError::validation(format!(
            "{} cannot have more than {} decimal places, got: {}",
            field, MAX_DECIMAL_PLACES, value
        )));
    }

    Ok(())
}

/// Validate a percentage tax rate (0 to 100 inclusive)
pub fn validate_tax_rate(tax_rate: Decimal) -> Result<()> {
    validate_decimal_places("Tax rate", tax_rate)?;

    if tax_rate < Decimal::ZERO {
        return Err(AppError::validation("Tax rate cannot be negative"));
    }

    if tax_rate > Decimal::ONE_HUNDRED {
        return Err(AppError::validation("Tax rate cannot exceed 100"));
    }

    Ok(())
}

/// The inputs the calculator needs from one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxableLine {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax_class: TaxClass,
    pub tax_rate: Option<Decimal>,
}

impl TaxableLine {
    pub fn new(quantity: Decimal, unit_price: Decimal, tax_class: TaxClass) -> Self {
        Self {
            quantity,
            unit_price,
            tax_class,
            tax_rate: None,
        }
    }

    pub fn with_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }

    /// quantity × unit_price, saturating instead of overflowing
    pub fn amount(&self) -> Decimal {
        self.quantity.saturating_mul(self.unit_price)
    }
}

/// Rounded tax for one rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBucket {
    pub rate: Decimal,
    pub tax_amount: Decimal,
}

/// Calculation result, cached on a document when it is saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedAmounts {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount_8: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount_10: Option<Decimal>,
    pub total_amount: Decimal,
    /// Buckets ordered by rate ascending
    #[serde(default)]
    pub tax_breakdown: Vec<TaxBucket>,
}

impl CalculatedAmounts {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            tax_amount_8: None,
            tax_amount_10: None,
            total_amount: Decimal::ZERO,
            tax_breakdown: Vec::new(),
        }
    }

    /// Tax for a given rate bucket, if the bucket exists
    pub fn tax_for_rate(&self, rate: Decimal) -> Option<Decimal> {
        self.tax_breakdown
            .iter()
            .find(|bucket| bucket.rate == rate)
            .map(|bucket| bucket.tax_amount)
    }
}

impl Default for CalculatedAmounts {
    fn default() -> Self {
        Self::zero()
    }
}
