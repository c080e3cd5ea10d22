mod tax;

pub use tax::{
    max_line_value, validate_decimal_places, validate_tax_rate, CalculatedAmounts,
    DocumentTaxSettings, TaxBucket, TaxClass, TaxMode, TaxableLine, MAX_DECIMAL_PLACES,
};
