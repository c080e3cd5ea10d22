use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::modules::taxes::models::{
    CalculatedAmounts, DocumentTaxSettings, TaxBucket, TaxClass, TaxMode, TaxableLine,
};

/// Variant features a document type opts into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorProfile {
    /// Lines may carry their own tax rate
    pub per_line_rate_override: bool,
    /// Subtotal (or inclusive grand total) is rounded with the document policy
    pub round_subtotal: bool,
}

impl Default for CalculatorProfile {
    fn default() -> Self {
        Self {
            per_line_rate_override: true,
            round_subtotal: false,
        }
    }
}

/// Computes subtotal, per-rate tax and grand total for a set of lines.
///
/// Pure: no I/O, never fails. Input validity (sign, bounds, decimal places)
/// is enforced where line items are built; out-of-range sums saturate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountCalculator {
    profile: CalculatorProfile,
}

impl AmountCalculator {
    pub fn new(profile: CalculatorProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> CalculatorProfile {
        self.profile
    }

    /// Rate used for a line: its own when allowed and present, else the document's
    pub fn effective_rate(&self, line: &TaxableLine, settings: &DocumentTaxSettings) -> Decimal {
        match line.tax_rate {
            Some(rate) if self.profile.per_line_rate_override => rate,
            _ => settings.tax_rate,
        }
    }

    pub fn calculate(
        &self,
        lines: &[TaxableLine],
        settings: &DocumentTaxSettings,
    ) -> CalculatedAmounts {
        if lines.is_empty() {
            return CalculatedAmounts::zero();
        }

        let policy = settings.rounding_policy;
        let mut base_sum = Decimal::ZERO;
        let mut gross_sum = Decimal::ZERO;
        // Keyed by normalized rate so that 8 and 8.00 share a bucket.
        // Amounts are summed exactly per bucket and divided once, so the
        // result does not depend on line order.
        let mut buckets: BTreeMap<Decimal, RateSums> = BTreeMap::new();

        for line in lines {
            let amount = line.amount();
            gross_sum = gross_sum.saturating_add(amount);

            let embedded = match line.tax_class {
                TaxClass::NonTaxable => {
                    base_sum = base_sum.saturating_add(amount);
                    continue;
                }
                TaxClass::TaxIncluded => true,
                TaxClass::Taxable => settings.tax_mode == TaxMode::Inclusive,
            };

            let rate = self.effective_rate(line, settings).normalize();
            let sums = buckets.entry(rate).or_default();
            if embedded {
                sums.embedded = sums.embedded.saturating_add(amount);
            } else {
                sums.exclusive = sums.exclusive.saturating_add(amount);
            }
        }

        let mut tax_breakdown = Vec::with_capacity(buckets.len());
        for (rate, sums) in buckets {
            let contained = included_tax(sums.embedded, rate);
            let added = sums.exclusive.saturating_mul(rate) / Decimal::ONE_HUNDRED;
            let mut tax_amount = policy.apply(added.saturating_add(contained));

            // Rounding up must not take more tax than the tax-included amounts hold
            if settings.tax_mode == TaxMode::Inclusive {
                tax_amount = tax_amount.min(sums.embedded.floor());
            }

            base_sum = base_sum
                .saturating_add(sums.exclusive)
                .saturating_add(sums.embedded - contained);
            tax_breakdown.push(TaxBucket { rate, tax_amount });
        }

        let tax_amount = tax_breakdown
            .iter()
            .fold(Decimal::ZERO, |sum, bucket| sum.saturating_add(bucket.tax_amount));

        let (subtotal, total_amount) = match settings.tax_mode {
            TaxMode::Exclusive => {
                let subtotal = if self.profile.round_subtotal {
                    policy.apply(base_sum)
                } else {
                    base_sum.normalize()
                };
                (subtotal, subtotal.saturating_add(tax_amount))
            }
            TaxMode::Inclusive => {
                // The stated amounts already are the total; the base is what remains after tax
                let total = if self.profile.round_subtotal {
                    policy.apply(gross_sum)
                } else {
                    gross_sum.normalize()
                };
                (total.saturating_sub(tax_amount), total)
            }
        };

        let bucket = |rate: u32| {
            let rate = Decimal::from(rate);
            tax_breakdown
                .iter()
                .find(|b| b.rate == rate)
                .map(|b| b.tax_amount)
        };

        CalculatedAmounts {
            subtotal,
            tax_amount,
            tax_amount_8: bucket(8),
            tax_amount_10: bucket(10),
            total_amount,
            tax_breakdown,
        }
    }
}

/// Exact per-rate sums of line amounts
#[derive(Debug, Default)]
struct RateSums {
    /// Amounts tax is added on top of
    exclusive: Decimal,
    /// Amounts that already contain their tax
    embedded: Decimal,
}

/// Tax contained in a tax-included amount: amount × rate / (100 + rate)
fn included_tax(amount: Decimal, rate: Decimal) -> Decimal {
    if rate.is_zero() {
        return Decimal::ZERO;
    }
    amount.saturating_mul(rate) / (Decimal::ONE_HUNDRED + rate)
}
