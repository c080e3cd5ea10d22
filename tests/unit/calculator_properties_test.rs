// Property tests for the amount calculator
//
// Whatever the lines, the calculated amounts must stay internally
// consistent and independent of how often they are recomputed.

use proptest::prelude::*;
use rust_decimal::Decimal;

use bizdocs::core::RoundingPolicy;
use bizdocs::documents::DocumentType;
use bizdocs::taxes::models::{DocumentTaxSettings, TaxClass, TaxMode, TaxableLine};
use bizdocs::taxes::{AmountCalculator, CalculatorProfile};

fn tax_class() -> impl Strategy<Value = TaxClass> {
    prop_oneof![
        Just(TaxClass::Taxable),
        Just(TaxClass::NonTaxable),
        Just(TaxClass::TaxIncluded),
    ]
}

fn policy() -> impl Strategy<Value = RoundingPolicy> {
    prop_oneof![
        Just(RoundingPolicy::Floor),
        Just(RoundingPolicy::Ceil),
        Just(RoundingPolicy::Round),
    ]
}

fn mode() -> impl Strategy<Value = TaxMode> {
    prop_oneof![Just(TaxMode::Exclusive), Just(TaxMode::Inclusive)]
}

fn rate() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        Just(Decimal::from(8)),
        Just(Decimal::from(10)),
        (1u32..=100).prop_map(Decimal::from),
    ]
}

/// Quantities with up to two decimals, prices in whole currency units
fn line() -> impl Strategy<Value = TaxableLine> {
    (1i64..=10_000, 0i64..=2_000_000, tax_class(), proptest::option::of(rate())).prop_map(
        |(quantity_cents, price, class, line_rate)| {
            let line = TaxableLine::new(Decimal::new(quantity_cents, 2), Decimal::from(price), class);
            match line_rate {
                Some(r) => line.with_rate(r),
                None => line,
            }
        },
    )
}

/// Small tax-included lines: quantities 0.01 to 2.00, prices 0 to 20
fn small_line() -> impl Strategy<Value = TaxableLine> {
    (1i64..=200, 0i64..=20, tax_class(), proptest::option::of(rate())).prop_map(
        |(quantity_cents, price, class, line_rate)| {
            let line = TaxableLine::new(Decimal::new(quantity_cents, 2), Decimal::from(price), class);
            match line_rate {
                Some(r) => line.with_rate(r),
                None => line,
            }
        },
    )
}

fn settings() -> impl Strategy<Value = DocumentTaxSettings> {
    (mode(), rate(), policy()).prop_map(|(m, r, p)| DocumentTaxSettings::new(m, r, p))
}

fn profile() -> impl Strategy<Value = CalculatorProfile> {
    prop_oneof![
        Just(DocumentType::Invoice.profile()),
        Just(DocumentType::Estimate.profile()),
        Just(DocumentType::PurchaseOrder.profile()),
    ]
}

proptest! {
    #[test]
    fn total_is_subtotal_plus_tax(
        lines in prop::collection::vec(line(), 0..12),
        settings in settings(),
        profile in profile(),
    ) {
        let result = AmountCalculator::new(profile).calculate(&lines, &settings);
        prop_assert_eq!(result.subtotal + result.tax_amount, result.total_amount);
    }

    #[test]
    fn tax_is_sum_of_buckets(
        lines in prop::collection::vec(line(), 0..12),
        settings in settings(),
    ) {
        let result = AmountCalculator::default().calculate(&lines, &settings);
        let bucket_sum: Decimal = result.tax_breakdown.iter().map(|b| b.tax_amount).sum();

        prop_assert_eq!(result.tax_amount, bucket_sum);
        for bucket in &result.tax_breakdown {
            prop_assert!(bucket.tax_amount >= Decimal::ZERO);
            prop_assert_eq!(bucket.tax_amount.fract(), Decimal::ZERO);
        }
    }

    #[test]
    fn non_taxable_lines_never_carry_tax(
        lines in prop::collection::vec(line(), 1..12),
        settings in settings(),
    ) {
        let lines: Vec<TaxableLine> = lines
            .into_iter()
            .map(|l| TaxableLine { tax_class: TaxClass::NonTaxable, ..l })
            .collect();
        let result = AmountCalculator::default().calculate(&lines, &settings);

        prop_assert_eq!(result.tax_amount, Decimal::ZERO);
        prop_assert_eq!(result.total_amount, result.subtotal);
    }

    #[test]
    fn exclusive_total_never_below_subtotal(
        lines in prop::collection::vec(line(), 0..12),
        rate in rate(),
        policy in policy(),
    ) {
        let settings = DocumentTaxSettings::new(TaxMode::Exclusive, rate, policy);
        let result = AmountCalculator::default().calculate(&lines, &settings);

        prop_assert!(result.total_amount >= result.subtotal);
    }

    #[test]
    fn calculation_is_idempotent(
        lines in prop::collection::vec(line(), 0..12),
        settings in settings(),
        profile in profile(),
    ) {
        let calculator = AmountCalculator::new(profile);
        let first = calculator.calculate(&lines, &settings);
        let second = calculator.calculate(&lines, &settings);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn line_order_does_not_change_amounts(
        lines in prop::collection::vec(line(), 0..12),
        settings in settings(),
    ) {
        let calculator = AmountCalculator::default();
        let mut reversed = lines.clone();
        reversed.reverse();

        let forward = calculator.calculate(&lines, &settings);
        let backward = calculator.calculate(&reversed, &settings);

        prop_assert_eq!(forward.tax_amount, backward.tax_amount);
        prop_assert_eq!(forward.total_amount, backward.total_amount);
    }

    #[test]
    fn inclusive_subtotal_never_negative(
        lines in prop::collection::vec(prop_oneof![line(), small_line()], 0..12),
        rate in rate(),
        policy in policy(),
        profile in profile(),
    ) {
        let settings = DocumentTaxSettings::new(TaxMode::Inclusive, rate, policy);
        let result = AmountCalculator::new(profile).calculate(&lines, &settings);

        prop_assert!(result.subtotal >= Decimal::ZERO, "subtotal {}", result.subtotal);
        prop_assert!(result.tax_amount <= result.total_amount);
    }
}
