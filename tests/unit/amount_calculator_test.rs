// Amount calculator scenarios
//
// Known-value checks for tax buckets, tax modes and rounding policies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bizdocs::core::RoundingPolicy;
use bizdocs::documents::DocumentType;
use bizdocs::taxes::models::{DocumentTaxSettings, TaxClass, TaxMode, TaxableLine};
use bizdocs::taxes::{AmountCalculator, CalculatedAmounts, CalculatorProfile};

fn settings(mode: TaxMode, rate: Decimal, policy: RoundingPolicy) -> DocumentTaxSettings {
    DocumentTaxSettings::new(mode, rate, policy)
}

fn taxable(amount: Decimal) -> TaxableLine {
    TaxableLine::new(Decimal::ONE, amount, TaxClass::Taxable)
}

#[test]
fn test_exact_tax_with_floor() {
    let result = AmountCalculator::default().calculate(
        &[taxable(dec!(1000))],
        &settings(TaxMode::Exclusive, dec!(10), RoundingPolicy::Floor),
    );

    assert_eq!(result.tax_amount, dec!(100));
    assert_eq!(result.total_amount, dec!(1100));
}

#[test]
fn test_mixed_rate_scenario() {
    let lines = [
        taxable(dec!(1000000)),
        taxable(dec!(500000)).with_rate(dec!(8)),
    ];
    let result = AmountCalculator::default().calculate(
        &lines,
        &settings(TaxMode::Exclusive, dec!(10), RoundingPolicy::Floor),
    );

    assert_eq!(result.subtotal, dec!(1500000));
    assert_eq!(result.tax_amount_10, Some(dec!(100000)));
    assert_eq!(result.tax_amount_8, Some(dec!(40000)));
    assert_eq!(result.tax_amount, dec!(140000));
    assert_eq!(result.total_amount, dec!(1640000));

    // Breakdown is ordered by rate
    let rates: Vec<Decimal> = result.tax_breakdown.iter().map(|b| b.rate).collect();
    assert_eq!(rates, vec![dec!(8), dec!(10)]);
}

#[test]
fn test_inclusive_mode_reconstructs_amount() {
    let result = AmountCalculator::default().calculate(
        &[taxable(dec!(1100))],
        &settings(TaxMode::Inclusive, dec!(10), RoundingPolicy::Floor),
    );

    assert_eq!(result.subtotal, dec!(1000));
    assert_eq!(result.tax_amount, dec!(100));
    assert_eq!(result.total_amount, dec!(1100));
}

#[test]
fn test_inclusive_mode_total_is_original_sum_with_remainder() {
    // 1000 at 8 % inclusive: tax 74.07..., floored to 74
    let result = AmountCalculator::default().calculate(
        &[taxable(dec!(1000))],
        &settings(TaxMode::Inclusive, dec!(8), RoundingPolicy::Floor),
    );

    assert_eq!(result.tax_amount, dec!(74));
    assert_eq!(result.subtotal, dec!(926));
    assert_eq!(result.total_amount, dec!(1000));
    assert_eq!(result.subtotal + result.tax_amount, result.total_amount);
}

#[test]
fn test_empty_items_are_all_zero() {
    for mode in [TaxMode::Exclusive, TaxMode::Inclusive] {
        let result = AmountCalculator::default()
            .calculate(&[], &settings(mode, dec!(10), RoundingPolicy::Ceil));

        assert_eq!(result, CalculatedAmounts::zero());
        assert_eq!(result.subtotal, Decimal::ZERO);
        assert_eq!(result.tax_amount, Decimal::ZERO);
        assert_eq!(result.total_amount, Decimal::ZERO);
    }
}

#[test]
fn test_rounding_policies_on_fractional_tax() {
    // 334 at 10 % = 33.4
    let lines = [taxable(dec!(334))];
    let expected = [
        (RoundingPolicy::Floor, dec!(33)),
        (RoundingPolicy::Ceil, dec!(34)),
        (RoundingPolicy::Round, dec!(33)),
    ];

    for (policy, tax) in expected {
        let result = AmountCalculator::default()
            .calculate(&lines, &settings(TaxMode::Exclusive, dec!(10), policy));
        assert_eq!(result.tax_amount, tax, "policy {}", policy);
    }
}

#[test]
fn test_non_taxable_lines_carry_no_tax() {
    let lines = [
        TaxableLine::new(dec!(3), dec!(1200), TaxClass::NonTaxable),
        TaxableLine::new(dec!(1), dec!(999), TaxClass::NonTaxable).with_rate(dec!(8)),
    ];

    for mode in [TaxMode::Exclusive, TaxMode::Inclusive] {
        let result = AmountCalculator::default()
            .calculate(&lines, &settings(mode, dec!(10), RoundingPolicy::Floor));

        assert_eq!(result.tax_amount, Decimal::ZERO);
        assert!(result.tax_breakdown.is_empty());
        assert_eq!(result.subtotal, dec!(4599));
        assert_eq!(result.total_amount, result.subtotal);
    }
}

#[test]
fn test_tax_included_lines_in_exclusive_document() {
    let lines = [
        taxable(dec!(2000)),
        TaxableLine::new(dec!(1), dec!(1080), TaxClass::TaxIncluded).with_rate(dec!(8)),
    ];
    let result = AmountCalculator::default().calculate(
        &lines,
        &settings(TaxMode::Exclusive, dec!(10), RoundingPolicy::Floor),
    );

    assert_eq!(result.tax_amount_10, Some(dec!(200)));
    assert_eq!(result.tax_amount_8, Some(dec!(80)));
    assert_eq!(result.subtotal, dec!(3000));
    assert_eq!(result.total_amount, dec!(3280));
}

#[test]
fn test_arbitrary_rate_bucket() {
    let lines = [taxable(dec!(1000)).with_rate(dec!(5.5))];
    let result = AmountCalculator::default().calculate(
        &lines,
        &settings(TaxMode::Exclusive, dec!(10), RoundingPolicy::Round),
    );

    assert_eq!(result.tax_for_rate(dec!(5.5)), Some(dec!(55)));
    assert_eq!(result.tax_amount_8, None);
    assert_eq!(result.tax_amount_10, None);
}

#[test]
fn test_zero_rate_bucket_is_kept() {
    let result = AmountCalculator::default().calculate(
        &[taxable(dec!(1000))],
        &settings(TaxMode::Exclusive, dec!(0), RoundingPolicy::Floor),
    );

    assert_eq!(result.tax_for_rate(Decimal::ZERO), Some(Decimal::ZERO));
    assert_eq!(result.total_amount, dec!(1000));
}

#[test]
fn test_document_type_profiles() {
    let lines = [TaxableLine::new(dec!(1.5), dec!(1001), TaxClass::Taxable).with_rate(dec!(8))];
    let doc_settings = settings(TaxMode::Exclusive, dec!(10), RoundingPolicy::Floor);

    // Invoices keep the per-line rate and an exact subtotal
    let invoice = DocumentType::Invoice.calculator().calculate(&lines, &doc_settings);
    assert_eq!(invoice.subtotal, dec!(1501.5));
    assert_eq!(invoice.tax_amount_8, Some(dec!(120)));
    assert_eq!(invoice.total_amount, dec!(1621.5));

    // Purchase orders round the subtotal with the document policy
    let order = DocumentType::PurchaseOrder.calculator().calculate(&lines, &doc_settings);
    assert_eq!(order.subtotal, dec!(1501));
    assert_eq!(order.total_amount, dec!(1621));

    // Estimates ignore the per-line rate
    let estimate = DocumentType::Estimate.calculator().calculate(&lines, &doc_settings);
    assert_eq!(estimate.tax_amount_8, None);
    assert_eq!(estimate.tax_amount_10, Some(dec!(150)));
}

#[test]
fn test_profile_flags_by_document_type() {
    assert_eq!(
        DocumentType::Estimate.profile(),
        CalculatorProfile {
            per_line_rate_override: false,
            round_subtotal: false
        }
    );
    assert!(DocumentType::PurchaseOrder.profile().round_subtotal);
    assert!(!DocumentType::Invoice.profile().round_subtotal);
    assert!(DocumentType::DeliveryNote.profile().per_line_rate_override);
}

#[test]
fn test_inclusive_ceil_on_fractional_quantity() {
    let lines = [TaxableLine::new(dec!(0.5), dec!(1), TaxClass::Taxable)];
    let result = AmountCalculator::default().calculate(
        &lines,
        &settings(TaxMode::Inclusive, dec!(10), RoundingPolicy::Ceil),
    );

    assert_eq!(result.tax_amount, dec!(0));
    assert_eq!(result.subtotal, dec!(0.5));
    assert_eq!(result.total_amount, dec!(0.5));
}
