use cierre_calculator::{
    AmountRange, CalcKind, Calculator, CalculatorInputs, ErrorCode, FixedAmount, FixedRange,
    Percent, PercentRange, Rate, RateFields,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn calculate_with<C: Calculator>(calculator: C, basis: Decimal) -> AmountRange {
    calculator.calculate(&CalculatorInputs::new(basis)).unwrap()
}

#[test]
fn fixed_amount_ignores_basis() {
    let result = calculate_with(FixedAmount::new(dec!(750)).unwrap(), dec!(500000));
    assert_eq!(result, AmountRange::exact(dec!(750)));
}

#[test]
fn fixed_range_passes_bounds_through() {
    let result = calculate_with(FixedRange::new(dec!(1000), dec!(2000)).unwrap(), dec!(1));
    assert_eq!(result, AmountRange { min: dec!(1000), max: dec!(2000) });
}

#[test]
fn percent_calculator_works() {
    let result = calculate_with(Percent::new(dec!(3)).unwrap(), dec!(500000));
    assert_eq!(result.min, dec!(15000));
    assert_eq!(result.min, result.max);
}

#[test]
fn percent_range_calculator_works() {
    let result = calculate_with(PercentRange::new(dec!(1), dec!(1.5)).unwrap(), dec!(200000));
    assert_eq!(result, AmountRange { min: dec!(2000), max: dec!(3000) });
}

#[test]
fn zero_percent_yields_zero_cost() {
    let result = calculate_with(Percent::new(Decimal::ZERO).unwrap(), dec!(350000));
    assert_eq!(result, AmountRange::zero());
}

#[test]
fn constructors_reject_invalid_values() {
    assert!(FixedAmount::new(dec!(-1)).is_err());
    assert!(FixedRange::new(dec!(10), dec!(5)).is_err());
    assert!(Percent::new(dec!(-0.5)).is_err());
    assert!(PercentRange::new(dec!(2), dec!(1)).is_err());
}

#[test]
fn percent_overflow_is_reported_not_panicked() {
    let err = Percent::new(dec!(50))
        .unwrap()
        .calculate(&CalculatorInputs::new(Decimal::MAX))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CalculationOverflow);
}

#[test]
fn rate_deserializes_from_schedule_fields() {
    let fields: RateFields = serde_json::from_str(r#"{"min_pct": 1.5, "max_pct": 2.5}"#).unwrap();
    let rate = Rate::from_fields(CalcKind::PercentRange, &fields).unwrap();
    let result = rate.calculate(&CalculatorInputs::new(dec!(100000))).unwrap();
    assert_eq!(result, AmountRange { min: dec!(1500), max: dec!(2500) });
}
