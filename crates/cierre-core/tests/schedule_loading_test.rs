use cierre_core::*;
use rust_decimal_macros::dec;
use serde_json::json;

const SAMPLE_SCHEDULE: &str = include_str!("../../../data/fee_schedule.json");

fn minimal_schedule(
    fee_definitions: serde_json::Value,
    state_rates: serde_json::Value,
) -> serde_json::Value {
    json!({
        "metadata": { "version": "test" },
        "fee_definitions": fee_definitions,
        "state_rates": state_rates,
    })
}

fn validation_message(result: CierreResult<FeeSchedule>) -> String {
    match result {
        Err(CierreError::Validation { message, .. }) => message,
        Err(other) => panic!("Expected validation error, got {other:?}"),
        Ok(_) => panic!("Expected validation error, schedule loaded"),
    }
}

#[test]
fn test_sample_schedule_loads() {
    let schedule = FeeSchedule::load(SAMPLE_SCHEDULE).unwrap();

    assert_eq!(schedule.metadata().version.as_deref(), Some("2025.12"));
    assert_eq!(schedule.metadata().currency.as_deref(), Some("USD"));
    assert_eq!(schedule.definitions().len(), 16);
    assert_eq!(schedule.definitions()[0].id, "isai");
    assert_eq!(schedule.definitions()[0].basis, Basis::GreaterOfPriceAndAssessed);
    assert!(schedule.definitions()[0].is_state_dependent());

    let states: Vec<&str> = schedule.states().collect();
    assert_eq!(states.len(), 4);
    assert!(states.contains(&"Yucatán"));
    assert_eq!(schedule.instructions().notes.len(), 3);
}

#[test]
fn test_unknown_top_level_keys_are_ignored() {
    let mut document: serde_json::Value = serde_json::from_str(SAMPLE_SCHEDULE).unwrap();
    document["renderer"] = json!({ "font": "DejaVuSans", "dpi": 300 });
    assert!(FeeSchedule::from_value(document).is_ok());
}

#[test]
fn test_glossary_lookup() {
    let schedule = FeeSchedule::load(SAMPLE_SCHEDULE).unwrap();
    assert!(schedule.glossary_term("ISAI").unwrap().contains("acquisition tax"));
    assert!(schedule.glossary_term("fideicomiso").is_some());
    assert!(schedule.glossary_term("Escritura").is_none());
}

#[test]
fn test_rate_for_resolves_state_and_schedule_rates() {
    let schedule = FeeSchedule::load(SAMPLE_SCHEDULE).unwrap();

    let isai = schedule.rate_for("isai", "Quintana Roo").unwrap();
    assert!(matches!(isai, Rate::Percent(p) if p.percent == dec!(3)));

    let isai = schedule.rate_for("isai", "yucatan").unwrap();
    assert!(matches!(isai, Rate::Percent(p) if p.percent == dec!(2.5)));

    let escrow = schedule.rate_for("escrow", "Jalisco").unwrap();
    assert!(matches!(escrow, Rate::Fixed(f) if f.amount == dec!(750)));
}

#[test]
fn test_rate_for_lookup_failures() {
    let schedule = FeeSchedule::load(SAMPLE_SCHEDULE).unwrap();

    let err = schedule.rate_for("isai", "Oaxaca").unwrap_err();
    assert!(matches!(
        err,
        CierreError::Lookup { ref state, .. } if state.as_deref() == Some("Oaxaca")
    ));

    let err = schedule.rate_for("stamp_duty", "Jalisco").unwrap_err();
    assert!(matches!(
        err,
        CierreError::Lookup { ref fee_id, .. } if fee_id.as_deref() == Some("stamp_duty")
    ));

    assert!(matches!(
        schedule.rate_for("attorney", "Jalisco"),
        Err(CierreError::Lookup { .. })
    ));
}

#[test]
fn test_unrecognized_calc_type_is_rejected() {
    let document = minimal_schedule(
        json!([{ "id": "notary", "label": "Notary", "calc_type": "percentage", "percent": 1.0 }]),
        json!({}),
    );
    let message = validation_message(FeeSchedule::from_value(document));
    assert!(message.contains("percentage"), "{message}");
}

#[test]
fn test_negative_values_are_rejected() {
    let document = minimal_schedule(
        json!([{ "id": "escrow", "label": "Escrow", "calc_type": "fixed", "amount": -750 }]),
        json!({}),
    );
    validation_message(FeeSchedule::from_value(document));

    let document = minimal_schedule(
        json!([{ "id": "isai", "label": "ISAI", "calc_type": "percent", "state_dependent": true }]),
        json!({ "Jalisco": { "isai": { "percent": -2.0 } } }),
    );
    let message = validation_message(FeeSchedule::from_value(document));
    assert!(message.contains("Jalisco"), "{message}");
}

#[test]
fn test_fields_must_match_calc_type() {
    let document = minimal_schedule(
        json!([{ "id": "escrow", "label": "Escrow", "calc_type": "fixed", "min": 1, "max": 2 }]),
        json!({}),
    );
    validation_message(FeeSchedule::from_value(document));

    let document = minimal_schedule(
        json!([{
            "id": "attorney",
            "label": "Attorney",
            "calc_type": "user_entered",
            "amount": 2500
        }]),
        json!({}),
    );
    validation_message(FeeSchedule::from_value(document));

    let document = minimal_schedule(
        json!([{
            "id": "appraisal",
            "label": "Appraisal",
            "calc_type": "fixed_range",
            "min": 2500,
            "max": 500
        }]),
        json!({}),
    );
    validation_message(FeeSchedule::from_value(document));
}

#[test]
fn test_state_dependent_fee_needs_every_state() {
    let document = minimal_schedule(
        json!([{ "id": "isai", "label": "ISAI", "calc_type": "percent", "state_dependent": true }]),
        json!({
            "Jalisco": { "isai": { "percent": 2.0 } },
            "Nayarit": {}
        }),
    );
    let message = validation_message(FeeSchedule::from_value(document));
    assert!(message.contains("Nayarit"), "{message}");
}

#[test]
fn test_state_scoped_fee_only_needs_its_states() {
    let document = minimal_schedule(
        json!([{
            "id": "zofemat",
            "label": "Federal Zone Review",
            "calc_type": "fixed",
            "state_dependent": true,
            "applies_when": { "states": ["Baja California Sur"] }
        }]),
        json!({
            "Baja California Sur": { "zofemat": { "amount": 300 } },
            "Jalisco": {}
        }),
    );
    assert!(FeeSchedule::from_value(document).is_ok());

    let document = minimal_schedule(
        json!([{
            "id": "zofemat",
            "label": "Federal Zone Review",
            "calc_type": "fixed",
            "state_dependent": true,
            "applies_when": { "states": ["Sonora"] }
        }]),
        json!({ "Jalisco": {} }),
    );
    let message = validation_message(FeeSchedule::from_value(document));
    assert!(message.contains("sonora"), "{message}");
}

#[test]
fn test_state_dependent_fee_without_state_rates() {
    let document = minimal_schedule(
        json!([{ "id": "isai", "label": "ISAI", "calc_type": "percent", "state_dependent": true }]),
        json!({}),
    );
    validation_message(FeeSchedule::from_value(document));
}

#[test]
fn test_duplicate_ids_and_malformed_documents() {
    let document = minimal_schedule(
        json!([
            { "id": "escrow", "label": "Escrow", "calc_type": "fixed", "amount": 750 },
            { "id": "escrow", "label": "Escrow again", "calc_type": "fixed", "amount": 800 }
        ]),
        json!({}),
    );
    let message = validation_message(FeeSchedule::from_value(document));
    assert!(message.contains("duplicate"), "{message}");

    validation_message(FeeSchedule::load("{ not json"));
    validation_message(FeeSchedule::load(r#"{"metadata": {}}"#));
    validation_message(FeeSchedule::load(
        r#"{"fee_definitions": [
            {"id": "x", "label": "X", "calc_type": "fixed", "amount": 1,
             "applies_when": "sometimes"}
        ]}"#,
    ));
}

#[test]
fn test_rates_for_unknown_fees_are_ignored() {
    let document = minimal_schedule(
        json!([{ "id": "escrow", "label": "Escrow", "calc_type": "fixed", "amount": 750 }]),
        json!({ "Jalisco": { "legacy_fee": { "amount": 10 } } }),
    );
    let schedule = FeeSchedule::from_value(document).unwrap();
    assert_eq!(schedule.state("jalisco").unwrap().fee_ids().count(), 0);

    // ignored entries are still checked for negative values
    let document = minimal_schedule(
        json!([{ "id": "escrow", "label": "Escrow", "calc_type": "fixed", "amount": 750 }]),
        json!({ "Jalisco": { "legacy_fee": { "amount": -10 }, "escrow": { "amount": -5 } } }),
    );
    let message = validation_message(FeeSchedule::from_value(document));
    assert!(message.contains("Jalisco"), "{message}");
}

#[test]
fn test_schedule_numbers_keep_full_precision() {
    let schedule = FeeSchedule::load(
        r#"{
            "fee_definitions": [
                {"id": "escrow", "label": "Escrow", "calc_type": "fixed",
                 "amount": 12345678901234567.89, "applies_when": "restricted_zone"},
                {"id": "stamp_duty", "label": "Stamp Duty", "calc_type": "percent",
                 "percent": 0.1234567890123456789, "applies_when": "foreign_buyer"}
            ]
        }"#,
    )
    .unwrap();

    let escrow = schedule.rate_for("escrow", "Jalisco").unwrap();
    assert!(matches!(escrow, Rate::Fixed(f) if f.amount == dec!(12345678901234567.89)));
    let stamp_duty = schedule.rate_for("stamp_duty", "Jalisco").unwrap();
    assert!(matches!(stamp_duty, Rate::Percent(p) if p.percent == dec!(0.1234567890123456789)));

    let scenario = PurchaseScenario::new(dec!(100), "Jalisco").with_restricted_zone(true);
    let result = calculate(&scenario, &schedule).unwrap();
    assert_eq!(result.line_item("escrow").unwrap().min, dec!(12345678901234567.89));
    let rendered = serde_json::to_string(&result).unwrap();
    assert!(rendered.contains("12345678901234567.89"), "{rendered}");

    let scenario = PurchaseScenario::new(dec!(100), "Jalisco").with_foreign_buyer(true);
    let result = calculate(&scenario, &schedule).unwrap();
    assert_eq!(result.line_item("stamp_duty").unwrap().min, dec!(0.1234567890123456789));
    let rendered = serde_json::to_string(&result).unwrap();
    assert!(rendered.contains("0.1234567890123456789"), "{rendered}");
}

#[test]
fn test_loading_twice_yields_equal_models() {
    let first = FeeSchedule::load(SAMPLE_SCHEDULE).unwrap();
    let second = FeeSchedule::load(SAMPLE_SCHEDULE).unwrap();
    assert_eq!(first, second);
}
