//! Wire shape of the fee schedule document, before validation.

use super::{Applicability, Basis, CalculationInstructions, ScheduleMetadata};
use cierre_calculator::RateFields;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Top-level document. Keys other than these are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct RawScheduleDocument {
    #[serde(default)]
    pub metadata: ScheduleMetadata,
    pub fee_definitions: Vec<RawFeeDefinition>,
    #[serde(default)]
    pub state_rates: BTreeMap<String, BTreeMap<String, RateFields>>,
    #[serde(default)]
    pub calculation_instructions: CalculationInstructions,
    #[serde(default)]
    pub glossary: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFeeDefinition {
    pub id: String,
    pub label: String,
    pub calc_type: String,
    #[serde(default)]
    pub applies_when: Applicability,
    #[serde(default)]
    pub basis: Basis,
    #[serde(default)]
    pub state_dependent: bool,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub min: Option<Decimal>,
    #[serde(default)]
    pub max: Option<Decimal>,
    #[serde(default)]
    pub percent: Option<Decimal>,
    #[serde(default)]
    pub min_pct: Option<Decimal>,
    #[serde(default)]
    pub max_pct: Option<Decimal>,
}

impl RawFeeDefinition {
    pub fn fields(&self) -> RateFields {
        RateFields {
            amount: self.amount,
            min: self.min,
            max: self.max,
            percent: self.percent,
            min_pct: self.min_pct,
            max_pct: self.max_pct,
        }
    }
}
