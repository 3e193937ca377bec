//! The closed set of priced calculation kinds and their validation from raw
//! schedule fields.

use crate::{
    CalcKind, Calculator, CalculatorError, CalculatorInputs, FixedAmount, FixedRange, Percent,
    PercentRange, RangeResult,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Numeric fields as they appear on a schedule row or a state rate entry.
///
/// Which of these must be present is decided by the row's `calc_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pct: Option<Decimal>,
}

impl RateFields {
    fn populated(&self) -> impl Iterator<Item = (&'static str, Decimal)> + '_ {
        [
            ("amount", self.amount),
            ("min", self.min),
            ("max", self.max),
            ("percent", self.percent),
            ("min_pct", self.min_pct),
            ("max_pct", self.max_pct),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.populated().next().is_none()
    }

    /// Rejects any populated field below zero, whatever the row's `calc_type`.
    pub fn check_non_negative(&self) -> Result<(), CalculatorError> {
        match self.populated().find(|(_, value)| *value < Decimal::ZERO) {
            Some((name, value)) => Err(CalculatorError::invalid_value(
                name,
                format!("'{name}' must not be negative (got {value})"),
            )),
            None => Ok(()),
        }
    }

    fn require(value: Option<Decimal>, field: &str) -> Result<Decimal, CalculatorError> {
        value.ok_or_else(|| CalculatorError::missing_field(field))
    }
}

/// A validated, priced calculation: one case per numeric `calc_type`.
///
/// `user_entered` has no case here because its value comes from the scenario,
/// never from the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "calc_type", rename_all = "snake_case")]
pub enum Rate {
    Fixed(FixedAmount),
    FixedRange(FixedRange),
    Percent(Percent),
    PercentRange(PercentRange),
}

impl Rate {
    /// Builds a rate of the given kind, requiring exactly the fields that kind uses.
    pub fn from_fields(kind: CalcKind, fields: &RateFields) -> Result<Rate, CalculatorError> {
        let required = kind.required_fields();
        if let Some((name, _)) = fields.populated().find(|(name, _)| !required.contains(name)) {
            return Err(CalculatorError::unexpected_field(name, kind.as_str()));
        }
        fields.check_non_negative()?;

        match kind {
            CalcKind::Fixed => Ok(Rate::Fixed(FixedAmount::new(RateFields::require(
                fields.amount,
                "amount",
            )?)?)),
            CalcKind::FixedRange => Ok(Rate::FixedRange(FixedRange::new(
                RateFields::require(fields.min, "min")?,
                RateFields::require(fields.max, "max")?,
            )?)),
            CalcKind::Percent => Ok(Rate::Percent(Percent::new(RateFields::require(
                fields.percent,
                "percent",
            )?)?)),
            CalcKind::PercentRange => Ok(Rate::PercentRange(PercentRange::new(
                RateFields::require(fields.min_pct, "min_pct")?,
                RateFields::require(fields.max_pct, "max_pct")?,
            )?)),
            CalcKind::UserEntered => Err(CalculatorError::invalid_value(
                "calc_type",
                "user_entered fees take their value from the scenario, not the schedule",
            )),
        }
    }

    fn calculator(&self) -> &dyn Calculator {
        match self {
            Rate::Fixed(c) => c,
            Rate::FixedRange(c) => c,
            Rate::Percent(c) => c,
            Rate::PercentRange(c) => c,
        }
    }
}

impl Calculator for Rate {
    fn kind(&self) -> CalcKind {
        self.calculator().kind()
    }

    fn calculate(&self, inputs: &CalculatorInputs) -> RangeResult {
        self.calculator().calculate(inputs)
    }
}
