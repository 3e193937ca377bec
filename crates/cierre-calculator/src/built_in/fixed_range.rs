//! Fixed Range Calculator
//!
//! A flat fee quoted as a range, taken directly from the schedule.

use crate::{AmountRange, CalcKind, Calculator, CalculatorError, CalculatorInputs, RangeResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl FixedRange {
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, CalculatorError> {
        if min < Decimal::ZERO {
            return Err(CalculatorError::invalid_value("min", "min must not be negative"));
        }
        if min > max {
            return Err(CalculatorError::invalid_value(
                "max",
                format!("max ({max}) must not be less than min ({min})"),
            ));
        }
        Ok(Self { min, max })
    }
}

impl Calculator for FixedRange {
    fn kind(&self) -> CalcKind {
        CalcKind::FixedRange
    }

    fn calculate(&self, _inputs: &CalculatorInputs) -> RangeResult {
        AmountRange::new(self.min, self.max)
            .ok_or_else(|| CalculatorError::invalid_value("max", "max must not be less than min"))
    }
}
