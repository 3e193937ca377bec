//! Percent Calculator
//!
//! `min == max == percent / 100 * basis`. Percent values are true percentages,
//! so `2.0` means 2%.

use crate::{AmountRange, CalcKind, Calculator, CalculatorError, CalculatorInputs, RangeResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percent {
    pub percent: Decimal,
}

impl Percent {
    pub fn new(percent: Decimal) -> Result<Self, CalculatorError> {
        if percent < Decimal::ZERO {
            return Err(CalculatorError::invalid_value("percent", "percent must not be negative"));
        }
        Ok(Self { percent })
    }
}

impl Calculator for Percent {
    fn kind(&self) -> CalcKind {
        CalcKind::Percent
    }

    fn calculate(&self, inputs: &CalculatorInputs) -> RangeResult {
        Ok(AmountRange::exact(inputs.percent_of(self.percent)?))
    }
}
