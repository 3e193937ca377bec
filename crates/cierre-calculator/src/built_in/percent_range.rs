//! Percent Range Calculator
//!
//! min = min_pct / 100 * basis
//! max = max_pct / 100 * basis

use crate::{AmountRange, CalcKind, Calculator, CalculatorError, CalculatorInputs, RangeResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentRange {
    pub min_pct: Decimal,
    pub max_pct: Decimal,
}

impl PercentRange {
    pub fn new(min_pct: Decimal, max_pct: Decimal) -> Result<Self, CalculatorError> {
        if min_pct < Decimal::ZERO {
            return Err(CalculatorError::invalid_value("min_pct", "min_pct must not be negative"));
        }
        if min_pct > max_pct {
            return Err(CalculatorError::invalid_value(
                "max_pct",
                format!("max_pct ({max_pct}) must not be less than min_pct ({min_pct})"),
            ));
        }
        Ok(Self { min_pct, max_pct })
    }
}

impl Calculator for PercentRange {
    fn kind(&self) -> CalcKind {
        CalcKind::PercentRange
    }

    fn calculate(&self, inputs: &CalculatorInputs) -> RangeResult {
        let min = inputs.percent_of(self.min_pct)?;
        let max = inputs.percent_of(self.max_pct)?;
        AmountRange::new(min, max).ok_or_else(|| {
            CalculatorError::invalid_value("max_pct", "max_pct must not be less than min_pct")
        })
    }
}
