//! Fixed Amount Calculator
//!
//! A flat fee that ignores the basis: `min == max == amount`.

use crate::{AmountRange, CalcKind, Calculator, CalculatorError, CalculatorInputs, RangeResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAmount {
    pub amount: Decimal,
}

impl FixedAmount {
    pub fn new(amount: Decimal) -> Result<Self, CalculatorError> {
        if amount < Decimal::ZERO {
            return Err(CalculatorError::invalid_value("amount", "amount must not be negative"));
        }
        Ok(Self { amount })
    }
}

impl Calculator for FixedAmount {
    fn kind(&self) -> CalcKind {
        CalcKind::Fixed
    }

    fn calculate(&self, _inputs: &CalculatorInputs) -> RangeResult {
        Ok(AmountRange::exact(self.amount))
    }
}
