#![deny(warnings)]
//! The calculator ecosystem for the Cierre fee engine.
//!
//! This crate provides the `Calculator` trait, the `CalculatorInputs` handed to
//! each calculator, and the closed set of built-in calculators a fee schedule can
//! reference through its `calc_type`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use cierre_types::AmountRange;

pub mod built_in;
pub mod rate;
pub mod types;

pub use rate::{Rate, RateFields};
pub use types::{CalculatorError, ErrorCode};

/// Outcome of a single calculator invocation.
pub type RangeResult = Result<AmountRange, CalculatorError>;

/// A trait for all calculators.
/// Calculators are stateless and thread-safe.
pub trait Calculator: Send + Sync {
    /// The calculation kind this calculator implements.
    fn kind(&self) -> CalcKind;

    /// Calculates a cost range from the provided inputs.
    fn calculate(&self, inputs: &CalculatorInputs) -> RangeResult;
}

/// Provides calculators with the monetary basis they compute against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorInputs {
    basis: Decimal,
}

impl CalculatorInputs {
    /// Creates a new `CalculatorInputs`.
    pub fn new(basis: Decimal) -> Self {
        Self { basis }
    }

    /// Gets the basis, rejecting negative values.
    pub fn basis(&self) -> Result<Decimal, CalculatorError> {
        if self.basis < Decimal::ZERO {
            return Err(CalculatorError::invalid_value("basis", "basis must not be negative"));
        }
        Ok(self.basis)
    }

    /// `percent / 100 * basis`, where `percent` is a true percentage (2.0 means 2%).
    pub fn percent_of(&self, percent: Decimal) -> Result<Decimal, CalculatorError> {
        self.basis()?
            .checked_mul(percent)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| CalculatorError::overflow(format!("{percent}% of {}", self.basis)))
    }
}

/// The recognized `calc_type` values of a fee definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcKind {
    Fixed,
    FixedRange,
    Percent,
    PercentRange,
    UserEntered,
}

impl CalcKind {
    pub const ALL: [CalcKind; 5] = [
        CalcKind::Fixed,
        CalcKind::FixedRange,
        CalcKind::Percent,
        CalcKind::PercentRange,
        CalcKind::UserEntered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalcKind::Fixed => "fixed",
            CalcKind::FixedRange => "fixed_range",
            CalcKind::Percent => "percent",
            CalcKind::PercentRange => "percent_range",
            CalcKind::UserEntered => "user_entered",
        }
    }

    /// Percentage kinds are the only ones that read the basis.
    pub fn uses_basis(&self) -> bool {
        matches!(self, CalcKind::Percent | CalcKind::PercentRange)
    }

    /// The numeric fields a schedule row of this kind must populate, and no others.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CalcKind::Fixed => &["amount"],
            CalcKind::FixedRange => &["min", "max"],
            CalcKind::Percent => &["percent"],
            CalcKind::PercentRange => &["min_pct", "max_pct"],
            CalcKind::UserEntered => &[],
        }
    }
}

impl fmt::Display for CalcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CalcKind {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalcKind::ALL.into_iter().find(|kind| kind.as_str() == s).ok_or_else(|| {
            CalculatorError::invalid_value("calc_type", format!("unrecognized calc_type '{s}'"))
        })
    }
}

// Re-export calculator implementations
pub use built_in::{
    fixed::FixedAmount, fixed_range::FixedRange, percent::Percent, percent_range::PercentRange,
};
