#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for the Cierre closing-cost estimator.
//!
//! This crate turns a purchase scenario and a validated fee schedule into
//! per-fee cost ranges, a total range and effective percentages of the
//! purchase price. It performs no I/O: schedule fetching and report rendering
//! belong to the caller.

use tracing::{debug, instrument};

/// Closing-cost calculation engine
pub mod engine;
/// Structured error types
pub mod error;
/// Fee schedule model, predicates and validation
pub mod schedule;

// Re-export critical types for the CLI layer
pub use engine::{ASSESSED_VALUE_FALLBACK_NOTE, CalculationEngine, calculate};
pub use error::{CierreError, CierreResult, ErrorSeverity};
pub use schedule::{
    Applicability, Basis, CalculationInstructions, FeeDefinition, FeeSchedule, Pricing,
    ScheduleMetadata, StateRates,
};

pub use cierre_calculator::{CalcKind, Rate};
pub use cierre_types::{
    AddOn, AmountRange, CalculationResult, Decimal, LineItem, PropertyType, PurchaseScenario,
};

/// Load a schedule and compute one scenario against it
#[instrument(skip_all)]
pub fn estimate(
    raw_schedule: &str,
    scenario: &PurchaseScenario,
) -> CierreResult<CalculationResult> {
    debug!("Estimating closing costs from raw schedule");
    let schedule = FeeSchedule::load(raw_schedule)?;
    calculate(scenario, &schedule)
}
