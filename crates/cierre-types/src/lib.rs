//! Cierre Types
//!
//! This crate defines the value types shared across the Cierre workspace
//! (`cierre-calculator`, `cierre-core` and `cierre-cli`): the purchase scenario a
//! caller hands to the engine, and the line items and totals the engine hands back.

#![deny(warnings)]
#![warn(missing_docs)]

mod types;
pub use types::{
    AddOn, AmountRange, CalculationResult, InvalidAddOn, LineItem, PropertyType,
    PurchaseScenario,
};

/// Monetary amounts and percentages are exact decimals throughout the workspace.
pub use rust_decimal::Decimal;
