//! Error handling for the Cierre core
//!
//! Schedule validation, lookups and arithmetic failures are all fatal for the
//! request that hit them; nothing here is retried.

use cierre_calculator::CalculatorError;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Error type for schedule loading and fee calculation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CierreError {
    /// Malformed or incomplete fee schedule
    #[error("Validation error: {message}")]
    Validation { message: String, fee_id: Option<String>, field: Option<String> },

    /// State or fee id not present in the loaded schedule
    #[error("Lookup error: {message}")]
    Lookup { message: String, fee_id: Option<String>, state: Option<String> },

    /// Effective percentages requested against a non-positive price
    #[error("Division error: {message}")]
    Division { message: String, purchase_price: Decimal },

    /// A calculator rejected its inputs or overflowed
    #[error("Calculation error for fee '{fee_id}': {source}")]
    Calculation {
        fee_id: String,
        #[source]
        source: CalculatorError,
    },
}

impl CierreError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            CierreError::Validation { .. } => "validation",
            CierreError::Lookup { .. } => "lookup",
            CierreError::Division { .. } => "division",
            CierreError::Calculation { .. } => "calculation",
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CierreError::Validation { .. } => ErrorSeverity::Critical,
            CierreError::Lookup { .. } => ErrorSeverity::Medium,
            CierreError::Division { .. } => ErrorSeverity::Low,
            CierreError::Calculation { .. } => ErrorSeverity::High,
        }
    }

    /// Check if a corrected request can succeed against the same schedule
    pub fn is_recoverable(&self) -> bool {
        match self {
            CierreError::Validation { .. } => false, // schedule must be fixed and reloaded
            CierreError::Lookup { .. } => true,
            CierreError::Division { .. } => true,
            CierreError::Calculation { .. } => true,
        }
    }
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Result type alias for core operations
pub type CierreResult<T> = Result<T, CierreError>;

/// Convenience constructors for common error scenarios
impl CierreError {
    /// Create a schedule-level validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), fee_id: None, field: None }
    }

    /// Create a validation error scoped to one fee definition
    pub fn invalid_fee(fee_id: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fee_id: Some(fee_id.to_string()),
            field: None,
        }
    }

    /// Wrap a calculator field error raised while validating a fee definition
    pub fn invalid_fee_field(fee_id: &str, context: &str, source: &CalculatorError) -> Self {
        Self::Validation {
            message: format!("fee '{fee_id}' {context}: {}", source.message),
            fee_id: Some(fee_id.to_string()),
            field: source.field.clone(),
        }
    }

    /// Create an unknown-state lookup error
    pub fn unknown_state(state: &str) -> Self {
        Self::Lookup {
            message: format!("state '{state}' has no rate entries in the fee schedule"),
            fee_id: None,
            state: Some(state.to_string()),
        }
    }

    /// Create an unknown-fee lookup error
    pub fn unknown_fee(fee_id: &str) -> Self {
        Self::Lookup {
            message: format!("fee '{fee_id}' is not defined in the fee schedule"),
            fee_id: Some(fee_id.to_string()),
            state: None,
        }
    }

    /// Create a lookup error for a fee that has no rate for a state
    pub fn missing_rate(fee_id: &str, state: &str) -> Self {
        Self::Lookup {
            message: format!("fee '{fee_id}' has no rate for state '{state}'"),
            fee_id: Some(fee_id.to_string()),
            state: Some(state.to_string()),
        }
    }

    /// Create a non-positive price error
    pub fn non_positive_price(purchase_price: Decimal) -> Self {
        Self::Division {
            message: format!("purchase price must be positive (got {purchase_price})"),
            purchase_price,
        }
    }

    /// Create a calculation error for a fee
    pub fn calculation(fee_id: &str, source: CalculatorError) -> Self {
        Self::Calculation { fee_id: fee_id.to_string(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_and_recoverability() {
        let err = CierreError::validation("bad schedule");
        assert_eq!(err.category(), "validation");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_recoverable());

        let err = CierreError::unknown_state("Atlantis");
        assert_eq!(err.category(), "lookup");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn division_error_carries_price() {
        let err = CierreError::non_positive_price(Decimal::ZERO);
        assert!(matches!(
            err,
            CierreError::Division { purchase_price, .. } if purchase_price.is_zero()
        ));
        assert_eq!(ErrorSeverity::Low.to_string(), "LOW");
    }
}
