use serde::{Deserialize, Serialize};
use std::fmt;

// Built-in Calculator Error Handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorError {
    pub code: ErrorCode,
    pub message: String,
    pub field: Option<String>,
}

impl std::error::Error for CalculatorError {}

impl fmt::Display for CalculatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "Calculator error on '{}': {}", field, self.message),
            None => write!(f, "Calculator error: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    MissingRequiredField,
    UnexpectedField,
    InvalidFieldValue,
    CalculationOverflow,
}

impl CalculatorError {
    pub fn missing_field(field: &str) -> Self {
        Self {
            code: ErrorCode::MissingRequiredField,
            message: format!("required field '{field}' is missing"),
            field: Some(field.to_string()),
        }
    }

    pub fn unexpected_field(field: &str, calc_type: &str) -> Self {
        Self {
            code: ErrorCode::UnexpectedField,
            message: format!("field '{field}' is not valid for calc_type '{calc_type}'"),
            field: Some(field.to_string()),
        }
    }

    pub fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidFieldValue,
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::CalculationOverflow,
            message: format!("arithmetic overflow computing {}", operation.into()),
            field: None,
        }
    }
}
