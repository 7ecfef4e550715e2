//! Validation results for chart and table configuration

use serde::{Deserialize, Serialize};

/// Outcome of validating a configuration.
///
/// Errors block rendering; warnings are informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationResult {
    /// A result with no errors and no warnings
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record an error
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    /// Record a warning
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.add_error(message);
        self
    }

    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.add_warning(message);
        self
    }

    /// Fold another result into this one
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.is_valid = self.errors.is_empty();
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
