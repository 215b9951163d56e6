//! Request validation: field-level constraints checked before dispatch.

use std::fmt;

/// A constraint a request field can violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Field must contain non-whitespace text.
    Required,
    /// Field must contain at least this many characters (after trimming).
    MinLength(usize),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => f.write_str("must not be empty"),
            Constraint::MinLength(n) => write!(f, "must be at least {n} characters"),
        }
    }
}

/// One violated constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Wire name of the field (camelCase).
    pub field: &'static str,
    pub constraint: Constraint,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

/// A request failed its schema constraints; generation was not attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {request}: {}", join_violations(.violations))]
pub struct ValidationError {
    /// Use-case name of the rejected request.
    pub request: &'static str,
    /// Violations in field declaration order.
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Whether `field` is among the violations.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Requests that can be checked before they are sent to the model.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Collects violations for one request.
pub(crate) struct Rules {
    request: &'static str,
    violations: Vec<FieldViolation>,
}

impl Rules {
    pub(crate) fn new(request: &'static str) -> Self {
        Self {
            request,
            violations: Vec::new(),
        }
    }

    pub(crate) fn required(mut self, field: &'static str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.violations.push(FieldViolation {
                field,
                constraint: Constraint::Required,
            });
        }
        self
    }

    /// Empty values report `Required` rather than a length violation.
    pub(crate) fn min_length(mut self, field: &'static str, value: &str, min: usize) -> Self {
        let len = value.trim().chars().count();
        let constraint = if len == 0 {
            Constraint::Required
        } else if len < min {
            Constraint::MinLength(min)
        } else {
            return self;
        };
        self.violations.push(FieldViolation { field, constraint });
        self
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            return Ok(());
        }
        Err(ValidationError {
            request: self.request,
            violations: self.violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_violations_in_order() {
        let err = Rules::new("copy")
            .required("productName", "  ")
            .min_length("productDescription", "short", 10)
            .required("targetAudience", "parents")
            .finish()
            .unwrap_err();

        assert_eq!(
            err.violations,
            vec![
                FieldViolation {
                    field: "productName",
                    constraint: Constraint::Required
                },
                FieldViolation {
                    field: "productDescription",
                    constraint: Constraint::MinLength(10)
                },
            ]
        );
        assert_eq!(
            err.to_string(),
            "invalid copy: productName must not be empty; productDescription must be at least 10 characters"
        );
    }

    #[test]
    fn min_length_counts_characters_not_bytes() {
        assert!(Rules::new("t").min_length("f", "ééééé", 5).finish().is_ok());
        let err = Rules::new("t").min_length("f", "", 5).finish().unwrap_err();
        assert_eq!(err.violations[0].constraint, Constraint::Required);
    }
}
