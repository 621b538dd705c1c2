use validator::{Validate, ValidationErrors};

use crate::application::errors::{AppError, AppResult};

/// Flattens validator output into `field: message` lines sorted by field name.
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let mut out = Vec::new();
    for (field, errs) in fields {
        for err in errs.iter() {
            match &err.message {
                Some(msg) => out.push(format!("{field}: {msg}")),
                None => out.push(format!("{field}: invalid value ({})", err.code)),
            }
        }
    }
    out
}

/// Collects rule violations on top of the derive-based checks.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn of<T: Validate>(input: &T) -> Self {
        match input.validate() {
            Ok(()) => Self::default(),
            Err(errors) => Self(messages(&errors)),
        }
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.0.push(format!("{field}: {message}"));
        }
        self
    }

    pub fn push(&mut self, field: &str, message: impl std::fmt::Display) -> &mut Self {
        self.0.push(format!("{field}: {message}"));
        self
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}
