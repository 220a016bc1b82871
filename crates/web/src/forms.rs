//! Form validation helpers.
//!
//! Handlers run their checks through a [`Validator`] and, on failure, hand
//! the resulting [`FormErrors`] to the template that re-renders the form.

use std::collections::BTreeMap;

/// Validation failures for one form submission.
#[derive(Debug, Default, Clone)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, String>,
    non_field: Vec<String>,
}

impl FormErrors {
    /// Record an error for `field`. The first error per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Record an error that belongs to the form as a whole.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// The error for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Errors not tied to a field.
    #[must_use]
    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }
}

/// Accumulates checks into [`FormErrors`].
#[derive(Debug, Default)]
pub struct Validator {
    errors: FormErrors,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless `ok`.
    pub fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.errors.add(field, message);
        }
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if any check failed.
    pub fn finish(self) -> Result<(), FormErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// True if `value` has a non-whitespace character.
#[must_use]
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True if `value` has at most `max` characters.
#[must_use]
pub fn max_chars(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// True if `value` has at least `min` characters.
#[must_use]
pub fn min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// True if `value` is one of `permitted`.
#[must_use]
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}
