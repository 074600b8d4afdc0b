//! Field-level validation failures.
//!
//! Handlers validate their input however they like and report the problems
//! as a [`ValidationErrors`] collection. The pipeline turns it into a
//! `400 INVALID_DATA` response whose `details` object is the collection
//! itself, so clients see exactly the fields and messages the handler wrote.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A set of validation failures keyed by field name.
///
/// Keys are kept sorted so the rendered `details` object and the
/// [`Display`](fmt::Display) output are stable.
///
/// ```rust
/// use gatehouse::ValidationErrors;
///
/// let errors = ValidationErrors::new()
///     .with("name", "cannot be blank")
///     .with("age", "must be no less than 18");
///
/// assert_eq!(errors.to_string(), "age: must be no less than 18; name: cannot be blank.");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a failure for `field`. Returns `self` for chaining.
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(field, message);
        self
    }

    /// Records a failure for `field`, replacing any earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing failed, otherwise the collection as an error.
    ///
    /// Lets a handler finish validating every field and bail with `?`:
    ///
    /// ```rust,ignore
    /// let mut errors = ValidationErrors::new();
    /// if input.name.is_empty() { errors.insert("name", "cannot be blank"); }
    /// errors.into_result()?;
    /// ```
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        if !self.0.is_empty() {
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
