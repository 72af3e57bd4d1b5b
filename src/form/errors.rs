//! Validation error set.

use super::FieldName;
use log::*;
use std::collections::BTreeMap;

/// Specifying which rule produced a field error.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    Required,
    Min,
    Max,
    Pattern,
    DateOrder,
}

/// Defines an inline, user-correctable field error.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        FieldError {
            kind,
            message: message.into(),
        }
    }
}

/// At most one error per field.
///
/// Field-level rules write through `apply_rule_result`, which never touches
/// `recruitmentEndDate`; that entry belongs to the date-order rule alone.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrorSet {
    errors: BTreeMap<FieldName, FieldError>,
}

impl ValidationErrorSet {
    pub fn get(&self, field: FieldName) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldError)> {
        self.errors.iter()
    }

    /// Record or clear the outcome of a field-level rule evaluation.
    ///
    pub fn apply_rule_result(&mut self, field: FieldName, result: Option<FieldError>) {
        if field == FieldName::RecruitmentEndDate {
            trace!("Ignoring field-level result for {}.", field);
            return;
        }
        match result {
            Some(error) => {
                self.errors.insert(field, error);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub(crate) fn record(&mut self, field: FieldName, error: FieldError) {
        self.errors.insert(field, error);
    }

    pub(crate) fn clear(&mut self, field: FieldName) -> bool {
        self.errors.remove(&field).is_some()
    }
}
