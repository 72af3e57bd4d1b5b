//! Cross-field rule keeping the recruitment deadline on or before the trip.

use super::{ErrorKind, FieldError, FieldName, ValidationErrorSet};
use chrono::NaiveDate;
use log::*;

pub const DATE_ORDER_MESSAGE: &str = "모집 마감 날짜는 여행 날짜 이전이어야 합니다.";

/// Outcome of one evaluation of the date-order rule.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DateOrderTransition {
    BecameInvalid,
    BecameValid,
    Unchanged,
}

/// Maintains `recruitmentEndDate <= departureDate` in an error set.
///
/// An unset date always satisfies the rule. The error entry is only written
/// when the state actually flips, so re-evaluating an unchanged pair is a
/// no-op.
///
#[derive(Clone, Debug)]
pub struct DateOrderValidator {
    message: String,
}

impl Default for DateOrderValidator {
    fn default() -> Self {
        DateOrderValidator::new(DATE_ORDER_MESSAGE)
    }
}

impl DateOrderValidator {
    pub fn new<S: Into<String>>(message: S) -> Self {
        DateOrderValidator {
            message: message.into(),
        }
    }

    /// True when both dates are set and the deadline falls after the trip.
    ///
    pub fn violates(departure: Option<NaiveDate>, recruitment_end: Option<NaiveDate>) -> bool {
        match (departure, recruitment_end) {
            (Some(departure), Some(end)) => end > departure,
            _ => false,
        }
    }

    /// Re-evaluate the rule and update `errors` if the state flipped.
    ///
    pub fn evaluate(
        &self,
        departure: Option<NaiveDate>,
        recruitment_end: Option<NaiveDate>,
        errors: &mut ValidationErrorSet,
    ) -> DateOrderTransition {
        let recorded = errors.contains(FieldName::RecruitmentEndDate);
        let violated = Self::violates(departure, recruitment_end);

        if violated && !recorded {
            debug!(
                "Recruitment end {:?} falls after departure {:?}.",
                recruitment_end, departure
            );
            errors.record(
                FieldName::RecruitmentEndDate,
                FieldError::new(ErrorKind::DateOrder, self.message.as_str()),
            );
            DateOrderTransition::BecameInvalid
        } else if !violated && recorded {
            debug!("Recruitment end date order restored.");
            errors.clear(FieldName::RecruitmentEndDate);
            DateOrderTransition::BecameValid
        } else {
            DateOrderTransition::Unchanged
        }
    }
}
