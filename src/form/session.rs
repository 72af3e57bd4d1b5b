//! Live registration form session.

use super::{
    DateOrderTransition, DateOrderValidator, DraftStore, FieldError, FieldName, RegistrationDraft,
    RuleSet, Thumbnail, ThumbnailLookup, ThumbnailPreview, ValidationErrorSet,
};
use crate::submit::{
    DateFormatter, EditTarget, GroupSubmitter, Place, PlaceCollaborator, SubmissionPipeline,
    SubmitError, SubmitReceipt,
};
use chrono::NaiveDate;
use log::*;
use std::error::Error;

pub const MISSING_ITINERARY_MESSAGE: &str = "여행 일정을 등록해주세요.";

/// Notice recorded when the submission collaborator fails.
const SUBMISSION_FAILED_MESSAGE: &str = "모집글 등록에 실패했습니다. 잠시 후 다시 시도해주세요.";

/// Specifying why the submit action is currently disabled.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SubmitBlocker {
    InFlight,
    InvalidFields,
    NoPlaces,
}

/// Result of a submit attempt.
///
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    Refused(SubmitBlocker),
    Submitted(SubmitReceipt),
    Failed,
}

/// Owns the live field values and validation errors of the registration
/// form and reconciles them with the `DraftStore`.
///
/// Every field change is written through to the draft. When the session is
/// torn down, by `unmount` or by being dropped on any exit path, the complete
/// live values and the resolved preview are snapshotted into the draft once
/// more.
///
pub struct FormSessionController {
    values: RegistrationDraft,
    preview: Option<ThumbnailPreview>,
    errors: ValidationErrorSet,
    rules: RuleSet,
    date_order: DateOrderValidator,
    draft: DraftStore,
    submission_notice: Option<String>,
}

impl FormSessionController {
    /// Seed a session from the draft and resolve the thumbnail preview:
    /// the persisted lookup wins, then the draft's stored preview, then none.
    ///
    pub fn mount<L: ThumbnailLookup>(draft: DraftStore, rules: RuleSet, lookup: &L) -> Self {
        let values = draft.form();
        let preview = match lookup.stored_thumbnail() {
            Some(stored) => {
                debug!("Using persisted thumbnail preview {}.", stored.as_str());
                Some(stored)
            }
            None => draft.thumbnail_preview(),
        };

        let mut session = FormSessionController {
            values,
            preview,
            errors: ValidationErrorSet::default(),
            rules,
            date_order: DateOrderValidator::default(),
            draft,
            submission_notice: None,
        };
        session.check_date_order();
        debug!(
            "Mounted registration form (draft empty: {}).",
            session.values.is_empty()
        );
        session
    }

    pub fn values(&self) -> &RegistrationDraft {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    pub fn error(&self, field: FieldName) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn preview(&self) -> Option<&ThumbnailPreview> {
        self.preview.as_ref()
    }

    /// Returns the user-visible notice left by the last failed submission.
    ///
    pub fn submission_notice(&self) -> Option<&str> {
        self.submission_notice.as_deref()
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) {
        let title = title.into();
        self.change(FieldName::GroupTitle, |values| values.group_title = Some(title));
    }

    pub fn set_description<S: Into<String>>(&mut self, description: S) {
        let description = description.into();
        self.change(FieldName::GroupDescription, |values| {
            values.group_description = Some(description)
        });
    }

    pub fn set_member_count<S: Into<String>>(&mut self, count: S) {
        let count = count.into();
        self.change(FieldName::GroupMemberCount, |values| {
            values.group_member_count = Some(count)
        });
    }

    pub fn set_departure_date(&mut self, date: Option<NaiveDate>) {
        self.change(FieldName::DepartureDate, |values| values.departure_date = date);
    }

    pub fn set_recruitment_end_date(&mut self, date: Option<NaiveDate>) {
        self.change(FieldName::RecruitmentEndDate, |values| {
            values.recruitment_end_date = date
        });
    }

    /// Select a thumbnail; the preview follows the new value.
    ///
    pub fn select_thumbnail(&mut self, thumbnail: Thumbnail) {
        self.preview = thumbnail.preview();
        self.change(FieldName::GroupThumbnail, |values| {
            values.group_thumbnail = thumbnail
        });
    }

    /// Reset the thumbnail and its preview, leaving every other field as is.
    ///
    pub fn remove_thumbnail(&mut self) {
        self.preview = None;
        self.change(FieldName::GroupThumbnail, |values| {
            values.group_thumbnail = Thumbnail::Empty
        });
    }

    /// Re-run every field rule and the date-order rule. Returns `is_valid`.
    ///
    pub fn validate_all(&mut self) -> bool {
        for field in FieldName::ALL.iter() {
            let result = self.rules.validate(*field, &self.values);
            self.errors.apply_rule_result(*field, result);
        }
        self.check_date_order();
        self.is_valid()
    }

    /// True when every field rule passes and the dates are in order.
    ///
    pub fn is_valid(&self) -> bool {
        self.rules.all_pass(&self.values)
            && !DateOrderValidator::violates(
                self.values.departure_date,
                self.values.recruitment_end_date,
            )
    }

    /// Returns the reason the submit action is disabled, if any.
    ///
    pub fn submit_blocker(&self, places: &[Place], in_flight: bool) -> Option<SubmitBlocker> {
        if in_flight {
            Some(SubmitBlocker::InFlight)
        } else if !self.is_valid() {
            Some(SubmitBlocker::InvalidFields)
        } else if places.is_empty() {
            Some(SubmitBlocker::NoPlaces)
        } else {
            None
        }
    }

    pub fn can_submit(&self, places: &[Place], in_flight: bool) -> bool {
        self.submit_blocker(places, in_flight).is_none()
    }

    pub fn missing_itinerary_notice(&self, places: &[Place]) -> Option<&'static str> {
        if places.is_empty() {
            Some(MISSING_ITINERARY_MESSAGE)
        } else {
            None
        }
    }

    /// Validate and, if the guard allows it, hand the form to the pipeline.
    ///
    /// Collaborator failures are logged and recorded as the session's
    /// submission notice; they never touch the field errors.
    ///
    pub async fn submit<S, P, D>(
        &mut self,
        pipeline: &SubmissionPipeline<S, P, D>,
        places: &[Place],
        target: &EditTarget,
    ) -> SubmitOutcome
    where
        S: GroupSubmitter,
        P: PlaceCollaborator,
        D: DateFormatter,
    {
        self.validate_all();
        if let Some(blocker) = self.submit_blocker(places, pipeline.is_in_flight()) {
            info!("Submission refused: {:?}.", blocker);
            return SubmitOutcome::Refused(blocker);
        }

        self.submission_notice = None;
        match pipeline.submit(&self.values, places, target).await {
            Ok(receipt) => SubmitOutcome::Submitted(receipt),
            Err(SubmitError::InFlight) => SubmitOutcome::Refused(SubmitBlocker::InFlight),
            Err(e) => {
                error!("Submission failed: {}", error_chain(&e));
                self.submission_notice = Some(SUBMISSION_FAILED_MESSAGE.to_string());
                SubmitOutcome::Failed
            }
        }
    }

    /// Tear the session down, snapshotting it into the draft.
    ///
    pub fn unmount(self) {}

    fn change<F: FnOnce(&mut RegistrationDraft)>(&mut self, field: FieldName, apply: F) {
        apply(&mut self.values);
        let result = self.rules.validate(field, &self.values);
        self.errors.apply_rule_result(field, result);
        if field.is_date() {
            self.check_date_order();
        }
        if let Err(e) = self.draft.save(self.values.clone(), self.preview.clone()) {
            warn!("Could not write {} through to the draft: {}", field, e);
        }
    }

    fn check_date_order(&mut self) -> DateOrderTransition {
        self.date_order.evaluate(
            self.values.departure_date,
            self.values.recruitment_end_date,
            &mut self.errors,
        )
    }
}

impl Drop for FormSessionController {
    fn drop(&mut self) {
        match self.draft.save(self.values.clone(), self.preview.clone()) {
            Ok(()) => debug!("Snapshotted registration form into the draft."),
            Err(e) => error!("Failed to snapshot registration form: {}", e),
        }
    }
}

fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
