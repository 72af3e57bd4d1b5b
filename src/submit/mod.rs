//! Submission pipeline module.
//!
//! Turns validated form values and the selected itinerary into the backend
//! payload and hands it to the submission collaborator:
//! - `places`: place ordering and area derivation
//! - `dates`: backend date formats
//! - `SubmissionPipeline`: payload assembly and in-flight tracking

mod dates;
mod error;
mod places;

pub use dates::{BackendDates, DateFormatter};
pub use error::SubmitError;
pub use places::{
    assign_order, derive_area, region_of, ItineraryPlaces, OrderedPlace, Place,
    PlaceCollaborator, SelectedPlaceList,
};

use crate::api::ApiError;
use crate::form::{FieldName, FileHandle, RegistrationDraft, Thumbnail};
use log::*;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

/// Specifying whether a post is being created or edited.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditTarget {
    Create,
    Edit { id: String },
}

impl EditTarget {
    pub fn is_edit(&self) -> bool {
        matches!(self, EditTarget::Edit { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            EditTarget::Create => None,
            EditTarget::Edit { id } => Some(id),
        }
    }
}

/// Defines the backend representation of a recruitment post.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub name: String,
    pub content: String,
    pub max_member_number: u32,
    pub trip_area: String,
    pub trip_date: String,
    pub due_date: Option<String>,
    pub places: Vec<OrderedPlace>,
}

/// Everything the submission collaborator receives for one submission.
///
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRequest {
    pub payload: GroupPayload,
    pub thumbnail: Option<FileHandle>,
    pub is_edit: bool,
    pub edit_id: Option<String>,
    pub unchanged_thumbnail: bool,
}

/// Defines the collaborator's acknowledgement of a submission.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitReceipt {
    pub group_id: Option<String>,
}

/// Collaborator performing the actual submission.
///
pub trait GroupSubmitter {
    fn submit_group(
        &self,
        request: SubmitRequest,
    ) -> impl Future<Output = Result<SubmitReceipt, ApiError>>;
}

/// Observable flag that is set while a submission is outstanding.
///
#[derive(Clone, Debug, Default)]
pub struct InFlight {
    flag: Rc<Cell<bool>>,
}

impl InFlight {
    pub fn is_set(&self) -> bool {
        self.flag.get()
    }

    /// Mark a submission as started. Returns None if one already is.
    ///
    pub fn begin(&self) -> Option<InFlightGuard> {
        if self.flag.replace(true) {
            return None;
        }
        Some(InFlightGuard {
            flag: Rc::clone(&self.flag),
        })
    }
}

/// Clears the in-flight flag when dropped.
///
pub struct InFlightGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Assembles backend payloads and delegates them to a `GroupSubmitter`.
///
pub struct SubmissionPipeline<S, P = ItineraryPlaces, D = BackendDates> {
    submitter: S,
    places: P,
    dates: D,
    in_flight: InFlight,
}

impl<S: GroupSubmitter> SubmissionPipeline<S> {
    /// Return a pipeline using the default place and date collaborators.
    ///
    pub fn new(submitter: S) -> Self {
        SubmissionPipeline::with_collaborators(submitter, ItineraryPlaces, BackendDates)
    }
}

impl<S, P, D> SubmissionPipeline<S, P, D>
where
    S: GroupSubmitter,
    P: PlaceCollaborator,
    D: DateFormatter,
{
    pub fn with_collaborators(submitter: S, places: P, dates: D) -> Self {
        SubmissionPipeline {
            submitter,
            places,
            dates,
            in_flight: InFlight::default(),
        }
    }

    /// Returns a handle to the in-flight flag.
    ///
    pub fn in_flight(&self) -> InFlight {
        self.in_flight.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_set()
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Build the collaborator request for the given form values and places.
    ///
    pub fn build_request(
        &self,
        form: &RegistrationDraft,
        places: &[Place],
        target: &EditTarget,
    ) -> Result<SubmitRequest, SubmitError> {
        let max_member_number = form.member_count().ok_or(SubmitError::Incomplete {
            field: FieldName::GroupMemberCount,
        })?;
        let departure = form.departure_date.ok_or(SubmitError::Incomplete {
            field: FieldName::DepartureDate,
        })?;

        let payload = GroupPayload {
            name: form.group_title.clone().unwrap_or_default(),
            content: form.group_description.clone().unwrap_or_default(),
            max_member_number,
            trip_area: self.places.derive_area(places),
            trip_date: self.dates.trip_date(departure),
            due_date: form
                .recruitment_end_date
                .map(|date| self.dates.due_date(date)),
            places: self.places.assign_order(places),
        };

        let (thumbnail, unchanged_thumbnail) = match &form.group_thumbnail {
            Thumbnail::ExistingUrl(_) => (None, true),
            Thumbnail::NewFile(file) => (Some(file.clone()), false),
            Thumbnail::Empty => (None, false),
        };

        Ok(SubmitRequest {
            payload,
            thumbnail,
            is_edit: target.is_edit(),
            edit_id: target.id().map(str::to_owned),
            unchanged_thumbnail,
        })
    }

    /// Build the request and hand it to the collaborator, holding the
    /// in-flight flag until it completes.
    ///
    pub async fn submit(
        &self,
        form: &RegistrationDraft,
        places: &[Place],
        target: &EditTarget,
    ) -> Result<SubmitReceipt, SubmitError> {
        let _guard = self.in_flight.begin().ok_or(SubmitError::InFlight)?;
        let request = self.build_request(form, places, target)?;
        info!(
            "Submitting group '{}' with {} places ({})...",
            request.payload.name,
            request.payload.places.len(),
            match target {
                EditTarget::Create => "create".to_string(),
                EditTarget::Edit { id } => format!("edit {}", id),
            }
        );
        let receipt = self.submitter.submit_group(request).await?;
        info!("Submission accepted: {:?}", receipt.group_id);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSubmitter {
        requests: RefCell<Vec<SubmitRequest>>,
        in_flight_seen: RefCell<Vec<bool>>,
        watch: RefCell<Option<InFlight>>,
        fail: bool,
    }

    impl GroupSubmitter for RecordingSubmitter {
        async fn submit_group(&self, request: SubmitRequest) -> Result<SubmitReceipt, ApiError> {
            if let Some(flag) = self.watch.borrow().as_ref() {
                self.in_flight_seen.borrow_mut().push(flag.is_set());
            }
            self.requests.borrow_mut().push(request);
            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    message: "server error".to_string(),
                });
            }
            Ok(SubmitReceipt {
                group_id: Some("42".to_string()),
            })
        }
    }

    fn form() -> RegistrationDraft {
        RegistrationDraft {
            group_title: Some("부산 맛집 탐방".to_string()),
            group_description: Some("돼지국밥 투어".to_string()),
            group_member_count: Some("6".to_string()),
            departure_date: NaiveDate::from_ymd_opt(2024, 6, 10),
            recruitment_end_date: NaiveDate::from_ymd_opt(2024, 6, 5),
            group_thumbnail: Thumbnail::Empty,
        }
    }

    fn places() -> Vec<Place> {
        vec![
            Place::named("해운대", "부산광역시 해운대구"),
            Place::named("감천문화마을", "부산광역시 사하구"),
        ]
    }

    #[test]
    fn builds_payload_shape() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter::default());
        let request = pipeline
            .build_request(&form(), &places(), &EditTarget::Create)
            .unwrap();

        let payload = &request.payload;
        assert_eq!(payload.name, "부산 맛집 탐방");
        assert_eq!(payload.content, "돼지국밥 투어");
        assert_eq!(payload.max_member_number, 6);
        assert_eq!(payload.trip_area, "부산");
        assert_eq!(payload.trip_date, "2024-06-10");
        assert_eq!(payload.due_date.as_deref(), Some("2024-06-05T23:59:59"));
        assert_eq!(payload.places[0].order, 0);
        assert_eq!(payload.places[1].order, 1);
        assert!(!request.is_edit);
        assert_eq!(request.edit_id, None);
        assert!(!request.unchanged_thumbnail);
        assert_eq!(request.thumbnail, None);
    }

    #[test]
    fn existing_thumbnail_url_is_not_reuploaded() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter::default());
        let mut values = form();
        values.group_thumbnail = Thumbnail::ExistingUrl("https://example/img.png".to_string());
        let request = pipeline
            .build_request(
                &values,
                &places(),
                &EditTarget::Edit {
                    id: "17".to_string(),
                },
            )
            .unwrap();
        assert_eq!(request.thumbnail, None);
        assert!(request.unchanged_thumbnail);
        assert!(request.is_edit);
        assert_eq!(request.edit_id.as_deref(), Some("17"));
    }

    #[test]
    fn new_thumbnail_file_is_uploaded() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter::default());
        let mut values = form();
        values.group_thumbnail = Thumbnail::NewFile(FileHandle::new("/tmp/sea.jpg"));
        let request = pipeline
            .build_request(&values, &places(), &EditTarget::Create)
            .unwrap();
        assert_eq!(request.thumbnail, Some(FileHandle::new("/tmp/sea.jpg")));
        assert!(!request.unchanged_thumbnail);
    }

    #[test]
    fn missing_deadline_is_omitted() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter::default());
        let mut values = form();
        values.recruitment_end_date = None;
        let request = pipeline
            .build_request(&values, &places(), &EditTarget::Create)
            .unwrap();
        assert_eq!(request.payload.due_date, None);
    }

    #[test]
    fn incomplete_values_are_rejected() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter::default());
        let mut values = form();
        values.group_member_count = Some("many".to_string());
        assert!(matches!(
            pipeline.build_request(&values, &places(), &EditTarget::Create),
            Err(SubmitError::Incomplete {
                field: FieldName::GroupMemberCount
            })
        ));
        let mut values = form();
        values.departure_date = None;
        assert!(matches!(
            pipeline.build_request(&values, &places(), &EditTarget::Create),
            Err(SubmitError::Incomplete {
                field: FieldName::DepartureDate
            })
        ));
    }

    #[tokio::test]
    async fn in_flight_is_set_only_during_the_call() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter::default());
        *pipeline.submitter().watch.borrow_mut() = Some(pipeline.in_flight());

        assert!(!pipeline.is_in_flight());
        let receipt = pipeline
            .submit(&form(), &places(), &EditTarget::Create)
            .await
            .unwrap();
        assert_eq!(receipt.group_id.as_deref(), Some("42"));
        assert_eq!(*pipeline.submitter().in_flight_seen.borrow(), vec![true]);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn second_submission_is_refused_while_in_flight() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter::default());
        let _outstanding = pipeline.in_flight().begin().unwrap();
        let result = pipeline.submit(&form(), &places(), &EditTarget::Create).await;
        assert!(matches!(result, Err(SubmitError::InFlight)));
        assert!(pipeline.submitter().requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn collaborator_failure_propagates_and_clears_flag() {
        let pipeline = SubmissionPipeline::new(RecordingSubmitter {
            fail: true,
            ..RecordingSubmitter::default()
        });
        let result = pipeline.submit(&form(), &places(), &EditTarget::Create).await;
        assert!(matches!(result, Err(SubmitError::Api(_))));
        assert!(!pipeline.is_in_flight());
    }
}
