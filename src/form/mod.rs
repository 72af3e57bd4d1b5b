//! Registration form state management module.
//!
//! This module contains the form side of the recruitment flow:
//! - Field values and the persisted draft (`RegistrationDraft`, `DraftStore`)
//! - Field-level rules (`RuleSet`) and the error set they populate
//! - The cross-field date ordering rule (`DateOrderValidator`)
//! - The live form session (`FormSessionController`)

mod date_order;
mod draft;
mod error;
mod errors;
mod rules;
mod session;
mod values;

pub use date_order::{DateOrderTransition, DateOrderValidator, DATE_ORDER_MESSAGE};
pub use draft::{DraftStore, FileThumbnailLookup, NoStoredThumbnail, ThumbnailLookup};
pub use error::StateError;
pub use errors::{ErrorKind, FieldError, ValidationErrorSet};
pub use rules::{BoundRule, FieldRules, FieldRulesSpec, PatternRule, RuleSet};
pub use session::{FormSessionController, SubmitBlocker, SubmitOutcome, MISSING_ITINERARY_MESSAGE};
pub use values::{FileHandle, RegistrationDraft, Thumbnail, ThumbnailPreview};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Specifying the registration form fields.
///
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    GroupTitle,
    GroupDescription,
    GroupMemberCount,
    DepartureDate,
    RecruitmentEndDate,
    GroupThumbnail,
}

impl FieldName {
    pub const ALL: [FieldName; 6] = [
        FieldName::GroupTitle,
        FieldName::GroupDescription,
        FieldName::GroupMemberCount,
        FieldName::DepartureDate,
        FieldName::RecruitmentEndDate,
        FieldName::GroupThumbnail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::GroupTitle => "groupTitle",
            FieldName::GroupDescription => "groupDescription",
            FieldName::GroupMemberCount => "groupMemberCount",
            FieldName::DepartureDate => "departureDate",
            FieldName::RecruitmentEndDate => "recruitmentEndDate",
            FieldName::GroupThumbnail => "groupThumbnail",
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, FieldName::DepartureDate | FieldName::RecruitmentEndDate)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .find(|field| field.as_str() == s)
            .copied()
            .ok_or_else(|| StateError::UnknownField(s.to_string()))
    }
}
