//! Registration form values.

use super::FieldName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Defines a locally selected image file.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub path: PathBuf,
}

impl FileHandle {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileHandle {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file name used when uploading.
    ///
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "thumbnail".to_string())
    }
}

/// Specifying the thumbnail field value.
///
/// `ExistingUrl` only occurs when editing a post whose thumbnail has not been
/// replaced.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Thumbnail {
    #[default]
    Empty,
    ExistingUrl(String),
    NewFile(FileHandle),
}

impl Thumbnail {
    pub fn is_empty(&self) -> bool {
        matches!(self, Thumbnail::Empty)
    }

    /// Returns the preview reference for this value, if any.
    ///
    pub fn preview(&self) -> Option<ThumbnailPreview> {
        match self {
            Thumbnail::Empty => None,
            Thumbnail::ExistingUrl(url) => Some(ThumbnailPreview::new(url)),
            Thumbnail::NewFile(file) => Some(ThumbnailPreview::new(file.path.display().to_string())),
        }
    }
}

/// Reference to the image shown as the thumbnail preview (URL or path).
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThumbnailPreview(String);

impl ThumbnailPreview {
    pub fn new<S: Into<String>>(reference: S) -> Self {
        ThumbnailPreview(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Registration form values, used both for the live form and its draft.
///
/// The member count is kept as entered so that non-numeric input can be
/// reported by the pattern rule and restored verbatim.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationDraft {
    pub group_title: Option<String>,
    pub group_description: Option<String>,
    pub group_member_count: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub recruitment_end_date: Option<NaiveDate>,
    pub group_thumbnail: Thumbnail,
}

impl RegistrationDraft {
    /// Returns the textual value rules are evaluated against. Dates render
    /// as `YYYY-MM-DD`; the thumbnail renders as its preview reference.
    ///
    pub fn raw_value(&self, field: FieldName) -> Option<String> {
        match field {
            FieldName::GroupTitle => self.group_title.clone(),
            FieldName::GroupDescription => self.group_description.clone(),
            FieldName::GroupMemberCount => self.group_member_count.clone(),
            FieldName::DepartureDate => self.departure_date.map(|d| d.format("%Y-%m-%d").to_string()),
            FieldName::RecruitmentEndDate => {
                self.recruitment_end_date.map(|d| d.format("%Y-%m-%d").to_string())
            }
            FieldName::GroupThumbnail => self.group_thumbnail.preview().map(|p| p.as_str().to_owned()),
        }
    }

    /// Returns the member count as a number, if it parses.
    ///
    pub fn member_count(&self) -> Option<u32> {
        self.group_member_count
            .as_deref()
            .and_then(|count| count.trim().parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        *self == RegistrationDraft::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_formats_dates() {
        let draft = RegistrationDraft {
            departure_date: NaiveDate::from_ymd_opt(2024, 6, 10),
            ..RegistrationDraft::default()
        };
        assert_eq!(draft.raw_value(FieldName::DepartureDate).as_deref(), Some("2024-06-10"));
        assert_eq!(draft.raw_value(FieldName::RecruitmentEndDate), None);
    }

    #[test]
    fn member_count_parses_only_numbers() {
        let mut draft = RegistrationDraft {
            group_member_count: Some("5".to_string()),
            ..RegistrationDraft::default()
        };
        assert_eq!(draft.member_count(), Some(5));
        draft.group_member_count = Some("5a".to_string());
        assert_eq!(draft.member_count(), None);
    }

    #[test]
    fn thumbnail_preview_follows_variant() {
        assert_eq!(Thumbnail::Empty.preview(), None);
        let url = Thumbnail::ExistingUrl("https://example/img.png".to_string());
        assert_eq!(url.preview().unwrap().as_str(), "https://example/img.png");
        let file = Thumbnail::NewFile(FileHandle::new("/tmp/photo.jpg"));
        assert_eq!(file.preview().unwrap().as_str(), "/tmp/photo.jpg");
    }

    #[test]
    fn file_handle_reports_file_name() {
        assert_eq!(FileHandle::new("/tmp/photo.jpg").file_name(), "photo.jpg");
    }

    #[test]
    fn draft_round_trips_through_yaml() {
        let draft = RegistrationDraft {
            group_title: Some("제주 한 달 살기".to_string()),
            group_member_count: Some("4".to_string()),
            departure_date: NaiveDate::from_ymd_opt(2024, 6, 10),
            group_thumbnail: Thumbnail::NewFile(FileHandle::new("/tmp/photo.jpg")),
            ..RegistrationDraft::default()
        };
        let yaml = serde_yaml::to_string(&draft).unwrap();
        let restored: RegistrationDraft = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, draft);
    }
}
