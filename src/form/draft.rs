//! In-progress registration draft and persisted thumbnail lookup.

use super::{RegistrationDraft, StateError, ThumbnailPreview};
use log::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DraftRecord {
    form: RegistrationDraft,
    thumbnail_preview: Option<ThumbnailPreview>,
}

/// Page-lifetime store of the in-progress registration form.
///
/// Holds the form values and, separately, the thumbnail preview that was
/// showing when the form was last torn down. Cloning the store clones the
/// handle, not the record.
///
#[derive(Clone, Default)]
pub struct DraftStore {
    inner: Rc<RefCell<DraftRecord>>,
}

impl DraftStore {
    pub fn new() -> Self {
        DraftStore::default()
    }

    /// Returns a copy of the stored form values.
    ///
    pub fn form(&self) -> RegistrationDraft {
        self.inner.borrow().form.clone()
    }

    /// Returns the stored thumbnail preview, if any.
    ///
    pub fn thumbnail_preview(&self) -> Option<ThumbnailPreview> {
        self.inner.borrow().thumbnail_preview.clone()
    }

    /// Overwrite the stored form values, keeping the stored preview.
    ///
    pub fn save_form(&self, form: RegistrationDraft) -> Result<(), StateError> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|e| StateError::Busy(format!("draft store: {}", e)))?;
        inner.form = form;
        Ok(())
    }

    /// Overwrite both the form values and the preview.
    ///
    pub fn save(
        &self,
        form: RegistrationDraft,
        preview: Option<ThumbnailPreview>,
    ) -> Result<(), StateError> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|e| StateError::Busy(format!("draft store: {}", e)))?;
        inner.form = form;
        inner.thumbnail_preview = preview;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.borrow();
        inner.form.is_empty() && inner.thumbnail_preview.is_none()
    }

    /// Discard the draft entirely.
    ///
    pub fn clear(&self) {
        *self.inner.borrow_mut() = DraftRecord::default();
        info!("Discarded registration draft.");
    }

    /// Load a draft previously written with `write_to`. A missing file yields
    /// an empty draft.
    ///
    pub fn read_from(path: &Path) -> Result<DraftStore, StateError> {
        if !path.exists() {
            debug!("No draft found at {}, starting empty.", path.display());
            return Ok(DraftStore::new());
        }
        let contents = fs::read_to_string(path).map_err(|e| StateError::DraftReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let record: DraftRecord = serde_yaml::from_str(&contents)?;
        debug!("Loaded registration draft from {}.", path.display());
        Ok(DraftStore {
            inner: Rc::new(RefCell::new(record)),
        })
    }

    /// Persist the draft as YAML.
    ///
    pub fn write_to(&self, path: &Path) -> Result<(), StateError> {
        let content = serde_yaml::to_string(&*self.inner.borrow())?;
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StateError::DraftWriteFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        fs::write(path, content).map_err(|e| StateError::DraftWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("Saved registration draft to {}.", path.display());
        Ok(())
    }
}

/// Read-only access to a thumbnail stored outside the form, consulted once
/// when the form is mounted.
///
pub trait ThumbnailLookup {
    fn stored_thumbnail(&self) -> Option<ThumbnailPreview>;
}

/// Lookup that never finds a stored thumbnail.
///
pub struct NoStoredThumbnail;

impl ThumbnailLookup for NoStoredThumbnail {
    fn stored_thumbnail(&self) -> Option<ThumbnailPreview> {
        None
    }
}

impl ThumbnailLookup for Option<ThumbnailPreview> {
    fn stored_thumbnail(&self) -> Option<ThumbnailPreview> {
        self.clone()
    }
}

/// Lookup backed by a file whose trimmed contents are the stored reference.
///
pub struct FileThumbnailLookup {
    path: PathBuf,
}

impl FileThumbnailLookup {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileThumbnailLookup {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ThumbnailLookup for FileThumbnailLookup {
    fn stored_thumbnail(&self) -> Option<ThumbnailPreview> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let reference = contents.trim();
                if reference.is_empty() {
                    None
                } else {
                    Some(ThumbnailPreview::new(reference))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(
                    "Failed to read stored thumbnail at {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FileHandle, Thumbnail};
    use fake::uuid::UUIDv4;
    use fake::Fake;
    use uuid::Uuid;

    fn temp_path(name: &str) -> PathBuf {
        let id: Uuid = UUIDv4.fake();
        std::env::temp_dir().join(format!("trip-recruit-{}", id)).join(name)
    }

    #[test]
    fn save_and_read_back() {
        let store = DraftStore::new();
        assert!(store.is_empty());
        let form = RegistrationDraft {
            group_title: Some("여수 밤바다".to_string()),
            ..RegistrationDraft::default()
        };
        store
            .save(form.clone(), Some(ThumbnailPreview::new("https://example/img.png")))
            .unwrap();
        assert_eq!(store.form(), form);
        assert_eq!(
            store.thumbnail_preview().unwrap().as_str(),
            "https://example/img.png"
        );
        assert!(!store.is_empty());
    }

    #[test]
    fn clones_share_the_record() {
        let store = DraftStore::new();
        let other = store.clone();
        other
            .save_form(RegistrationDraft {
                group_description: Some("함께 걸어요".to_string()),
                ..RegistrationDraft::default()
            })
            .unwrap();
        assert_eq!(store.form().group_description.as_deref(), Some("함께 걸어요"));
    }

    #[test]
    fn clear_discards_everything() {
        let store = DraftStore::new();
        store
            .save(
                RegistrationDraft {
                    group_title: Some("x".to_string()),
                    ..RegistrationDraft::default()
                },
                Some(ThumbnailPreview::new("p")),
            )
            .unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn persists_to_disk() {
        let path = temp_path("draft.yml");
        let store = DraftStore::new();
        let form = RegistrationDraft {
            group_title: Some("강릉 커피 투어".to_string()),
            group_member_count: Some("6".to_string()),
            departure_date: chrono::NaiveDate::from_ymd_opt(2024, 9, 1),
            group_thumbnail: Thumbnail::NewFile(FileHandle::new("/tmp/coffee.png")),
            ..RegistrationDraft::default()
        };
        store
            .save(form.clone(), Some(ThumbnailPreview::new("/tmp/coffee.png")))
            .unwrap();
        store.write_to(&path).unwrap();

        let restored = DraftStore::read_from(&path).unwrap();
        assert_eq!(restored.form(), form);
        assert_eq!(restored.thumbnail_preview(), store.thumbnail_preview());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_draft_file_is_empty() {
        let store = DraftStore::read_from(&temp_path("absent.yml")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_lookup_reads_trimmed_reference() {
        let path = temp_path("thumbnail");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "  https://cdn.example/t.png\n").unwrap();
        let lookup = FileThumbnailLookup::new(&path);
        assert_eq!(
            lookup.stored_thumbnail().unwrap().as_str(),
            "https://cdn.example/t.png"
        );

        fs::write(&path, "\n").unwrap();
        assert_eq!(lookup.stored_thumbnail(), None);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_lookup_without_file_finds_nothing() {
        assert_eq!(FileThumbnailLookup::new(temp_path("none")).stored_thumbnail(), None);
    }
}
