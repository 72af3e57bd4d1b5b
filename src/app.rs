use crate::api::{GroupApi, GroupPage};
use crate::config::Config;
use crate::form::{
    DraftStore, FieldName, FileHandle, FileThumbnailLookup, FormSessionController,
    RegistrationDraft, SubmitBlocker, SubmitOutcome, Thumbnail,
};
use crate::query::{GroupListQuery, History, ListSort, ListStatus, QueryStateStore, QuerySynchronizer};
use crate::submit::{EditTarget, Place, SubmissionPipeline};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::*;
use reqwest::Url;
use std::fmt;

/// Address the list screen lives at; only its query string matters.
const LIST_PAGE_URL: &str = "http://localhost/groups";

/// Actions to run against the list screen.
///
#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    pub url: Option<String>,
    pub page: Option<String>,
    pub status: Option<String>,
    pub area: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub back: bool,
    pub offline: bool,
}

/// Settled state of the list screen.
///
#[derive(Debug)]
pub struct ListReport {
    pub query_string: String,
    pub query: GroupListQuery,
    pub page: Option<GroupPage>,
}

/// Field changes and actions to run against the registration form.
///
#[derive(Clone, Debug, Default)]
pub struct RecruitOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub members: Option<String>,
    pub departure: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub thumbnail: Option<String>,
    pub remove_thumbnail: bool,
    pub places: Vec<Place>,
    pub edit: Option<String>,
    pub submit: bool,
    pub discard_draft: bool,
}

/// State of the registration form when the session was torn down.
///
#[derive(Debug)]
pub struct RecruitReport {
    pub values: RegistrationDraft,
    pub errors: Vec<(FieldName, String)>,
    pub preview: Option<String>,
    pub blocker: Option<SubmitBlocker>,
    pub itinerary_notice: Option<&'static str>,
    pub outcome: Option<SubmitOutcome>,
    pub submission_notice: Option<String>,
}

/// Oversees the list and registration flows according to the configuration.
///
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> App {
        App { config }
    }

    /// Mount the list synchronizer over the given address, apply the
    /// actions and return the settled query, fetching the list unless
    /// offline.
    ///
    pub async fn list(&self, options: ListOptions) -> Result<ListReport> {
        let initial = list_url(options.url.as_deref())?;
        debug!("Opening list screen at {}...", initial);
        let store = QueryStateStore::new(self.config.list_defaults.clone());
        let mut sync = QuerySynchronizer::new(store, History::new(initial));

        let (query_string, query) = {
            let guard = sync.mount();
            let store = guard.store();
            if let Some(status) = options.status {
                store.apply_status(ListStatus::from(status));
            }
            if let Some(area) = options.area.as_deref() {
                store.apply_area(area);
            }
            if let Some(sort) = options.sort {
                store.apply_sort(ListSort::from(sort));
            }
            if let Some(term) = options.search.as_deref() {
                store.apply_search_term(term);
            }
            if let Some(page) = options.page.as_deref() {
                store.apply_page(page);
            }
            if options.back && !guard.history().back() {
                warn!("No earlier list state to go back to.");
            }
            (guard.history().query(), store.get())
        };
        debug!("List query settled after {} URL writes.", sync.url_writes());

        let page = if options.offline {
            None
        } else {
            let api = GroupApi::new(
                &self.config.api_base_url,
                self.config.access_token.as_deref(),
            )?;
            Some(
                api.list_groups(&query)
                    .await
                    .context("Failed to fetch group list")?,
            )
        };

        Ok(ListReport {
            query_string,
            query,
            page,
        })
    }

    /// Mount a form session over the persisted draft, apply the changes,
    /// optionally submit, then tear the session down and persist the draft.
    ///
    pub async fn recruit(&self, options: RecruitOptions) -> Result<RecruitReport> {
        let draft_path = self.config.draft_path()?;
        let draft = DraftStore::read_from(&draft_path)?;
        if options.discard_draft {
            draft.clear();
        }
        let rules = self.config.rule_set()?;
        let lookup = FileThumbnailLookup::new(self.config.thumbnail_path()?);
        let mut session = FormSessionController::mount(draft.clone(), rules, &lookup);

        if let Some(title) = options.title {
            session.set_title(title);
        }
        if let Some(description) = options.description {
            session.set_description(description);
        }
        if let Some(members) = options.members {
            session.set_member_count(members);
        }
        if options.departure.is_some() {
            session.set_departure_date(options.departure);
        }
        if options.deadline.is_some() {
            session.set_recruitment_end_date(options.deadline);
        }
        if let Some(thumbnail) = options.thumbnail.as_deref() {
            session.select_thumbnail(thumbnail_value(thumbnail));
        }
        if options.remove_thumbnail {
            session.remove_thumbnail();
        }
        session.validate_all();

        let outcome = if options.submit {
            let target = match options.edit {
                Some(id) => EditTarget::Edit { id },
                None => EditTarget::Create,
            };
            let api = GroupApi::new(
                &self.config.api_base_url,
                self.config.access_token.as_deref(),
            )?;
            let pipeline = SubmissionPipeline::new(api);
            Some(session.submit(&pipeline, &options.places, &target).await)
        } else {
            None
        };

        let report = RecruitReport {
            values: session.values().clone(),
            errors: session
                .errors()
                .iter()
                .map(|(field, error)| (*field, error.message.clone()))
                .collect(),
            preview: session.preview().map(|p| p.as_str().to_owned()),
            blocker: session.submit_blocker(&options.places, false),
            itinerary_notice: session.missing_itinerary_notice(&options.places),
            outcome,
            submission_notice: session.submission_notice().map(str::to_owned),
        };

        session.unmount();
        draft
            .write_to(&draft_path)
            .with_context(|| format!("Failed to persist draft to {}", draft_path.display()))?;
        Ok(report)
    }
}

/// Returns the list address for `--url`: a full URL, or a bare query string
/// with or without the leading `?`.
///
pub fn list_url(url: Option<&str>) -> Result<Url> {
    let mut base = Url::parse(LIST_PAGE_URL)?;
    match url {
        None => Ok(base),
        Some(url) if url.contains("://") => {
            Url::parse(url).with_context(|| format!("Invalid list URL '{}'", url))
        }
        Some(query) => {
            let query = query.trim_start_matches('?');
            base.set_query(if query.is_empty() { None } else { Some(query) });
            Ok(base)
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
///
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

/// Parse a `NAME@ADDRESS` place.
///
pub fn parse_place(value: &str) -> Result<Place> {
    let (name, address) = value
        .split_once('@')
        .ok_or_else(|| anyhow!("Invalid place '{}', expected NAME@ADDRESS", value))?;
    if name.trim().is_empty() {
        return Err(anyhow!("Place '{}' has no name", value));
    }
    Ok(Place::named(name.trim(), address.trim()))
}

fn thumbnail_value(value: &str) -> Thumbnail {
    if value.starts_with("http://") || value.starts_with("https://") {
        Thumbnail::ExistingUrl(value.to_owned())
    } else {
        Thumbnail::NewFile(FileHandle::new(value))
    }
}

impl fmt::Display for ListReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "?{}", self.query_string)?;
        if let Some(page) = &self.page {
            for group in page.content.iter() {
                writeln!(
                    f,
                    "[{}] {} | {} | {} | {}/{} | {}",
                    group.id,
                    group.name,
                    group.trip_area,
                    group.trip_date,
                    group.current_member_number,
                    group.max_member_number,
                    group.status
                )?;
            }
            writeln!(f, "page {} of {}", self.query.page, page.total_pages)?;
        }
        Ok(())
    }
}

impl fmt::Display for RecruitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = &self.values;
        let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        writeln!(f, "title:       {}", show(values.group_title.clone()))?;
        writeln!(f, "description: {}", show(values.group_description.clone()))?;
        writeln!(f, "members:     {}", show(values.group_member_count.clone()))?;
        writeln!(f, "departure:   {}", show(values.raw_value(FieldName::DepartureDate)))?;
        writeln!(f, "deadline:    {}", show(values.raw_value(FieldName::RecruitmentEndDate)))?;
        writeln!(f, "thumbnail:   {}", show(self.preview.clone()))?;
        for (field, message) in self.errors.iter() {
            writeln!(f, "! {}: {}", field, message)?;
        }
        if let Some(notice) = self.itinerary_notice {
            writeln!(f, "! {}", notice)?;
        }
        match self.blocker {
            Some(blocker) => writeln!(f, "submit: disabled ({:?})", blocker)?,
            None => writeln!(f, "submit: ready")?,
        }
        match &self.outcome {
            Some(SubmitOutcome::Submitted(receipt)) => writeln!(
                f,
                "submitted{}",
                receipt
                    .group_id
                    .as_deref()
                    .map(|id| format!(" as group {}", id))
                    .unwrap_or_default()
            )?,
            Some(SubmitOutcome::Refused(blocker)) => writeln!(f, "not submitted ({:?})", blocker)?,
            Some(SubmitOutcome::Failed) => writeln!(
                f,
                "submission failed: {}",
                self.submission_notice.as_deref().unwrap_or_default()
            )?,
            None => (),
        }
        Ok(())
    }
}
