//! List-query state management module.
//!
//! This module contains everything the group list screen needs to keep its
//! filter, sort and search state consistent with the address bar:
//! - `GroupListQuery`, the five recognized query parameters
//! - `QueryStateStore`, the shared page-lifetime record of those parameters
//! - `History`, the address bar and its back/forward stack
//! - `QuerySynchronizer`, which reconciles the store with the address bar

mod history;
mod store;
mod sync;

pub use history::{History, ListenerId, NavigationEvent};
pub use store::{QueryStateStore, SubscriptionId};
pub use sync::{QuerySynchronizer, SyncGuard};

use fake::Dummy;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Specifying the recognized URL query keys.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum QueryKey {
    Page,
    Status,
    Area,
    Sort,
    Title,
}

impl QueryKey {
    /// Every recognized key, in the order they are written to the URL.
    pub const ALL: [QueryKey; 5] = [
        QueryKey::Page,
        QueryKey::Status,
        QueryKey::Area,
        QueryKey::Sort,
        QueryKey::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Page => "page",
            QueryKey::Status => "status",
            QueryKey::Area => "area",
            QueryKey::Sort => "sort",
            QueryKey::Title => "title",
        }
    }
}

/// Specifying the recruitment status filter.
///
/// Unrecognized values are carried through untouched in `Other`.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListStatus {
    All,
    Open,
    Other(String),
}

impl ListStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ListStatus::All => "all",
            ListStatus::Open => "open",
            ListStatus::Other(value) => value,
        }
    }
}

impl From<String> for ListStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "all" => ListStatus::All,
            "open" => ListStatus::Open,
            _ => ListStatus::Other(value),
        }
    }
}

impl From<ListStatus> for String {
    fn from(status: ListStatus) -> Self {
        status.as_str().to_owned()
    }
}

/// Specifying the list ordering.
///
/// Unrecognized values are carried through untouched in `Other`.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListSort {
    Latest,
    Deadline,
    Other(String),
}

impl ListSort {
    pub fn as_str(&self) -> &str {
        match self {
            ListSort::Latest => "latest",
            ListSort::Deadline => "deadline",
            ListSort::Other(value) => value,
        }
    }
}

impl From<String> for ListSort {
    fn from(value: String) -> Self {
        match value.as_str() {
            "latest" => ListSort::Latest,
            "deadline" => ListSort::Deadline,
            _ => ListSort::Other(value),
        }
    }
}

impl From<ListSort> for String {
    fn from(sort: ListSort) -> Self {
        sort.as_str().to_owned()
    }
}

/// Defines the list-query parameters shared by the list screen and the
/// list-fetch collaborator.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupListQuery {
    pub page: String,
    pub status: ListStatus,
    pub area: String,
    pub sort: ListSort,
    pub title: String,
}

impl Default for GroupListQuery {
    fn default() -> Self {
        GroupListQuery {
            page: "1".to_string(),
            status: ListStatus::All,
            area: String::new(),
            sort: ListSort::Latest,
            title: String::new(),
        }
    }
}

impl GroupListQuery {
    /// Return the value stored for the given key.
    ///
    pub fn value(&self, key: QueryKey) -> &str {
        match key {
            QueryKey::Page => &self.page,
            QueryKey::Status => self.status.as_str(),
            QueryKey::Area => &self.area,
            QueryKey::Sort => self.sort.as_str(),
            QueryKey::Title => &self.title,
        }
    }

    /// Overwrite the value stored for the given key.
    ///
    pub fn set_value(&mut self, key: QueryKey, value: &str) -> &mut Self {
        match key {
            QueryKey::Page => self.page = value.to_owned(),
            QueryKey::Status => self.status = ListStatus::from(value.to_owned()),
            QueryKey::Area => self.area = value.to_owned(),
            QueryKey::Sort => self.sort = ListSort::from(value.to_owned()),
            QueryKey::Title => self.title = value.to_owned(),
        }
        self
    }

    /// Returns all five key/value pairs in URL order.
    ///
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        QueryKey::ALL
            .iter()
            .map(|key| (key.as_str(), self.value(*key)))
            .collect()
    }

    /// True when any key present in `params` carries a value other than the
    /// one stored here. Keys absent from `params` never count as different.
    ///
    pub fn differs_from(&self, params: &SearchParams) -> bool {
        QueryKey::ALL.iter().any(|key| match params.get(*key) {
            Some(value) => value != self.value(*key),
            None => false,
        })
    }

    /// Returns a copy overwritten with every key present in `params`,
    /// keeping the current value for keys the URL does not carry.
    ///
    pub fn merged_with(&self, params: &SearchParams) -> GroupListQuery {
        let mut merged = self.clone();
        for key in QueryKey::ALL.iter() {
            if let Some(value) = params.get(*key) {
                merged.set_value(*key, value);
            }
        }
        merged
    }
}

/// Recognized query parameters read from a URL.
///
/// Only the first occurrence of a repeated key is kept and unrecognized keys
/// are ignored.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchParams {
    values: HashMap<QueryKey, String>,
    ignored: usize,
}

impl SearchParams {
    pub fn from_url(url: &Url) -> SearchParams {
        let mut values = HashMap::new();
        let mut ignored = 0;
        for (name, value) in url.query_pairs() {
            match QueryKey::ALL.iter().find(|k| k.as_str() == name) {
                Some(key) if !values.contains_key(key) => {
                    values.insert(*key, value.into_owned());
                }
                _ => ignored += 1,
            }
        }
        SearchParams { values, ignored }
    }

    /// True when the URL carries exactly the five recognized keys, once
    /// each, with the values of `query`.
    ///
    pub fn matches_exactly(&self, query: &GroupListQuery) -> bool {
        self.ignored == 0
            && self.values.len() == QueryKey::ALL.len()
            && !query.differs_from(self)
    }

    pub fn get(&self, key: QueryKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    fn url(query: &str) -> Url {
        Url::parse(&format!("https://trip.example/group?{}", query)).unwrap()
    }

    #[test]
    fn status_passes_unknown_values_through() {
        assert_eq!(ListStatus::from("open".to_string()), ListStatus::Open);
        let status = ListStatus::from("closed".to_string());
        assert_eq!(status, ListStatus::Other("closed".to_string()));
        assert_eq!(status.as_str(), "closed");
    }

    #[test]
    fn sort_passes_unknown_values_through() {
        assert_eq!(ListSort::from("deadline".to_string()), ListSort::Deadline);
        assert_eq!(ListSort::from("popular".to_string()).as_str(), "popular");
    }

    #[test]
    fn pairs_contains_all_five_keys_in_order() {
        let query: GroupListQuery = Faker.fake();
        let keys: Vec<&str> = query.pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["page", "status", "area", "sort", "title"]);
    }

    #[test]
    fn search_params_keep_first_occurrence_and_ignore_unknown_keys() {
        let params = SearchParams::from_url(&url("page=2&page=3&foo=bar&title=%EC%A0%9C%EC%A3%BC"));
        assert_eq!(params.get(QueryKey::Page), Some("2"));
        assert_eq!(params.get(QueryKey::Title), Some("제주"));
        assert_eq!(params.get(QueryKey::Area), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn matches_exactly_requires_all_keys_and_nothing_else() {
        let query = GroupListQuery::default();
        let canonical = "page=1&status=all&area=&sort=latest&title=";
        assert!(SearchParams::from_url(&url(canonical)).matches_exactly(&query));
        assert!(!SearchParams::from_url(&url("page=1&status=all")).matches_exactly(&query));
        let extra = format!("{}&utm=mail", canonical);
        assert!(!SearchParams::from_url(&url(&extra)).matches_exactly(&query));
    }

    #[test]
    fn missing_keys_never_count_as_different() {
        let query = GroupListQuery {
            title: "부산".to_string(),
            ..GroupListQuery::default()
        };
        assert!(!query.differs_from(&SearchParams::from_url(&url(""))));
        assert!(!query.differs_from(&SearchParams::from_url(&url("page=1"))));
        assert!(query.differs_from(&SearchParams::from_url(&url("page=4"))));
    }

    #[test]
    fn merged_with_falls_back_to_current_values() {
        let query = GroupListQuery {
            area: "서울".to_string(),
            title: "벚꽃".to_string(),
            ..GroupListQuery::default()
        };
        let merged = query.merged_with(&SearchParams::from_url(&url("status=open&sort=deadline")));
        assert_eq!(merged.status, ListStatus::Open);
        assert_eq!(merged.sort, ListSort::Deadline);
        assert_eq!(merged.area, "서울");
        assert_eq!(merged.title, "벚꽃");
        assert_eq!(merged.page, "1");
    }

    #[test]
    fn present_but_empty_value_is_applied() {
        let query = GroupListQuery {
            title: "벚꽃".to_string(),
            ..GroupListQuery::default()
        };
        let params = SearchParams::from_url(&url("title="));
        assert!(query.differs_from(&params));
        assert_eq!(query.merged_with(&params).title, "");
    }
}
