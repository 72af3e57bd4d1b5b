use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Defines a recruitment post as shown on the list screen.
///
#[derive(Clone, Debug, Dummy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub trip_area: String,
    #[serde(default)]
    pub trip_date: String,
    #[serde(default)]
    pub due_date: Option<String>,
    pub max_member_number: u32,
    #[serde(default)]
    pub current_member_number: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Defines one page of the group list.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupPage {
    pub content: Vec<GroupSummary>,
    pub total_pages: u32,
}
