mod client;
mod error;
mod resource;

pub use client::Client;
pub use error::ApiError;
pub use resource::*;

use crate::query::GroupListQuery;
use crate::submit::{GroupSubmitter, SubmitReceipt, SubmitRequest};
use log::*;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

/// Responsible for asynchronous interaction with the recruitment backend:
/// fetching the group list and submitting posts.
///
pub struct GroupApi {
    client: Client,
}

impl GroupApi {
    /// Returns a new instance for the given base URL and optional token.
    ///
    pub fn new(base_url: &str, access_token: Option<&str>) -> Result<GroupApi, ApiError> {
        debug!("Initializing backend client for {}...", base_url);
        Ok(GroupApi {
            client: Client::new(base_url, access_token)?,
        })
    }

    /// Returns the page of groups matching the list query.
    ///
    pub async fn list_groups(&self, query: &GroupListQuery) -> Result<GroupPage, ApiError> {
        debug!("Requesting groups for {:?}...", query);
        let request = self
            .client
            .request(Method::GET, "groups")?
            .query(&query.pairs());
        let page: GroupPage = self.client.send_json(request).await?;
        debug!(
            "Received {} groups ({} pages).",
            page.content.len(),
            page.total_pages
        );
        Ok(page)
    }

    async fn multipart(&self, request: &SubmitRequest) -> Result<Form, ApiError> {
        let payload = serde_json::to_string(&request.payload)?;
        let mut form = Form::new().part(
            "request",
            Part::text(payload).mime_str("application/json")?,
        );
        if let Some(file) = &request.thumbnail {
            let bytes = tokio::fs::read(&file.path)
                .await
                .map_err(|e| ApiError::Thumbnail {
                    path: file.path.clone(),
                    source: e,
                })?;
            form = form.part("thumbnail", Part::bytes(bytes).file_name(file.file_name()));
        }
        Ok(form.text("originThumbnail", request.unchanged_thumbnail.to_string()))
    }
}

impl GroupSubmitter for GroupApi {
    async fn submit_group(&self, request: SubmitRequest) -> Result<SubmitReceipt, ApiError> {
        let (method, path) = match (request.is_edit, request.edit_id.as_deref()) {
            (false, _) => (Method::POST, "groups".to_string()),
            (true, Some(id)) => (Method::PUT, format!("groups/{}", id)),
            (true, None) => {
                return Err(ApiError::Other(
                    "Edit submission without a group id".to_string(),
                ))
            }
        };

        let form = self.multipart(&request).await?;
        let response = self
            .client
            .send(self.client.request(method, &path)?.multipart(form))
            .await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(SubmitReceipt::default());
        }
        match serde_json::from_slice::<SubmitReceipt>(&bytes) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                debug!("Submission response is not a receipt ({}), ignoring body.", e);
                Ok(SubmitReceipt::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ListSort, ListStatus};
    use crate::submit::{GroupPayload, OrderedPlace, Place};
    use crate::form::FileHandle;
    use fake::uuid::UUIDv4;
    use fake::{Fake, Faker};
    use httpmock::MockServer;
    use serde_json::json;
    use uuid::Uuid;

    fn request(is_edit: bool, edit_id: Option<&str>) -> SubmitRequest {
        SubmitRequest {
            payload: GroupPayload {
                name: "부산 맛집 탐방".to_string(),
                content: "돼지국밥 투어".to_string(),
                max_member_number: 6,
                trip_area: "부산".to_string(),
                trip_date: "2024-06-10".to_string(),
                due_date: Some("2024-06-05T23:59:59".to_string()),
                places: vec![OrderedPlace {
                    place: Place::named("해운대", "부산광역시 해운대구"),
                    order: 0,
                }],
            },
            thumbnail: None,
            is_edit,
            edit_id: edit_id.map(str::to_owned),
            unchanged_thumbnail: false,
        }
    }

    #[tokio::test]
    async fn list_groups_success() -> anyhow::Result<()> {
        let token: Uuid = UUIDv4.fake();
        let groups: [GroupSummary; 2] = Faker.fake();
        let query = GroupListQuery {
            page: "2".to_string(),
            status: ListStatus::Open,
            area: "제주".to_string(),
            sort: ListSort::Deadline,
            title: "올레길".to_string(),
        };

        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/groups")
                    .query_param("page", "2")
                    .query_param("status", "open")
                    .query_param("area", "제주")
                    .query_param("sort", "deadline")
                    .query_param("title", "올레길")
                    .header("Authorization", &format!("Bearer {}", &token));
                then.status(200).json_body(json!({
                    "content": [groups[0], groups[1]],
                    "totalPages": 3
                }));
            })
            .await;

        let api = GroupApi::new(&server.base_url(), Some(&token.to_string()))?;
        let page = api.list_groups(&query).await?;
        mock.assert_async().await;
        assert_eq!(page.content, groups.to_vec());
        assert_eq!(page.total_pages, 3);
        Ok(())
    }

    #[tokio::test]
    async fn list_groups_unauthorized() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/groups");
                then.status(401).body("expired token");
            })
            .await;

        let api = GroupApi::new(&server.base_url(), None).unwrap();
        let result = api.list_groups(&GroupListQuery::default()).await;
        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(ApiError::Status { status: 401, ref message }) if message == "expired token"
        ));
    }

    #[tokio::test]
    async fn list_groups_malformed_body() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("GET").path("/groups");
                then.status(200).body("<html>");
            })
            .await;

        let api = GroupApi::new(&server.base_url(), None).unwrap();
        assert!(matches!(
            api.list_groups(&GroupListQuery::default()).await,
            Err(ApiError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn create_posts_multipart() -> anyhow::Result<()> {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/groups")
                    .body_contains("name=\"request\"")
                    .body_contains("\"maxMemberNumber\":6")
                    .body_contains("name=\"originThumbnail\"");
                then.status(201).json_body(json!({ "groupId": "42" }));
            })
            .await;

        let api = GroupApi::new(&server.base_url(), None)?;
        let receipt = api.submit_group(request(false, None)).await?;
        mock.assert_async().await;
        assert_eq!(receipt.group_id.as_deref(), Some("42"));
        Ok(())
    }

    #[tokio::test]
    async fn edit_puts_to_group_and_uploads_thumbnail() -> anyhow::Result<()> {
        let id: Uuid = UUIDv4.fake();
        let path = std::env::temp_dir().join(format!("trip-recruit-{}.png", id));
        std::fs::write(&path, b"not really a png")?;

        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/groups/17")
                    .body_contains("name=\"thumbnail\"")
                    .body_contains("not really a png");
                then.status(200);
            })
            .await;

        let api = GroupApi::new(&server.base_url(), None)?;
        let mut edit = request(true, Some("17"));
        edit.thumbnail = Some(FileHandle::new(&path));
        let receipt = api.submit_group(edit).await?;
        mock.assert_async().await;
        assert_eq!(receipt, SubmitReceipt::default());
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[tokio::test]
    async fn missing_thumbnail_file_fails_before_sending() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("POST").path("/groups");
                then.status(201);
            })
            .await;

        let api = GroupApi::new(&server.base_url(), None).unwrap();
        let mut create = request(false, None);
        create.thumbnail = Some(FileHandle::new("/nonexistent/trip-recruit/thumb.png"));
        assert!(matches!(
            api.submit_group(create).await,
            Err(ApiError::Thumbnail { .. })
        ));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn edit_without_id_is_rejected() {
        let api = GroupApi::new("http://localhost:8080/api", None).unwrap();
        assert!(matches!(
            api.submit_group(request(true, None)).await,
            Err(ApiError::Other(_))
        ));
    }
}
