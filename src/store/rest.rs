//! Client for the REST backend (`/api/posts/`, `/api/upvote/{id}/`).
//!
//! The backend neither filters nor sorts, so [`FetchFilter`] is applied here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{FetchFilter, PostStore};
use crate::config::api_base_url;
use crate::core::errors::StoreError;
use crate::core::helpers::now;
use crate::models::models::{NewPost, Post};
use crate::models::wire::WirePost;

/// Body of a successful `POST /api/upvote/{id}/`.
#[derive(Deserialize)]
struct UpvoteCount {
    upvotes: u64,
}

pub struct RestPostStore {
    pub base_url: String,
    client: Client,
}

impl Default for RestPostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RestPostStore {
    /// Uses `VOICES_API_URL`.
    pub fn new() -> Self {
        Self::with_url(&api_base_url())
    }

    pub fn with_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        id: Option<&str>,
    ) -> Result<reqwest::Response, StoreError> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(transport)?;
        check_status(response, id).await
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

async fn check_status(
    response: reqwest::Response,
    id: Option<&str>,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound(id.to_string())),
        _ => Err(StoreError::Transport(format!("server returned {}: {}", status, body))),
    }
}

#[async_trait(?Send)]
impl PostStore for RestPostStore {
    async fn fetch_all(&self, filter: &FetchFilter) -> Result<Vec<Post>, StoreError> {
        let response = self
            .client
            .get(self.url("/api/posts/"))
            .send()
            .await
            .map_err(transport)?;
        let rows: Vec<WirePost> = check_status(response, None)
            .await?
            .json()
            .await
            .map_err(transport)?;

        let fetched_at = now();
        let total = rows.len();
        let posts: Vec<Post> = rows
            .into_iter()
            .filter_map(|row| match row.into_post(fetched_at) {
                Ok(post) => Some(post),
                Err(category) => {
                    warn!(%category, "skipping post with unknown category");
                    None
                }
            })
            .collect();
        debug!(total, kept = posts.len(), "fetched posts");

        Ok(filter.apply(posts))
    }

    async fn increment_upvote(&self, id: &str) -> Result<u64, StoreError> {
        let counted: UpvoteCount = self
            .post_json(&format!("/api/upvote/{}/", id), None, Some(id))
            .await?
            .json()
            .await
            .map_err(transport)?;
        Ok(counted.upvotes)
    }

    async fn set_hidden(&self, id: &str, hidden: bool) -> Result<(), StoreError> {
        let body = serde_json::json!({ "is_hidden": hidden });
        self.post_json(&format!("/api/posts/{}/visibility/", id), Some(body), Some(id))
            .await
            .map(|_| ())
    }

    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let body = serde_json::json!({
            "message": post.message,
            "category": post.category.label(),
        });
        let row: WirePost = self
            .post_json("/api/posts/", Some(body), None)
            .await?
            .json()
            .await
            .map_err(transport)?;
        row.into_post(now())
            .map_err(|category| StoreError::Transport(format!("unknown category in response: {}", category)))
    }
}
