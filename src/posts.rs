use spin_sdk::http::{Request, Response};
use tracing::{error, info, warn};

use crate::analytics::AnalyticsReport;
use crate::core::errors::{ApiError, StoreError, ValidationError};
use crate::core::helpers::{json_response, now, path_id, sanitize_message, validate_uuid};
use crate::core::query_params::view_state_from_query;
use crate::models::wire::{to_wire, WirePost};
use crate::store::{validate_submission, FetchFilter, PostStore};

fn store_failure(action: &str, err: StoreError) -> Response {
    if err.is_transport() {
        error!("{} failed: {}", action, err);
    } else {
        warn!("{} rejected: {}", action, err);
    }
    ApiError::from(err).into()
}

/// `GET /api/posts/?category=&sort=&include_hidden=`
pub async fn list_posts<S: PostStore>(store: &S, req: &Request) -> anyhow::Result<Response> {
    let view = match view_state_from_query(req.uri()) {
        Ok(v) => v,
        Err(bad) => {
            return Ok(ApiError::BadRequest(format!("Invalid query value: {}", bad)).into())
        }
    };

    match store.fetch_all(&FetchFilter::from(&view)).await {
        Ok(posts) => json_response(200, &to_wire(&posts)),
        Err(e) => Ok(store_failure("list posts", e)),
    }
}

/// `POST /api/posts/` with `{"message": ..., "category": ...}`
pub async fn create_post<S: PostStore>(store: &S, req: &Request) -> anyhow::Result<Response> {
    let value: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::BadRequest("Invalid JSON body".to_string()).into()),
    };
    let message = value["message"].as_str().unwrap_or_default();
    let category = value["category"].as_str();

    // Bounds apply to what the user typed; markup is stripped afterwards.
    let mut post = match validate_submission(message, category) {
        Ok(post) => post,
        Err(e) => return Ok(store_failure("create post", e.into())),
    };
    post.message = sanitize_message(&post.message);
    if post.message.is_empty() {
        return Ok(store_failure("create post", ValidationError::EmptyMessage.into()));
    }

    match store.create(post).await {
        Ok(post) => {
            info!(post_id = %post.id, category = %post.category, "post submitted");
            json_response(201, &WirePost::from(&post))
        }
        Err(e) => Ok(store_failure("create post", e)),
    }
}

/// `POST /api/upvote/{id}/`
pub async fn upvote_post<S: PostStore>(store: &S, req: &Request) -> anyhow::Result<Response> {
    let Some(post_id) = path_id(req.path(), "/api/upvote/", "") else {
        return Ok(ApiError::BadRequest("Post ID required".to_string()).into());
    };
    if !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    match store.increment_upvote(post_id).await {
        Ok(upvotes) => json_response(200, &serde_json::json!({ "id": post_id, "upvotes": upvotes })),
        Err(e) => Ok(store_failure("upvote", e)),
    }
}

/// `POST /api/posts/{id}/visibility/` with `{"is_hidden": bool}`
pub async fn set_visibility<S: PostStore>(store: &S, req: &Request) -> anyhow::Result<Response> {
    let Some(post_id) = path_id(req.path(), "/api/posts/", "/visibility/") else {
        return Ok(ApiError::BadRequest("Post ID required".to_string()).into());
    };
    if !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let value: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();
    let Some(hidden) = value["is_hidden"].as_bool() else {
        return Ok(ApiError::BadRequest("is_hidden must be a boolean".to_string()).into());
    };

    match store.set_hidden(post_id, hidden).await {
        Ok(()) => json_response(200, &serde_json::json!({ "id": post_id, "is_hidden": hidden })),
        Err(e) => Ok(store_failure("set visibility", e)),
    }
}

/// `GET /api/analytics/`, always over non-hidden posts.
pub async fn get_analytics<S: PostStore>(store: &S, _req: &Request) -> anyhow::Result<Response> {
    let posts = match store.fetch_all(&FetchFilter::visible()).await {
        Ok(posts) => posts,
        Err(e) => return Ok(store_failure("analytics", e)),
    };

    let report = AnalyticsReport::compute(&posts, now());
    json_response(
        200,
        &serde_json::json!({
            "total_posts": report.summary.total_posts,
            "total_upvotes": report.summary.total_upvotes,
            "average_upvotes": report.summary.average_upvotes,
            "average_display": report.average_display,
            "recent_posts": report.recent_posts,
            "category_stats": report.category_stats,
            "top_posts": to_wire(&report.top_posts),
        }),
    )
}
