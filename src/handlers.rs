use spin_sdk::http::{Method, Request, Response};
use tracing::debug;

use crate::core::errors::ApiError;
use crate::posts;
use crate::store::PostStore;

/// Routes a request to its handler. Shared by the Spin component and the native server.
pub async fn route<S: PostStore>(store: &S, req: Request) -> anyhow::Result<Response> {
    let path = req.path().to_string();
    debug!(method = %req.method(), %path, "request");

    match (req.method(), path.as_str()) {
        (Method::Get, "/api/posts/") | (Method::Get, "/api/posts") => {
            posts::list_posts(store, &req).await
        }
        (Method::Post, "/api/posts/") | (Method::Post, "/api/posts") => {
            posts::create_post(store, &req).await
        }
        (Method::Post, p) if p.starts_with("/api/upvote/") => posts::upvote_post(store, &req).await,
        (Method::Post, p) if p.starts_with("/api/posts/") && is_visibility_path(p) => {
            posts::set_visibility(store, &req).await
        }
        (Method::Get, "/api/analytics/") | (Method::Get, "/api/analytics") => {
            posts::get_analytics(store, &req).await
        }
        (_, p) if p.starts_with("/api/") && is_known_path(p) => Ok(ApiError::MethodNotAllowed.into()),
        _ => Ok(ApiError::NotFound("No route found".to_string()).into()),
    }
}

fn is_visibility_path(path: &str) -> bool {
    path.trim_end_matches('/').ends_with("/visibility")
}

fn is_known_path(path: &str) -> bool {
    let trimmed = path.trim_end_matches('/');
    trimmed == "/api/posts"
        || trimmed == "/api/analytics"
        || trimmed.starts_with("/api/upvote/")
        || is_visibility_path(path)
}
