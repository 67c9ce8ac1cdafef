use ammonia::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use spin_sdk::http::Response;
use spin_sdk::key_value::Store;
use std::collections::HashSet;
use uuid::Uuid;

pub fn store() -> anyhow::Result<Store> {
    Ok(Store::open_default()?)
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn json_response<T: Serialize>(status: u16, value: &T) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(value)?)
        .build())
}

pub fn validate_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Pulls the id segment out of `/api/upvote/{id}/` style paths.
pub fn path_id<'a>(path: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    let rest = rest.trim_end_matches('/');
    let id = rest.strip_suffix(suffix.trim_end_matches('/')).unwrap_or(rest);
    let id = id.trim_end_matches('/');
    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id)
    }
}

/// Anonymous submissions are stored as plain text: markup is dropped and the
/// entities ammonia emits are decoded back, so `&`, `<` and `>` survive as typed.
pub fn sanitize_message(text: &str) -> String {
    let clean = Builder::default()
        .tags(HashSet::new())
        .clean(text)
        .to_string();
    html_escape::decode_html_entities(&clean).trim().to_string()
}
