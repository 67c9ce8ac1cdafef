pub const MIN_MESSAGE_LENGTH: usize = 10;
pub const MAX_MESSAGE_LENGTH: usize = 1000;
pub const TOP_POSTS_LIMIT: usize = 5;
pub const RECENT_WINDOW_DAYS: i64 = 7;
pub const MESSAGE_PREVIEW_CHARS: usize = 100;

// KV keys
pub const FEED_KEY: &str = "feed";

pub fn post_key(id: &str) -> String {
    format!("post:{}", id)
}

pub fn api_base_url() -> String {
    std::env::var("VOICES_API_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string())
}

pub fn seed_demo_data() -> bool {
    std::env::var("VOICES_SEED_DATA")
        .map(|v| v == "true")
        .unwrap_or(false)
}

pub fn bind_address() -> String {
    std::env::var("VOICES_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
