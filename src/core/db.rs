use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::models::models::{Category, Post};
use crate::store::KvPostStore;

const DEMO_POSTS: [(&str, Category, u64, i64); 6] = [
    (
        "Our school still has no mental health counsellor. Students wait weeks to talk to anyone.",
        Category::MentalHealth,
        12,
        2,
    ),
    (
        "Public exam fees should be waived for students from low income families.",
        Category::Education,
        8,
        5,
    ),
    (
        "The river behind the market is full of plastic again. We need regular clean-ups.",
        Category::Environment,
        5,
        1,
    ),
    (
        "Girls in my village are still expected to drop out after primary school.",
        Category::Equality,
        9,
        11,
    ),
    (
        "Permits for small shops take months unless you pay someone extra.",
        Category::Corruption,
        3,
        20,
    ),
    (
        "A shared makerspace at the library would help young people build real projects.",
        Category::Innovation,
        0,
        0,
    ),
];

/// Demo posts spread over the last few weeks.
pub fn demo_posts(now: DateTime<Utc>) -> Vec<Post> {
    DEMO_POSTS
        .iter()
        .map(|&(message, category, upvotes, age_days)| Post {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            category,
            upvotes,
            is_hidden: false,
            created_at: now - Duration::days(age_days),
        })
        .collect()
}

/// Seeds the demo posts into an empty store. Does nothing once any post exists.
pub fn init_demo_data(store: &KvPostStore, now: DateTime<Utc>) -> anyhow::Result<()> {
    if !store.feed()?.is_empty() {
        return Ok(());
    }

    let mut posts = demo_posts(now);
    // Oldest first so the feed ends up newest first.
    posts.sort_by_key(|p| p.created_at);
    for post in &posts {
        store.insert(post)?;
    }
    info!(count = posts.len(), "seeded demo posts");
    Ok(())
}
