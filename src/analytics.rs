//! Aggregates over a post collection.
//!
//! Callers pass the collection they consider visible; nothing here looks at
//! `is_hidden`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::cmp::Reverse;

use crate::config::{RECENT_WINDOW_DAYS, TOP_POSTS_LIMIT};
use crate::models::models::{Category, Post};

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CategoryStats {
    pub category: Category,
    pub count: usize,
    pub total_upvotes: u64,
    pub average_upvotes: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Summary {
    pub total_posts: usize,
    pub total_upvotes: u64,
    pub average_upvotes: f64,
}

impl Summary {
    pub fn of(posts: &[Post]) -> Self {
        let total_posts = posts.len();
        let total_upvotes: u64 = posts.iter().map(|p| p.upvotes).sum();
        let average_upvotes = if total_posts == 0 {
            0.0
        } else {
            total_upvotes as f64 / total_posts as f64
        };
        Self {
            total_posts,
            total_upvotes,
            average_upvotes,
        }
    }

    /// One decimal place, or a bare `0` for an empty collection.
    pub fn average_display(&self) -> String {
        if self.total_posts == 0 {
            "0".to_string()
        } else {
            format!("{:.1}", self.average_upvotes)
        }
    }
}

/// Per-category figures, busiest category first. Empty categories are left out
/// and equal counts keep `Category::ALL` order.
pub fn category_stats(posts: &[Post]) -> Vec<CategoryStats> {
    let mut stats: Vec<CategoryStats> = Category::ALL
        .iter()
        .filter_map(|&category| {
            let (count, total_upvotes) = posts
                .iter()
                .filter(|p| p.category == category)
                .fold((0usize, 0u64), |(n, sum), p| (n + 1, sum + p.upvotes));
            (count > 0).then(|| CategoryStats {
                category,
                count,
                total_upvotes,
                average_upvotes: total_upvotes as f64 / count as f64,
            })
        })
        .collect();
    stats.sort_by_key(|s| Reverse(s.count));
    stats
}

/// Post counts per category in `Category::ALL` order, zeros omitted.
pub fn category_breakdown(posts: &[Post]) -> Vec<(Category, usize)> {
    Category::ALL
        .iter()
        .map(|&c| (c, posts.iter().filter(|p| p.category == c).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// The `limit` most upvoted posts. Ties go to the newer post, then the lower id.
pub fn top_posts(posts: &[Post], limit: usize) -> Vec<Post> {
    let mut ranked: Vec<&Post> = posts.iter().collect();
    ranked.sort_by(|a, b| {
        b.upvotes
            .cmp(&a.upvotes)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.into_iter().take(limit).cloned().collect()
}

pub fn is_recent(post: &Post, now: DateTime<Utc>) -> bool {
    post.created_at >= now - Duration::days(RECENT_WINDOW_DAYS)
}

pub fn recent_count(posts: &[Post], now: DateTime<Utc>) -> usize {
    posts.iter().filter(|p| is_recent(p, now)).count()
}

/// Everything the analytics dashboard shows, computed in one pass over a snapshot.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AnalyticsReport {
    #[serde(flatten)]
    pub summary: Summary,
    pub average_display: String,
    pub recent_posts: usize,
    pub category_stats: Vec<CategoryStats>,
    pub top_posts: Vec<Post>,
}

impl AnalyticsReport {
    pub fn compute(posts: &[Post], now: DateTime<Utc>) -> Self {
        let summary = Summary::of(posts);
        Self {
            average_display: summary.average_display(),
            summary,
            recent_posts: recent_count(posts, now),
            category_stats: category_stats(posts),
            top_posts: top_posts(posts, TOP_POSTS_LIMIT),
        }
    }
}
