//! Feed view derivation.
//!
//! Everything here is a pure function of a post slice and a [`ViewState`];
//! callers re-run it whenever either changes.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::str::FromStr;

use crate::models::models::{Category, Post};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Newest first.
    #[default]
    Recent,
    /// Most upvoted first.
    Upvotes,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(SortBy::Recent),
            "upvotes" => Ok(SortBy::Upvotes),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(c) => Some(*c),
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map(CategoryFilter::Only).unwrap_or_default()
    }
}

/// Parameters of a single feed view. Each view owns one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub sort_by: SortBy,
    pub filter: CategoryFilter,
    /// Moderation mode: hidden posts are listed too.
    pub include_hidden: bool,
}

impl ViewState {
    pub fn moderation() -> Self {
        Self {
            include_hidden: true,
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_filter(mut self, filter: CategoryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn admits(&self, post: &Post) -> bool {
        is_visible(post, self.include_hidden) && self.filter.matches(post.category)
    }
}

pub fn is_visible(post: &Post, include_hidden: bool) -> bool {
    include_hidden || !post.is_hidden
}

pub fn visible_posts(posts: &[Post], include_hidden: bool) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| is_visible(p, include_hidden))
        .cloned()
        .collect()
}

/// Sorts in place; ties keep their current relative order.
pub fn sort_posts(posts: &mut [Post], sort_by: SortBy) {
    match sort_by {
        SortBy::Recent => posts.sort_by_key(|p| Reverse(p.created_at)),
        SortBy::Upvotes => posts.sort_by_key(|p| Reverse(p.upvotes)),
    }
}

/// The ordered list a feed view shows.
pub fn derive_posts(posts: &[Post], view: &ViewState) -> Vec<Post> {
    let mut out: Vec<Post> = posts.iter().filter(|p| view.admits(p)).cloned().collect();
    sort_posts(&mut out, view.sort_by);
    out
}
