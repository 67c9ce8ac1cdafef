use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::models::{Category, Post};

/// Ids come back as integers from the relational backend and as strings from ours.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum WireId {
    Int(i64),
    Str(String),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Int(n) => n.to_string(),
            WireId::Str(s) => s,
        }
    }
}

/// REST representation of a post (`timestamp` instead of `created_at`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WirePost {
    pub id: WireId,
    pub message: String,
    pub category: String,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default, alias = "created_at")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&Post> for WirePost {
    fn from(post: &Post) -> Self {
        Self {
            id: WireId::Str(post.id.clone()),
            message: post.message.clone(),
            category: post.category.label().to_string(),
            upvotes: post.upvotes,
            is_hidden: post.is_hidden,
            timestamp: Some(post.created_at),
        }
    }
}

impl WirePost {
    /// Canonical post, or the offending category label when it is outside the fixed set.
    /// A missing timestamp is replaced by `fallback`.
    pub fn into_post(self, fallback: DateTime<Utc>) -> Result<Post, String> {
        let category = self.category.parse::<Category>()?;
        Ok(Post {
            id: self.id.into(),
            message: self.message,
            category,
            upvotes: self.upvotes,
            is_hidden: self.is_hidden,
            created_at: self.timestamp.unwrap_or(fallback),
        })
    }
}

pub fn to_wire(posts: &[Post]) -> Vec<WirePost> {
    posts.iter().map(WirePost::from).collect()
}
