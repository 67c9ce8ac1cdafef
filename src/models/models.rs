use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::MESSAGE_PREVIEW_CHARS;

/// Closed set of topics a post can be filed under.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Education,
    Corruption,
    Environment,
    Equality,
    #[serde(rename = "Mental Health")]
    MentalHealth,
    Innovation,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 6] = [
        Category::Education,
        Category::Corruption,
        Category::Environment,
        Category::Equality,
        Category::MentalHealth,
        Category::Innovation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Education => "Education",
            Category::Corruption => "Corruption",
            Category::Environment => "Environment",
            Category::Equality => "Equality",
            Category::MentalHealth => "Mental Health",
            Category::Innovation => "Innovation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub id: String,
    pub message: String,
    pub category: Category,
    pub upvotes: u64,
    #[serde(default)]
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// First 100 characters of the message, with `...` appended when cut.
    pub fn preview(&self) -> String {
        if self.message.chars().count() > MESSAGE_PREVIEW_CHARS {
            let head: String = self.message.chars().take(MESSAGE_PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.message.clone()
        }
    }
}

/// A validated submission, ready to be handed to a store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewPost {
    pub message: String,
    pub category: Category,
}
