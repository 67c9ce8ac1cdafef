//! Post store contract and its backends.
//!
//! A store is the only thing that talks to persistence. Views never patch
//! their local copy after a mutation; they fetch again.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::config::{MAX_MESSAGE_LENGTH, MIN_MESSAGE_LENGTH};
use crate::core::errors::{StoreError, ValidationError};
use crate::models::models::{Category, NewPost, Post};
use crate::view::{derive_posts, is_visible, CategoryFilter, SortBy, ViewState};

pub mod kv;
pub mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub mod rest;

pub use kv::KvPostStore;
pub use memory::MemoryPostStore;
#[cfg(not(target_arch = "wasm32"))]
pub use rest::RestPostStore;

/// What a fetch asks the backend to pre-filter and pre-sort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchFilter {
    pub include_hidden: bool,
    pub category: Option<Category>,
    pub order: Option<SortBy>,
}

impl FetchFilter {
    /// Every non-hidden post, unordered.
    pub fn visible() -> Self {
        Self::default()
    }

    /// Applies the filter locally, for backends without server-side support.
    pub fn apply(&self, posts: Vec<Post>) -> Vec<Post> {
        match self.order {
            Some(sort_by) => derive_posts(
                &posts,
                &ViewState {
                    sort_by,
                    filter: CategoryFilter::from(self.category),
                    include_hidden: self.include_hidden,
                },
            ),
            None => posts
                .into_iter()
                .filter(|p| is_visible(p, self.include_hidden))
                .filter(|p| CategoryFilter::from(self.category).matches(p.category))
                .collect(),
        }
    }
}

impl From<&ViewState> for FetchFilter {
    fn from(view: &ViewState) -> Self {
        Self {
            include_hidden: view.include_hidden,
            category: view.filter.category(),
            order: Some(view.sort_by),
        }
    }
}

/// Pushed to subscribers after any remote mutation. Only used as a hint to re-fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    Inserted(String),
    Updated(String),
}

#[async_trait(?Send)]
pub trait PostStore {
    async fn fetch_all(&self, filter: &FetchFilter) -> Result<Vec<Post>, StoreError>;

    /// Asks the backend to add one upvote and returns the count it reports.
    /// Views still re-fetch to see the authoritative collection.
    async fn increment_upvote(&self, id: &str) -> Result<u64, StoreError>;

    async fn set_hidden(&self, id: &str, hidden: bool) -> Result<(), StoreError>;

    /// Inserts an already validated post; id, timestamp and counters are assigned by the store.
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        None
    }

    /// Validates raw form input and only then calls [`PostStore::create`].
    async fn submit(&self, message: &str, category: Option<&str>) -> Result<Post, StoreError> {
        let post = validate_submission(message, category)?;
        self.create(post).await
    }
}

/// Checks a submission the way the form does: trimmed message of 10 to 1000
/// characters and a known category.
pub fn validate_submission(message: &str, category: Option<&str>) -> Result<NewPost, ValidationError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }

    let category = match category.map(str::trim) {
        None | Some("") => return Err(ValidationError::MissingCategory),
        Some(raw) => raw
            .parse::<Category>()
            .map_err(ValidationError::UnknownCategory)?,
    };

    let length = message.chars().count();
    if length < MIN_MESSAGE_LENGTH {
        return Err(ValidationError::MessageTooShort {
            min: MIN_MESSAGE_LENGTH,
            actual: length,
        });
    }
    if length > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::MessageTooLong {
            max: MAX_MESSAGE_LENGTH,
            actual: length,
        });
    }

    Ok(NewPost {
        message: message.to_string(),
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_characters_rejected_ten_accepted() {
        assert_eq!(
            validate_submission("123456789", Some("Education")),
            Err(ValidationError::MessageTooShort { min: 10, actual: 9 })
        );
        let ok = validate_submission("1234567890", Some("Education")).unwrap();
        assert_eq!(ok.message, "1234567890");
        assert_eq!(ok.category, Category::Education);
    }

    #[test]
    fn length_counts_trimmed_characters() {
        assert!(validate_submission("   123456789   ", Some("Equality")).is_err());
        let ok = validate_submission("  éducation!  ", Some("Mental Health")).unwrap();
        assert_eq!(ok.message, "éducation!");
        assert_eq!(ok.category, Category::MentalHealth);
    }

    #[test]
    fn missing_pieces() {
        assert_eq!(validate_submission("   ", Some("Education")), Err(ValidationError::EmptyMessage));
        assert_eq!(
            validate_submission("long enough message", None),
            Err(ValidationError::MissingCategory)
        );
        assert_eq!(
            validate_submission("long enough message", Some("General")),
            Err(ValidationError::UnknownCategory("General".to_string()))
        );
    }

    #[test]
    fn too_long() {
        let message = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(matches!(
            validate_submission(&message, Some("Innovation")),
            Err(ValidationError::MessageTooLong { .. })
        ));
        let message = "x".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate_submission(&message, Some("Innovation")).is_ok());
    }
}
