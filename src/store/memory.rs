use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use super::{ChangeEvent, FetchFilter, PostStore};
use crate::core::errors::StoreError;
use crate::core::helpers::now;
use crate::models::models::{NewPost, Post};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Process-local store. Backs the native dev server and the tests, and
/// notifies subscribers on every mutation.
pub struct MemoryPostStore {
    posts: Mutex<Vec<Post>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::with_posts(Vec::new())
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            posts: Mutex::new(posts),
            changes,
        }
    }

    /// Raw contents in insertion order.
    pub fn snapshot(&self) -> Vec<Post> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Post>> {
        // A panic while holding the lock cannot leave a half-written post behind.
        self.posts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update<F, T>(&self, id: &str, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Post) -> T,
    {
        let out = {
            let mut posts = self.lock();
            let post = posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            apply(post)
        };
        self.notify(ChangeEvent::Updated(id.to_string()));
        Ok(out)
    }

    fn notify(&self, event: ChangeEvent) {
        // No receivers is fine.
        let _ = self.changes.send(event);
    }
}

#[async_trait(?Send)]
impl PostStore for MemoryPostStore {
    async fn fetch_all(&self, filter: &FetchFilter) -> Result<Vec<Post>, StoreError> {
        Ok(filter.apply(self.snapshot()))
    }

    async fn increment_upvote(&self, id: &str) -> Result<u64, StoreError> {
        debug!(post_id = id, "upvote");
        self.update(id, |p| {
            p.upvotes += 1;
            p.upvotes
        })
    }

    async fn set_hidden(&self, id: &str, hidden: bool) -> Result<(), StoreError> {
        debug!(post_id = id, hidden, "set visibility");
        self.update(id, |p| p.is_hidden = hidden)
    }

    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            message: post.message,
            category: post.category,
            upvotes: 0,
            is_hidden: false,
            created_at: now(),
        };
        self.lock().push(post.clone());
        self.notify(ChangeEvent::Inserted(post.id.clone()));
        Ok(post)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        Some(self.changes.subscribe())
    }
}
