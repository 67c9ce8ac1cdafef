use async_trait::async_trait;
use spin_sdk::key_value::Store;
use tracing::{debug, info};
use uuid::Uuid;

use super::{FetchFilter, PostStore};
use crate::config::{post_key, FEED_KEY};
use crate::core::errors::StoreError;
use crate::core::helpers::now;
use crate::models::models::{NewPost, Post};

/// Row store over the Spin key-value store.
///
/// Each post lives under `post:{id}`; `feed` holds the ids, newest first.
pub struct KvPostStore {
    store: Store,
}

impl KvPostStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(crate::core::helpers::store()?))
    }

    pub fn feed(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.store.get_json(FEED_KEY)?.unwrap_or_default())
    }

    pub fn load(&self, id: &str) -> anyhow::Result<Option<Post>> {
        self.store.get_json::<Post>(&post_key(id))
    }

    pub fn load_all(&self) -> anyhow::Result<Vec<Post>> {
        let mut posts = Vec::new();
        for id in self.feed()? {
            if let Some(p) = self.load(&id)? {
                posts.push(p);
            }
        }
        Ok(posts)
    }

    /// Writes a full row and puts its id at the head of the feed if new.
    pub fn insert(&self, post: &Post) -> anyhow::Result<()> {
        self.store.set_json(&post_key(&post.id), post)?;

        let mut feed = self.feed()?;
        if !feed.contains(&post.id) {
            feed.insert(0, post.id.clone());
            self.store.set_json(FEED_KEY, &feed)?;
        }
        Ok(())
    }

    fn patch<F, T>(&self, id: &str, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Post) -> T,
    {
        let key = post_key(id);
        let mut post = self
            .store
            .get_json::<Post>(&key)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let out = apply(&mut post);
        self.store.set_json(&key, &post)?;
        Ok(out)
    }
}

#[async_trait(?Send)]
impl PostStore for KvPostStore {
    async fn fetch_all(&self, filter: &FetchFilter) -> Result<Vec<Post>, StoreError> {
        let posts = self.load_all()?;
        debug!(count = posts.len(), "loaded posts");
        Ok(filter.apply(posts))
    }

    async fn increment_upvote(&self, id: &str) -> Result<u64, StoreError> {
        self.patch(id, |p| {
            p.upvotes += 1;
            p.upvotes
        })
    }

    async fn set_hidden(&self, id: &str, hidden: bool) -> Result<(), StoreError> {
        self.patch(id, |p| p.is_hidden = hidden)
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
        self.insert(&post)?;
        info!(post_id = %post.id, category = %post.category, "post created");
        Ok(post)
    }
}
