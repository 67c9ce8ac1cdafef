//! Read model for a single feed view.
//!
//! A [`Feed`] owns its post snapshot and its [`ViewState`]. It changes only
//! when a fetch succeeds; failed actions leave it untouched and come back as
//! a [`Notice`] for the user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info};

use crate::analytics::{category_breakdown, AnalyticsReport};
use crate::core::errors::{StoreError, ValidationError};
use crate::models::models::{Category, Post};
use crate::store::{ChangeEvent, FetchFilter, PostStore};
use crate::view::{derive_posts, visible_posts, ViewState};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Toast-style message for the user.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    fn load_failed() -> Self {
        Self::error(
            "Failed to Load Posts",
            "There was an error loading the posts. Please try again.",
        )
    }

    fn for_validation(err: &ValidationError) -> Self {
        match err {
            ValidationError::EmptyMessage | ValidationError::MissingCategory => Self::error(
                "Missing Information",
                "Please fill in both your message and select a category.",
            ),
            ValidationError::UnknownCategory(_) => Self::error(
                "Invalid Category",
                "Please choose one of the listed categories.",
            ),
            ValidationError::MessageTooShort { min, .. } => Self::error(
                "Message Too Short",
                &format!("Please write at least {} characters to share your thoughts.", min),
            ),
            ValidationError::MessageTooLong { max, .. } => Self::error(
                "Message Too Long",
                &format!("Please keep your message under {} characters.", max),
            ),
        }
    }
}

/// Issued by [`Feed::begin_refresh`]; responses carrying an older ticket than
/// the last settled one are discarded. The ticket's view becomes the feed's
/// view only if its fetch succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    view: ViewState,
    pub filter: FetchFilter,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }
}

pub struct Feed<S: PostStore> {
    store: S,
    view: ViewState,
    posts: Vec<Post>,
    loaded: bool,
    issued: u64,
    applied: u64,
    changes: Option<broadcast::Receiver<ChangeEvent>>,
    invalidated: bool,
}

impl<S: PostStore> Feed<S> {
    pub fn new(store: S, view: ViewState) -> Self {
        let changes = store.subscribe();
        Self {
            store,
            view,
            posts: Vec::new(),
            loaded: false,
            issued: 0,
            applied: 0,
            changes,
            invalidated: true,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The filtered, ordered posts this view shows.
    pub fn posts(&self) -> Vec<Post> {
        derive_posts(&self.posts, &self.view)
    }

    pub fn find(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Analytics over the posts this view is allowed to see.
    pub fn report(&self, now: DateTime<Utc>) -> AnalyticsReport {
        AnalyticsReport::compute(&visible_posts(&self.posts, self.view.include_hidden), now)
    }

    /// Per-category badge counts; hidden posts never count.
    pub fn breakdown(&self) -> Vec<(Category, usize)> {
        category_breakdown(&visible_posts(&self.posts, false))
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.begin_refresh_for(self.view)
    }

    /// Starts a fetch for `view` without switching to it yet.
    pub fn begin_refresh_for(&mut self, view: ViewState) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket {
            generation: self.issued,
            view,
            filter: FetchFilter::from(&view),
        }
    }

    /// Applies a fetch result unless a newer one has already settled, whether
    /// that one succeeded or failed.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Post>, StoreError>,
    ) -> Option<Notice> {
        if ticket.generation <= self.applied {
            debug!(
                generation = ticket.generation,
                applied = self.applied,
                "dropping stale response"
            );
            return None;
        }

        match result {
            Ok(posts) => {
                debug!(generation = ticket.generation, count = posts.len(), "feed refreshed");
                self.posts = posts;
                self.view = ticket.view;
                self.applied = ticket.generation;
                self.loaded = true;
                self.invalidated = false;
                None
            }
            Err(e) => {
                error!("Error fetching posts: {}", e);
                self.applied = ticket.generation;
                self.loaded = true;
                Some(Notice::load_failed())
            }
        }
    }

    pub async fn refresh(&mut self) -> Option<Notice> {
        let ticket = self.begin_refresh();
        let result = self.store.fetch_all(&ticket.filter).await;
        self.complete_refresh(ticket, result)
    }

    /// Switches to `view` once its posts are in; on failure the old view and
    /// snapshot stay on screen.
    pub async fn set_view(&mut self, view: ViewState) -> Option<Notice> {
        let ticket = self.begin_refresh_for(view);
        let result = self.store.fetch_all(&ticket.filter).await;
        self.complete_refresh(ticket, result)
    }

    /// Drains pending change notifications. Returns true when the snapshot is out of date.
    pub fn poll_changes(&mut self) -> bool {
        if let Some(rx) = self.changes.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(event) => {
                        debug!(?event, "remote change");
                        self.invalidated = true;
                    }
                    Err(TryRecvError::Lagged(skipped)) => {
                        debug!(skipped, "change notifications lagged");
                        self.invalidated = true;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Closed) => {
                        self.changes = None;
                        break;
                    }
                }
            }
        }
        self.invalidated
    }

    /// Re-fetches if a change was pushed since the last successful fetch.
    pub async fn sync(&mut self) -> Option<Notice> {
        if self.poll_changes() {
            self.refresh().await
        } else {
            None
        }
    }

    pub async fn upvote(&mut self, id: &str) -> Vec<Notice> {
        match self.store.increment_upvote(id).await {
            Ok(upvotes) => {
                info!(post_id = id, upvotes, "upvoted");
                self.after_mutation(Notice::info(
                    "Upvoted!",
                    "You've shown support for this voice.",
                ))
                .await
            }
            Err(e) => {
                error!("Error upvoting post: {}", e);
                vec![Notice::error(
                    "Upvote Failed",
                    "There was an error upvoting this post. Please try again.",
                )]
            }
        }
    }

    /// Flips the visibility of a post currently in the snapshot.
    pub async fn toggle_visibility(&mut self, id: &str) -> Vec<Notice> {
        let failed = || {
            Notice::error(
                "Action Failed",
                "There was an error updating the post visibility.",
            )
        };

        let Some(was_hidden) = self.find(id).map(|p| p.is_hidden) else {
            error!("Error toggling post visibility: {} not in view", id);
            return vec![failed()];
        };

        match self.store.set_hidden(id, !was_hidden).await {
            Ok(()) => {
                let notice = if was_hidden {
                    Notice::info("Post Unhidden", "Post is now visible to everyone.")
                } else {
                    Notice::info("Post Hidden", "Post has been hidden from public view.")
                };
                self.after_mutation(notice).await
            }
            Err(e) => {
                error!("Error toggling post visibility: {}", e);
                vec![failed()]
            }
        }
    }

    pub async fn submit(&mut self, message: &str, category: Option<&str>) -> Vec<Notice> {
        match self.store.submit(message, category).await {
            Ok(post) => {
                info!(post_id = %post.id, "voice shared");
                self.after_mutation(Notice::info(
                    "Voice Shared Successfully!",
                    "Your anonymous message has been submitted and will appear on the dashboard.",
                ))
                .await
            }
            Err(StoreError::Validation(e)) => {
                debug!("submission rejected: {}", e);
                vec![Notice::for_validation(&e)]
            }
            Err(e) => {
                error!("Error submitting post: {}", e);
                vec![Notice::error(
                    "Submission Failed",
                    "There was an error sharing your voice. Please try again.",
                )]
            }
        }
    }

    async fn after_mutation(&mut self, notice: Notice) -> Vec<Notice> {
        let mut notices = vec![notice];
        notices.extend(self.refresh().await);
        notices
    }
}
