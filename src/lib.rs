#[cfg(target_arch = "wasm32")]
use spin_sdk::{
    http::{IntoResponse, Request},
    http_component,
};
#[cfg(target_arch = "wasm32")]
use tracing::warn;

pub mod analytics;
pub mod config;
pub mod core;
pub mod feed;
pub mod handlers;
pub mod models;
pub mod posts;
pub mod store;
pub mod view;

#[cfg(target_arch = "wasm32")]
use crate::store::KvPostStore;

// === Component entrypoint ===
#[cfg(target_arch = "wasm32")]
#[http_component]
async fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    let store = KvPostStore::open_default()?;

    if config::seed_demo_data() {
        if let Err(e) = crate::core::db::init_demo_data(&store, crate::core::helpers::now()) {
            warn!("demo data not seeded: {}", e);
        }
    }

    handlers::route(&store, req).await
}
