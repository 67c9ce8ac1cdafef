pub mod models;
pub mod wire;
