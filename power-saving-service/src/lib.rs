pub mod aggregate;
pub mod api;
pub mod config;
pub mod dates;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod sources;

pub use api::{router, AppState};
