// ML Dashboard API: prediction endpoints over uploaded CSV and image files

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod batch;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod models;
pub mod remote;
pub mod server;

pub use backend::{build_backend, InferenceBackend};
pub use config::{BackendKind, Config};
pub use error::{ApiError, ConfigError, Result};
pub use server::{router, AppState};
