//! Medtrail core — persistence and analysis backbone of a chronic-care
//! medication tracker.
//!
//! The crate owns four layers, leaf to root:
//! - [`metrics`]: pure, deterministic feature extraction over intake logs
//! - [`analysis`]: sufficiency gating plus a strictly constrained AI
//!   pattern-analysis wrapper that never fails
//! - [`snapshot`]: the orchestrator deriving and upserting one awareness
//!   snapshot per (user, time window), with a fire-and-forget trigger
//! - [`db`]: SQLite persistence for medications, schedules, immutable intake
//!   logs and the snapshot rows
//!
//! Pages, authentication and consent flows live outside this crate and talk
//! to it through [`snapshot::AwarenessStore`] and the repository functions.

pub mod analysis;
pub mod config;
pub mod db;
pub mod metrics;
pub mod models;
pub mod snapshot;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. Call once from the embedding binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Medtrail core v{}", config::APP_VERSION);
}
