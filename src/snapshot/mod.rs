pub mod background;
pub mod generator;
pub mod store;

pub use background::*;
pub use generator::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Even the minimal fallback snapshot could not be written — the store
    /// itself is unavailable. This is the only error generation surfaces.
    #[error("Failed to persist awareness snapshot: {0}")]
    Persistence(#[from] crate::db::DatabaseError),
}
