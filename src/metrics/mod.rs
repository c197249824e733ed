//! Deterministic feature extraction over immutable intake logs.
//!
//! Pure functions only: no I/O, no clock access — every metric is a function
//! of the log/schedule slice and the inclusive day window it is given, so a
//! bundle is exactly reproducible for fixed inputs.

pub mod dates;
pub mod engine;
pub mod types;

pub use dates::*;
pub use engine::*;
pub use types::*;
