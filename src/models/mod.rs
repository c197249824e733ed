pub mod enums;
pub mod intake_log;
pub mod medication;
pub mod snapshot;

pub use enums::*;
pub use intake_log::*;
pub use medication::*;
pub use snapshot::*;
