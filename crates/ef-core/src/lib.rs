//! ef-core: stable foundation for entroflow.
//!
//! Contains:
//! - numeric (Real + float helpers)
//! - timing (wall-clock deadlines for solver loops)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use timing::Deadline;
