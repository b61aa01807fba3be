//! Coordinate extraction for noisy location exports.
//!
//! Raw inputs are dropped on rejection rather than failing the run.

mod batch;
mod normalize;

pub use batch::{normalize_batch, NormalizedBatch};
pub use normalize::{normalize, RejectReason, Rejected};
