//! Lenient normalization of whole batches of raw points.

use hashbrown::HashMap;
use tracing::{debug, info};

use super::normalize::{normalize, RejectReason};
use crate::models::{Point, RawPoint};

/// Points that survived normalization plus a tally of what was dropped
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub points: Vec<Point>,
    pub rejected: HashMap<RejectReason, u64>,
}

impl NormalizedBatch {
    /// Record a rejection that happened before normalization (e.g. a
    /// value that could not be deserialized at all)
    pub fn reject(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    /// Normalize one raw point, keeping it or recording why it was dropped
    pub fn push(&mut self, raw: &RawPoint) -> bool {
        self.push_with_metadata(raw, Default::default())
    }

    /// Like [`push`](Self::push), attaching metadata to the kept point
    pub fn push_with_metadata(
        &mut self,
        raw: &RawPoint,
        metadata: HashMap<String, String>,
    ) -> bool {
        match normalize(raw) {
            Ok(point) => {
                self.points.push(point.with_metadata(metadata));
                true
            }
            Err(rejected) => {
                debug!("Dropping point {:?}: {}", raw, rejected.reason);
                self.reject(rejected.reason);
                false
            }
        }
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }

    pub fn rejected_for(&self, reason: RejectReason) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }
}

/// Normalize every raw point, dropping and tallying rejects.
pub fn normalize_batch<'a, I>(raws: I) -> NormalizedBatch
where
    I: IntoIterator<Item = &'a RawPoint>,
{
    let mut batch = NormalizedBatch::default();
    for raw in raws {
        batch.push(raw);
    }
    if batch.rejected_total() > 0 {
        info!(
            "Normalized {} points, rejected {}",
            batch.points.len(),
            batch.rejected_total()
        );
    }
    batch
}
