//! Bitemporal visibility: snapshots and per-leaf delta logs.
//!
//! A fact is visible at a snapshot `(T, R)` iff the net sum of its change
//! counts with `transaction <= T` and `round <= R` is strictly positive.
//! Counts are always netted per node; deltas from distinct nodes never
//! cancel each other. [`DeltaLog::net_count_for`] is the only place
//! multiplicity is netted.

use crate::types::{Id, ResolvedField};
use smallvec::SmallVec;

/// A bitemporal "as of" position.
///
/// `transaction` is the externally-visible batch boundary; `round` is the
/// fixpoint-iteration step within a transaction. Together they form a
/// lexicographic key, and both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub transaction: u64,
    pub round: u64,
}

impl Snapshot {
    /// Visible at every recorded transaction and round.
    pub const LATEST: Snapshot = Snapshot {
        transaction: u64::MAX,
        round: u64::MAX,
    };

    pub fn new(transaction: u64, round: u64) -> Self {
        Self { transaction, round }
    }

    /// Whether a change recorded at `(transaction, round)` is admissible at
    /// this snapshot.
    pub fn admits(&self, transaction: u64, round: u64) -> bool {
        transaction <= self.transaction && round <= self.round
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot::LATEST
    }
}

/// One recorded delta for an `(entity, attribute, value)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub node: Id,
    pub transaction: u64,
    pub round: u64,
    pub count: i64,
}

/// Append-only log of deltas at one leaf of the hash index.
///
/// The log grows without bound; compaction is the caller's problem and
/// never happens implicitly. Most leaves hold one or two deltas, so the
/// entries are stored inline until the log spills.
#[derive(Debug, Clone, Default)]
pub struct DeltaLog {
    entries: SmallVec<[Delta; 2]>,
}

impl DeltaLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: Delta) {
        self.entries.push(delta);
    }

    /// Net multiplicity of one node's deltas visible at `snapshot`.
    ///
    /// Linear in log length; entries may arrive in any transaction/round
    /// order, so no sorted-order shortcut is taken.
    pub fn net_count_for(&self, node: Id, snapshot: Snapshot) -> i64 {
        let mut total = 0;
        for delta in &self.entries {
            if delta.node == node && snapshot.admits(delta.transaction, delta.round) {
                total += delta.count;
            }
        }
        total
    }

    /// Whether some node accepted by `node` has a positive net count at
    /// `snapshot`. Nodes are netted independently, so a retraction under
    /// one node cannot mask an assertion under another.
    pub fn is_live(&self, node: ResolvedField, snapshot: Snapshot) -> bool {
        self.entries.iter().enumerate().any(|(i, delta)| {
            node.matches(delta.node)
                && !self.entries[..i].iter().any(|d| d.node == delta.node)
                && self.net_count_for(delta.node, snapshot) > 0
        })
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
