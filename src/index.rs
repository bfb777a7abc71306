//! Index contract and the reference list-backed backend
//!
//! This module defines the trait every index backend implements, the
//! [`Proposal`] scratch object used by the cardinality-estimation protocol,
//! the linear-scan [`ListIndex`] correctness baseline, and the inert
//! [`MatrixIndex`] placeholder.

use crate::temporal::Snapshot;
use crate::types::{Change, Eavn, FieldKind, Id, Pattern, ResolvedField};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// One resolved result row.
pub type Row = SmallVec<[Id; 4]>;

/// Field priority for the reference backend's propose step: the first
/// unbound field in this order is the one proposed. Attributes tend to have
/// the smallest domain, so they come first.
const PROPOSE_PRIORITY: [FieldKind; 4] = [
    FieldKind::Attribute,
    FieldKind::Value,
    FieldKind::Entity,
    FieldKind::Node,
];

/// Scratch output of one cardinality-estimation step.
///
/// A join planner keeps one `Proposal` per evaluation branch and passes it
/// to [`Index::propose`], which resets and refills it. Reusing the same
/// value across calls avoids allocation on the planner's hot path, so a
/// proposal must never be shared between concurrently evaluated branches.
#[derive(Debug, Clone, Default)]
pub struct Proposal {
    /// Which field(s) this step would bind; in practice a single field.
    pub bound_fields: SmallVec<[FieldKind; 2]>,
    /// Number of distinct candidates, or `None` when not yet estimated.
    pub cardinality: Option<usize>,
    /// Distinct identifiers the proposed field can take.
    pub candidates: Vec<Id>,
    /// The pattern is fully bound and confirmed live; nothing to enumerate.
    pub skip: bool,
}

impl Proposal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all fields back to the unknown state.
    pub fn reset(&mut self) {
        self.bound_fields.clear();
        self.cardinality = None;
        self.candidates.clear();
        self.skip = false;
    }

    /// Whether the pattern was confirmed absent (prune this branch).
    pub fn is_dead(&self) -> bool {
        !self.skip && self.cardinality == Some(0)
    }
}

/// Operations every index backend provides.
///
/// Reads are pure functions of the inserted change set and the snapshot;
/// inserts apply in call order. Default temporal bounds are expressed by
/// passing [`Snapshot::LATEST`].
pub trait Index {
    /// Append a fact delta. Repeated inserts of the same logical fact
    /// accumulate multiplicity.
    fn insert(&mut self, change: Change);

    /// Pick exactly one field of `pattern` to bind next and fill `proposal`
    /// with its distinct candidates and their count. A fully-bound pattern
    /// that is confirmed live sets `skip` instead; a confirmed-absent
    /// pattern reports cardinality 0. Resets `proposal` on entry.
    fn propose(&self, proposal: &mut Proposal, pattern: &Pattern, snapshot: Snapshot);

    /// Convert a proposal's candidates into caller-facing result rows,
    /// exactly reproducing the result implied by the preceding
    /// [`propose`](Index::propose) call.
    fn resolve_proposal(&self, proposal: &Proposal) -> Vec<Row>;

    /// Enumerate matching, temporally-visible facts. Unordered.
    fn get(&self, pattern: &Pattern, snapshot: Snapshot) -> Vec<Eavn>;

    /// True iff [`get`](Index::get) with the same arguments would be
    /// non-empty; short-circuits instead of materializing results.
    fn check(&self, pattern: &Pattern, snapshot: Snapshot) -> bool;
}

/// Reference list-backed index.
///
/// Holds the full change log in insertion order; every read is a single
/// linear scan. Counts are *not* netted here: a change is admissible at a
/// snapshot regardless of later retractions, which makes this backend a
/// structural shape-of-match reference. Callers needing multiplicity-aware
/// truth should prefer [`crate::HashIndex`].
#[derive(Debug, Clone, Default)]
pub struct ListIndex {
    changes: Vec<Change>,
}

impl ListIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of changes inserted.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// All recorded changes, in insertion order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }
}

impl Index for ListIndex {
    fn insert(&mut self, change: Change) {
        self.changes.push(change);
    }

    fn propose(&self, proposal: &mut Proposal, pattern: &Pattern, snapshot: Snapshot) {
        proposal.reset();

        let for_field = PROPOSE_PRIORITY
            .into_iter()
            .find(|kind| pattern.field(*kind) == ResolvedField::Unbound);

        let Some(kind) = for_field else {
            // Nothing left to bind: the pattern is either already satisfied
            // or can never match.
            if self.check(pattern, snapshot) {
                proposal.skip = true;
            } else {
                proposal.cardinality = Some(0);
            }
            return;
        };

        proposal.bound_fields.push(kind);
        let mut seen = FxHashSet::default();
        for change in &self.changes {
            if pattern.matches(change) && snapshot.admits(change.transaction, change.round) {
                let candidate = change.field(kind);
                if seen.insert(candidate) {
                    proposal.candidates.push(candidate);
                }
            }
        }
        proposal.cardinality = Some(proposal.candidates.len());
    }

    fn resolve_proposal(&self, proposal: &Proposal) -> Vec<Row> {
        proposal
            .candidates
            .iter()
            .map(|&id| Row::from_slice(&[id]))
            .collect()
    }

    fn get(&self, pattern: &Pattern, snapshot: Snapshot) -> Vec<Eavn> {
        self.changes
            .iter()
            .filter(|change| {
                pattern.matches(change) && snapshot.admits(change.transaction, change.round)
            })
            .map(Change::eavn)
            .collect()
    }

    fn check(&self, pattern: &Pattern, snapshot: Snapshot) -> bool {
        self.changes.iter().any(|change| {
            pattern.matches(change) && snapshot.admits(change.transaction, change.round)
        })
    }
}

/// Placeholder backend with no behavior.
///
/// Kept as an extension point; a planner must never treat its answers as
/// authoritative, and [`crate::StoreBuilder`] refuses to select it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixIndex;

impl MatrixIndex {
    pub fn new() -> Self {
        Self
    }
}

impl Index for MatrixIndex {
    fn insert(&mut self, _change: Change) {}

    fn propose(&self, proposal: &mut Proposal, _pattern: &Pattern, _snapshot: Snapshot) {
        proposal.reset();
    }

    fn resolve_proposal(&self, _proposal: &Proposal) -> Vec<Row> {
        Vec::new()
    }

    fn get(&self, _pattern: &Pattern, _snapshot: Snapshot) -> Vec<Eavn> {
        Vec::new()
    }

    fn check(&self, _pattern: &Pattern, _snapshot: Snapshot) -> bool {
        false
    }
}
