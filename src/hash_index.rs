//! Bitemporal hash-backed index
//!
//! The production backend: two synchronized nested-map orderings over the
//! same change set, with a compact temporal delta log at every leaf.
//!
//! - entity-major:    entity → attribute → value → [`DeltaLog`]
//! - attribute-major: attribute → value → entity → [`DeltaLog`]
//!
//! [`Index::insert`] appends one delta to the corresponding leaf in *both*
//! orderings before returning, so no read can observe one view updated and
//! the other not. Reads walk whichever ordering starts with a bound field;
//! the attribute-major ordering doubles as the source for the default
//! "propose attribute first" heuristic when nothing is bound.

use crate::index::{Index, Proposal, Row};
use crate::temporal::{Delta, DeltaLog, Snapshot};
use crate::types::{Change, Eavn, FieldKind, Id, Pattern, ResolvedField};
use rustc_hash::FxHashMap;

type LeafMap = FxHashMap<Id, DeltaLog>;
type InnerMap = FxHashMap<Id, LeafMap>;
type OuterMap = FxHashMap<Id, InnerMap>;

/// Hash-backed bitemporal index over EAVN facts.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    /// entity → attribute → value → delta log
    eav: OuterMap,
    /// attribute → value → entity → delta log
    ave: OuterMap,
    change_count: usize,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of changes inserted.
    pub fn len(&self) -> usize {
        self.change_count
    }

    pub fn is_empty(&self) -> bool {
        self.change_count == 0
    }

    /// Number of distinct attributes seen so far.
    pub fn attribute_count(&self) -> usize {
        self.ave.len()
    }

    /// Walk one ordering for propose. `outer` is the bound first-level key;
    /// `b` and `c` are the second- and third-level pattern fields, named by
    /// `field_b`/`field_c`. The first level found not bound is proposed with
    /// the current sub-map's keys as candidates; when all three levels are
    /// bound the leaf's per-node liveness under `node` decides between skip
    /// and a dead branch.
    #[allow(clippy::too_many_arguments)]
    fn walk_propose(
        proposal: &mut Proposal,
        ordering: &OuterMap,
        outer: Id,
        b: ResolvedField,
        c: ResolvedField,
        node: ResolvedField,
        field_b: FieldKind,
        field_c: FieldKind,
        snapshot: Snapshot,
    ) {
        let Some(b_map) = ordering.get(&outer) else {
            proposal.cardinality = Some(0);
            return;
        };

        match b {
            ResolvedField::Bound(b_id) => {
                let Some(c_map) = b_map.get(&b_id) else {
                    proposal.cardinality = Some(0);
                    return;
                };
                match c {
                    ResolvedField::Bound(c_id) => {
                        let live = c_map
                            .get(&c_id)
                            .is_some_and(|leaf| leaf.is_live(node, snapshot));
                        if live {
                            proposal.skip = true;
                        } else {
                            proposal.cardinality = Some(0);
                        }
                    }
                    ResolvedField::Unbound | ResolvedField::Wildcard => {
                        proposal.bound_fields.push(field_c);
                        proposal.candidates.extend(c_map.keys().copied());
                        proposal.cardinality = Some(proposal.candidates.len());
                    }
                }
            }
            ResolvedField::Unbound | ResolvedField::Wildcard => {
                proposal.bound_fields.push(field_b);
                proposal.candidates.extend(b_map.keys().copied());
                proposal.cardinality = Some(proposal.candidates.len());
            }
        }
    }

    /// Walk one ordering for check, short-circuiting: a non-bound level
    /// tries each child in turn and succeeds on the first one whose leaf
    /// holds a live node under `node`.
    fn walk_check(
        ordering: &OuterMap,
        outer: Id,
        b: ResolvedField,
        c: ResolvedField,
        node: ResolvedField,
        snapshot: Snapshot,
    ) -> bool {
        let Some(b_map) = ordering.get(&outer) else {
            return false;
        };
        match b {
            ResolvedField::Bound(b_id) => b_map
                .get(&b_id)
                .is_some_and(|c_map| Self::check_leaf_level(c_map, c, node, snapshot)),
            ResolvedField::Unbound | ResolvedField::Wildcard => b_map
                .values()
                .any(|c_map| Self::check_leaf_level(c_map, c, node, snapshot)),
        }
    }

    fn check_leaf_level(
        c_map: &LeafMap,
        c: ResolvedField,
        node: ResolvedField,
        snapshot: Snapshot,
    ) -> bool {
        match c {
            ResolvedField::Bound(c_id) => c_map
                .get(&c_id)
                .is_some_and(|leaf| leaf.is_live(node, snapshot)),
            ResolvedField::Unbound | ResolvedField::Wildcard => {
                c_map.values().any(|leaf| leaf.is_live(node, snapshot))
            }
        }
    }
}

impl Index for HashIndex {
    fn insert(&mut self, change: Change) {
        let delta = Delta {
            node: change.n,
            transaction: change.transaction,
            round: change.round,
            count: change.count,
        };

        self.eav
            .entry(change.e)
            .or_default()
            .entry(change.a)
            .or_default()
            .entry(change.v)
            .or_default()
            .push(delta);

        self.ave
            .entry(change.a)
            .or_default()
            .entry(change.v)
            .or_default()
            .entry(change.e)
            .or_default()
            .push(delta);

        self.change_count += 1;
    }

    fn propose(&self, proposal: &mut Proposal, pattern: &Pattern, snapshot: Snapshot) {
        proposal.reset();

        if let Some(e) = pattern.e.as_bound() {
            Self::walk_propose(
                proposal,
                &self.eav,
                e,
                pattern.a,
                pattern.v,
                pattern.n,
                FieldKind::Attribute,
                FieldKind::Value,
                snapshot,
            );
        } else if let Some(a) = pattern.a.as_bound() {
            Self::walk_propose(
                proposal,
                &self.ave,
                a,
                pattern.v,
                pattern.e,
                pattern.n,
                FieldKind::Value,
                FieldKind::Entity,
                snapshot,
            );
        } else {
            // Nothing bound: propose the attribute, which typically has the
            // smallest domain.
            proposal.bound_fields.push(FieldKind::Attribute);
            proposal.candidates.extend(self.ave.keys().copied());
            proposal.cardinality = Some(proposal.candidates.len());
        }
    }

    fn resolve_proposal(&self, proposal: &Proposal) -> Vec<Row> {
        proposal
            .candidates
            .iter()
            .map(|&id| Row::from_slice(&[id]))
            .collect()
    }

    fn get(&self, pattern: &Pattern, snapshot: Snapshot) -> Vec<Eavn> {
        // Full enumeration walks the entity-major ordering and nets counts
        // per node within each leaf. Linear in total fact count; the planner
        // is expected to lean on propose/check instead where possible.
        let mut results = Vec::new();
        let mut by_node: FxHashMap<Id, i64> = FxHashMap::default();

        for (&e, a_map) in &self.eav {
            if !pattern.e.matches(e) {
                continue;
            }
            for (&a, v_map) in a_map {
                if !pattern.a.matches(a) {
                    continue;
                }
                for (&v, leaf) in v_map {
                    if !pattern.v.matches(v) {
                        continue;
                    }
                    by_node.clear();
                    for delta in leaf.deltas() {
                        if snapshot.admits(delta.transaction, delta.round) {
                            *by_node.entry(delta.node).or_insert(0) += delta.count;
                        }
                    }
                    for (&n, &total) in &by_node {
                        if total > 0 && pattern.n.matches(n) {
                            results.push(Eavn::new(e, a, v, n));
                        }
                    }
                }
            }
        }
        results
    }

    fn check(&self, pattern: &Pattern, snapshot: Snapshot) -> bool {
        if let Some(e) = pattern.e.as_bound() {
            Self::walk_check(&self.eav, e, pattern.a, pattern.v, pattern.n, snapshot)
        } else if let Some(a) = pattern.a.as_bound() {
            Self::walk_check(&self.ave, a, pattern.v, pattern.e, pattern.n, snapshot)
        } else {
            self.ave.keys().any(|&a| {
                Self::walk_check(&self.ave, a, pattern.v, pattern.e, pattern.n, snapshot)
            })
        }
    }
}
