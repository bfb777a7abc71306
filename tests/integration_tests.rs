use factum::{
    Change, Config, Eavn, FactStore, FieldKind, HashIndex, Id, Index, IndexBackend, ListIndex,
    Pattern, Proposal, ResolvedField, Snapshot,
};
use std::collections::BTreeSet;

/// Opt-in log capture for `RUST_LOG=factum=debug` runs.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic xorshift generator so failures reproduce exactly.
struct Rng(u64);

impl Rng {
    fn next(&mut self, bound: u64) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x % bound
    }
}

/// A small additive workload over a handful of entities and attributes.
fn additive_workload() -> Vec<Change> {
    let mut rng = Rng(0x5eed);
    let mut changes = Vec::new();
    for transaction in 1..=8u64 {
        for _ in 0..16 {
            changes.push(Change::new(
                rng.next(5) + 1,
                rng.next(3) + 10,
                rng.next(6) + 100,
                rng.next(2),
                transaction,
                rng.next(3),
                1,
            ));
        }
    }
    changes
}

fn pattern_grid() -> Vec<Pattern> {
    use ResolvedField::{Bound, Unbound, Wildcard};
    let mut patterns = vec![Pattern::all_unbound()];
    for e in [Unbound, Wildcard, Bound(1), Bound(3), Bound(99)] {
        for a in [Unbound, Wildcard, Bound(10), Bound(12)] {
            for v in [Unbound, Wildcard, Bound(100), Bound(104), Bound(999)] {
                for n in [Unbound, Wildcard, Bound(0), Bound(1), Bound(9)] {
                    patterns.push(Pattern::new(e, a, v, n));
                }
            }
        }
    }
    patterns
}

/// The additive workload plus retractions of every third change, issued in
/// later transactions at varying rounds. Leaves where several nodes share an
/// `(entity, attribute, value)` triple end up with asymmetric histories.
fn workload_with_retractions() -> Vec<Change> {
    let mut rng = Rng(0xfeed);
    let mut changes = additive_workload();
    let retractions: Vec<Change> = changes
        .iter()
        .step_by(3)
        .map(|change| {
            Change::new(
                change.e,
                change.a,
                change.v,
                change.n,
                9 + rng.next(2),
                rng.next(3),
                -1,
            )
        })
        .collect();
    changes.extend(retractions);
    changes
}

fn snapshots() -> Vec<Snapshot> {
    vec![
        Snapshot::new(0, 0),
        Snapshot::new(1, 0),
        Snapshot::new(3, 1),
        Snapshot::new(5, 2),
        Snapshot::new(8, 0),
        Snapshot::LATEST,
    ]
}

fn eavn_set(results: Vec<Eavn>) -> BTreeSet<Eavn> {
    results.into_iter().collect()
}

#[test]
fn test_cross_backend_get_equivalence() {
    let changes = additive_workload();

    let mut list = ListIndex::new();
    let mut hash = HashIndex::new();
    for change in &changes {
        list.insert(*change);
        hash.insert(*change);
    }

    for pattern in pattern_grid() {
        for snapshot in snapshots() {
            assert_eq!(
                eavn_set(list.get(&pattern, snapshot)),
                eavn_set(hash.get(&pattern, snapshot)),
                "pattern {pattern:?} at {snapshot:?}"
            );
        }
    }
}

#[test]
fn test_check_get_consistency_both_backends() {
    let changes = additive_workload();

    let mut list = ListIndex::new();
    let mut hash = HashIndex::new();
    for change in &changes {
        list.insert(*change);
        hash.insert(*change);
    }

    for pattern in pattern_grid() {
        for snapshot in snapshots() {
            assert_eq!(
                list.check(&pattern, snapshot),
                !list.get(&pattern, snapshot).is_empty(),
                "list backend: pattern {pattern:?} at {snapshot:?}"
            );
            assert_eq!(
                hash.check(&pattern, snapshot),
                !hash.get(&pattern, snapshot).is_empty(),
                "hash backend: pattern {pattern:?} at {snapshot:?}"
            );
        }
    }
}

#[test]
fn test_check_get_consistency_under_retraction() {
    let mut hash = HashIndex::new();
    for change in workload_with_retractions() {
        hash.insert(change);
    }

    let mut snapshots = snapshots();
    snapshots.extend([Snapshot::new(9, 0), Snapshot::new(9, 2), Snapshot::new(10, 1)]);

    // Retractions land on individual nodes, so a leaf can hold one live and
    // one retracted node at the same snapshot; check must still agree with
    // get for every node binding.
    for pattern in pattern_grid() {
        for snapshot in &snapshots {
            assert_eq!(
                hash.check(&pattern, *snapshot),
                !hash.get(&pattern, *snapshot).is_empty(),
                "pattern {pattern:?} at {snapshot:?}"
            );
        }
    }
}

#[test]
fn test_proposal_cardinality_candidates_consistency() {
    let changes = additive_workload();

    let mut list = ListIndex::new();
    let mut hash = HashIndex::new();
    for change in &changes {
        list.insert(*change);
        hash.insert(*change);
    }

    let mut proposal = Proposal::new();
    for pattern in pattern_grid() {
        for snapshot in snapshots() {
            for index in [&list as &dyn Index, &hash as &dyn Index] {
                index.propose(&mut proposal, &pattern, snapshot);
                if proposal.skip {
                    continue;
                }
                let cardinality = proposal
                    .cardinality
                    .expect("propose must estimate or skip");
                assert_eq!(proposal.candidates.len(), cardinality);
                assert_eq!(index.resolve_proposal(&proposal).len(), cardinality);
                if cardinality > 0 {
                    assert_eq!(proposal.bound_fields.len(), 1);
                }
            }
        }
    }
}

#[test]
fn test_temporal_monotonicity() {
    let changes = additive_workload();
    let mut hash = HashIndex::new();
    for change in &changes {
        hash.insert(*change);
    }

    // Additive workload: once a fully-bound pattern turns live it must stay
    // live at every later snapshot.
    for change in &changes {
        let pattern = Pattern::fully_bound(change.e, change.a, change.v, change.n);
        let first = Snapshot::new(change.transaction, change.round);
        assert!(hash.check(&pattern, first));
        for later in [
            Snapshot::new(change.transaction + 1, change.round),
            Snapshot::new(change.transaction, change.round + 1),
            Snapshot::LATEST,
        ] {
            assert!(hash.check(&pattern, later), "regressed at {later:?}");
        }
    }
}

#[test]
fn test_retraction_scenario_end_to_end() {
    init_logging();
    let mut store = FactStore::new();
    // Identifier 10 stands in for the interned attribute "name",
    // 100 for the interned value "Alice".
    store
        .insert("person", Change::new(1, 10, 100, 0, 1, 0, 1))
        .unwrap();

    let pattern = Pattern::fully_bound(1, 10, 100, 0);
    assert!(store.check("person", &pattern, Snapshot::new(1, 0)));

    store
        .insert("person", Change::new(1, 10, 100, 0, 2, 0, -1))
        .unwrap();

    // Unaffected at the earlier snapshot, retracted at the later one.
    assert!(store.check("person", &pattern, Snapshot::new(1, 0)));
    assert!(!store.check("person", &pattern, Snapshot::new(2, 0)));
    assert!(store.get("person", &pattern, Snapshot::new(2, 0)).is_empty());
}

#[test]
fn test_boundary_snapshot_end_to_end() {
    let mut store = FactStore::new();
    store
        .insert("person", Change::new(1, 10, 100, 0, 5, 0, 1))
        .unwrap();

    let pattern = Pattern::fully_bound(1, 10, 100, 0);
    assert!(!store.check("person", &pattern, Snapshot::new(4, 0)));
    assert!(store.check("person", &pattern, Snapshot::new(5, 0)));
}

#[test]
fn test_unbound_field_enumeration_end_to_end() {
    let mut store = FactStore::new();
    // 10 = "name", 11 = "age".
    store
        .insert("person", Change::new(1, 10, 100, 0, 1, 0, 1))
        .unwrap();
    store
        .insert("person", Change::new(1, 11, 30, 0, 1, 0, 1))
        .unwrap();

    let mut proposal = Proposal::new();
    let pattern = Pattern::new(
        ResolvedField::Bound(1),
        ResolvedField::Unbound,
        ResolvedField::Wildcard,
        ResolvedField::Wildcard,
    );
    store.propose("person", &mut proposal, &pattern, Snapshot::LATEST);

    assert_eq!(proposal.bound_fields.as_slice(), &[FieldKind::Attribute]);
    assert_eq!(proposal.cardinality, Some(2));
    let candidates: BTreeSet<Id> = proposal.candidates.iter().copied().collect();
    assert_eq!(candidates, BTreeSet::from([10, 11]));
}

#[test]
fn test_zero_count_change_warns_and_stays_dead() {
    init_logging();
    let mut store = FactStore::new();

    // Goes through the warn path in FactStore::insert; visible with
    // RUST_LOG=factum=warn.
    store
        .insert("facts", Change::new(1, 10, 100, 0, 1, 0, 0))
        .unwrap();

    let pattern = Pattern::fully_bound(1, 10, 100, 0);
    assert!(!store.check("facts", &pattern, Snapshot::LATEST));
    assert_eq!(store.stats().change_count, 1);
}

#[test]
fn test_list_and_hash_stores_agree_on_workload() {
    init_logging();
    let changes = additive_workload();

    let mut hash_store = FactStore::new();
    let mut list_store = FactStore::builder()
        .config(Config::with_backend(IndexBackend::List))
        .build()
        .unwrap();
    for change in &changes {
        hash_store.insert("facts", *change).unwrap();
        list_store.insert("facts", *change).unwrap();
    }

    for pattern in pattern_grid() {
        assert_eq!(
            eavn_set(hash_store.get("facts", &pattern, Snapshot::LATEST)),
            eavn_set(list_store.get("facts", &pattern, Snapshot::LATEST)),
            "pattern {pattern:?}"
        );
    }
    assert_eq!(hash_store.stats().change_count, changes.len());
    assert_eq!(list_store.stats().change_count, changes.len());
}
