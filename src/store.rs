//! FactStore: one index per named relation
//!
//! The driver feeds committed changes into the store, which routes each to
//! the index of its relation (created on first insert). Reads against a
//! relation with no index return empty results, never an error.

use crate::builder::StoreBuilder;
use crate::error::{FactumError, Result};
use crate::hash_index::HashIndex;
use crate::index::{Index, ListIndex, MatrixIndex, Proposal, Row};
use crate::temporal::Snapshot;
use crate::types::{Change, Config, Eavn, IndexBackend, Pattern, StoreStats};
use rustc_hash::FxHashMap;

const MAX_RELATION_NAME_LEN: usize = 255;

/// An embedded bitemporal fact store.
///
/// Owns one index per logical relation; all indexes in a store use the
/// backend named by its [`Config`]. Inserts apply in call order, and reads
/// observe every previously applied insert. The `&mut self` / `&self` split
/// enforces the single-writer model between transaction boundaries.
pub struct FactStore {
    relations: FxHashMap<String, Box<dyn Index>>,
    config: Config,
    change_count: usize,
}

impl FactStore {
    /// Create a store with the default configuration (hash backend).
    pub fn new() -> Self {
        Self {
            relations: FxHashMap::default(),
            config: Config::default(),
            change_count: 0,
        }
    }

    /// Create a store with the given configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            relations: FxHashMap::default(),
            config,
            change_count: 0,
        })
    }

    /// Start building a store with custom settings.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Append a fact delta to the named relation, creating its index on
    /// first use.
    pub fn insert(&mut self, relation: &str, change: Change) -> Result<()> {
        validate_relation_name(relation)?;

        if change.count == 0 && self.config.warn_on_zero_count {
            log::warn!("zero-count change inserted into relation '{relation}': {change:?}");
        }

        let backend = self.config.backend;
        let index = self
            .relations
            .entry(relation.to_string())
            .or_insert_with(|| {
                log::debug!("creating {} index for relation '{relation}'", backend.as_str());
                match backend {
                    IndexBackend::List => Box::new(ListIndex::new()) as Box<dyn Index>,
                    IndexBackend::Hash => Box::new(HashIndex::new()),
                    // Rejected by Config::validate; kept so the match stays
                    // exhaustive if a backend is ever added.
                    IndexBackend::Matrix => Box::new(MatrixIndex::new()),
                }
            });

        index.insert(change);
        self.change_count += 1;
        Ok(())
    }

    /// Propose the next binding for a pattern over the named relation.
    ///
    /// An unknown relation is a confirmed-absent pattern: cardinality 0.
    pub fn propose(
        &self,
        relation: &str,
        proposal: &mut Proposal,
        pattern: &Pattern,
        snapshot: Snapshot,
    ) {
        match self.relations.get(relation) {
            Some(index) => index.propose(proposal, pattern, snapshot),
            None => {
                proposal.reset();
                proposal.cardinality = Some(0);
            }
        }
    }

    /// Resolve a proposal produced by [`propose`](FactStore::propose) on the
    /// same relation.
    pub fn resolve_proposal(&self, relation: &str, proposal: &Proposal) -> Vec<Row> {
        match self.relations.get(relation) {
            Some(index) => index.resolve_proposal(proposal),
            None => Vec::new(),
        }
    }

    /// Enumerate matching, temporally-visible facts in the named relation.
    pub fn get(&self, relation: &str, pattern: &Pattern, snapshot: Snapshot) -> Vec<Eavn> {
        match self.relations.get(relation) {
            Some(index) => index.get(pattern, snapshot),
            None => Vec::new(),
        }
    }

    /// Boolean membership over the named relation.
    pub fn check(&self, relation: &str, pattern: &Pattern, snapshot: Snapshot) -> bool {
        match self.relations.get(relation) {
            Some(index) => index.check(pattern, snapshot),
            None => false,
        }
    }

    /// Whether the named relation has received any change.
    pub fn contains_relation(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    /// Names of all relations with an index, in arbitrary order.
    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    /// Store-wide statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            relation_count: self.relations.len(),
            change_count: self.change_count,
        }
    }
}

impl Default for FactStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_relation_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FactumError::InvalidRelationName(
            "relation name cannot be empty".into(),
        ));
    }
    if name.contains('\0') {
        return Err(FactumError::InvalidRelationName(
            "relation name cannot contain null bytes".into(),
        ));
    }
    if name.len() > MAX_RELATION_NAME_LEN {
        return Err(FactumError::InvalidRelationName(format!(
            "relation name cannot exceed {MAX_RELATION_NAME_LEN} bytes"
        )));
    }
    Ok(())
}
