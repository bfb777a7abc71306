//! Core types for fact storage and pattern queries
//!
//! This module provides the identifier, fact, and pattern types shared by
//! every index backend, plus the serializable store configuration.

use crate::error::{FactumError, Result};
use serde::{Deserialize, Serialize};

/// Opaque identifier naming an entity, attribute, value, or node.
///
/// Identifiers carry no meaning beyond identity and ordering; interning
/// strings or values down to `Id`s is the driver's job.
pub type Id = u64;

/// Names one of the four fields of an EAVN fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Entity,
    Attribute,
    Value,
    Node,
}

/// Resolution state of a single query-side field.
///
/// `Unbound` means "enumerate the distinct values this field can take",
/// `Wildcard` means "accept any value without binding it", and `Bound`
/// requires exact equality. Keeping the three states as an explicit enum
/// (rather than sentinel identifiers) forces every call site to handle
/// each case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedField {
    Unbound,
    Wildcard,
    Bound(Id),
}

impl ResolvedField {
    /// True iff this field is bound to a concrete identifier.
    pub fn is_bound(&self) -> bool {
        matches!(self, ResolvedField::Bound(_))
    }

    /// The bound identifier, if any.
    pub fn as_bound(&self) -> Option<Id> {
        match self {
            ResolvedField::Bound(id) => Some(*id),
            ResolvedField::Unbound | ResolvedField::Wildcard => None,
        }
    }

    /// Whether a concrete identifier satisfies this field.
    ///
    /// Unbound and wildcard fields accept anything; a bound field requires
    /// equality.
    pub fn matches(&self, id: Id) -> bool {
        match self {
            ResolvedField::Bound(bound) => *bound == id,
            ResolvedField::Unbound | ResolvedField::Wildcard => true,
        }
    }
}

impl From<Id> for ResolvedField {
    fn from(id: Id) -> Self {
        ResolvedField::Bound(id)
    }
}

/// A single fact delta: the atomic, append-only unit of state change.
///
/// A `Change` is never edited or removed once inserted; a retraction is a
/// new `Change` with a negative `count` for the same `(e, a, v, n)`. The
/// net sum of visible counts determines whether the fact is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub e: Id,
    pub a: Id,
    pub v: Id,
    pub n: Id,
    /// Externally-visible batch boundary; monotonically non-decreasing
    /// across the driver's feed.
    pub transaction: u64,
    /// Fixpoint-iteration step within a transaction.
    pub round: u64,
    /// Signed multiplicity: positive asserts, negative retracts.
    pub count: i64,
}

impl Change {
    #[allow(clippy::too_many_arguments)]
    pub fn new(e: Id, a: Id, v: Id, n: Id, transaction: u64, round: u64, count: i64) -> Self {
        Self {
            e,
            a,
            v,
            n,
            transaction,
            round,
            count,
        }
    }

    /// The identifier stored in the given field.
    pub fn field(&self, kind: FieldKind) -> Id {
        match kind {
            FieldKind::Entity => self.e,
            FieldKind::Attribute => self.a,
            FieldKind::Value => self.v,
            FieldKind::Node => self.n,
        }
    }

    /// The fact quadruple this change asserts or retracts.
    pub fn eavn(&self) -> Eavn {
        Eavn {
            e: self.e,
            a: self.a,
            v: self.v,
            n: self.n,
        }
    }
}

/// A fully resolved fact quadruple with no temporal or multiplicity
/// information. This is the shape enumeration queries return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Eavn {
    pub e: Id,
    pub a: Id,
    pub v: Id,
    pub n: Id,
}

impl Eavn {
    pub fn new(e: Id, a: Id, v: Id, n: Id) -> Self {
        Self { e, a, v, n }
    }
}

/// A query-side pattern: one [`ResolvedField`] per fact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub e: ResolvedField,
    pub a: ResolvedField,
    pub v: ResolvedField,
    pub n: ResolvedField,
}

impl Pattern {
    pub fn new(e: ResolvedField, a: ResolvedField, v: ResolvedField, n: ResolvedField) -> Self {
        Self { e, a, v, n }
    }

    /// Pattern binding all four fields to concrete identifiers.
    pub fn fully_bound(e: Id, a: Id, v: Id, n: Id) -> Self {
        Self {
            e: ResolvedField::Bound(e),
            a: ResolvedField::Bound(a),
            v: ResolvedField::Bound(v),
            n: ResolvedField::Bound(n),
        }
    }

    /// Pattern leaving every field unbound.
    pub fn all_unbound() -> Self {
        Self {
            e: ResolvedField::Unbound,
            a: ResolvedField::Unbound,
            v: ResolvedField::Unbound,
            n: ResolvedField::Unbound,
        }
    }

    /// The resolution state of the given field.
    pub fn field(&self, kind: FieldKind) -> ResolvedField {
        match kind {
            FieldKind::Entity => self.e,
            FieldKind::Attribute => self.a,
            FieldKind::Value => self.v,
            FieldKind::Node => self.n,
        }
    }

    /// Whether a change's fields satisfy every bound field of this pattern.
    ///
    /// Temporal visibility is a separate concern; see
    /// [`crate::Snapshot::admits`].
    pub fn matches(&self, change: &Change) -> bool {
        self.e.matches(change.e)
            && self.a.matches(change.a)
            && self.v.matches(change.v)
            && self.n.matches(change.n)
    }
}

/// Index backend selection for a [`crate::FactStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    /// Linear-scan reference backend; useful for small fact sets and as a
    /// correctness baseline.
    List,
    /// Bitemporal hash backend with entity-major and attribute-major
    /// orderings (recommended default).
    #[default]
    Hash,
    /// Placeholder backend with no behavior; cannot be selected.
    Matrix,
}

impl IndexBackend {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexBackend::List => "list",
            IndexBackend::Hash => "hash",
            IndexBackend::Matrix => "matrix",
        }
    }
}

/// Store configuration
///
/// Designed to be easily serializable and loadable from JSON while keeping
/// complexity minimal.
///
/// # Example
///
/// ```rust
/// use factum::{Config, IndexBackend};
///
/// let config = Config::default();
/// assert_eq!(config.backend, IndexBackend::Hash);
///
/// let json = r#"{ "backend": "list" }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.backend, IndexBackend::List);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which index backend each relation gets.
    #[serde(default)]
    pub backend: IndexBackend,

    /// Log a warning when a zero-count change is inserted. A no-op delta is
    /// almost always a driver bug.
    #[serde(default = "Config::default_warn_on_zero_count")]
    pub warn_on_zero_count: bool,
}

impl Config {
    const fn default_warn_on_zero_count() -> bool {
        true
    }

    pub fn with_backend(backend: IndexBackend) -> Self {
        Self {
            backend,
            warn_on_zero_count: Self::default_warn_on_zero_count(),
        }
    }

    pub fn with_warn_on_zero_count(mut self, warn: bool) -> Self {
        self.warn_on_zero_count = warn;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.backend == IndexBackend::Matrix {
            return Err(FactumError::UnsupportedBackend(
                self.backend.as_str().to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            warn_on_zero_count: Self::default_warn_on_zero_count(),
        }
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of relations with an index.
    pub relation_count: usize,
    /// Total number of changes inserted across all relations.
    pub change_count: usize,
}
