//! Embedded bitemporal EAVN fact index for incremental datalog-style query
//! engines.
//!
//! Facts are entity–attribute–value–node quadruples annotated with a
//! transaction, a round, and a signed count; retraction is a new change with
//! a negative count. Every read takes a [`Snapshot`] and sees exactly the
//! changes visible at that point in bitemporal history.
//!
//! ```rust
//! use factum::{Change, FactStore, Pattern, Snapshot};
//!
//! let mut store = FactStore::new();
//! store.insert("person_name", Change::new(1, 10, 100, 0, 1, 0, 1))?;
//!
//! let pattern = Pattern::fully_bound(1, 10, 100, 0);
//! assert!(store.check("person_name", &pattern, Snapshot::LATEST));
//! assert!(!store.check("person_name", &pattern, Snapshot::new(0, 0)));
//! # Ok::<(), factum::FactumError>(())
//! ```

pub mod builder;
pub mod error;
pub mod hash_index;
pub mod index;
pub mod store;
pub mod temporal;
pub mod types;

pub use builder::StoreBuilder;
pub use error::{FactumError, Result};
pub use hash_index::HashIndex;
pub use index::{Index, ListIndex, MatrixIndex, Proposal, Row};
pub use store::FactStore;
pub use temporal::{Delta, DeltaLog, Snapshot};
pub use types::{
    Change, Config, Eavn, FieldKind, Id, IndexBackend, Pattern, ResolvedField, StoreStats,
};

pub type Factum = FactStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{FactStore, Factum, Result, StoreBuilder};

    pub use crate::{Change, Eavn, FieldKind, Id, Pattern, ResolvedField, Snapshot};

    pub use crate::{Index, Proposal, Row};

    pub use crate::{Config, IndexBackend};
}
