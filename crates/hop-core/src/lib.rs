//! Frecency tracking and jump resolution for visited directories.
//!
//! [`PersistentStore`] owns the on-disk table, [`FrecencyIndex`] ranks it in
//! memory, and [`Resolver`] answers read-only queries against the index.

pub mod atomic;
pub mod error;
pub mod index;
pub mod matcher;
pub mod path;
pub mod record;
pub mod resolver;
pub mod store;

pub use atomic::atomic_replace;
pub use error::{HopError, HopResult};
pub use index::{Candidate, FrecencyIndex, WeightSettings};
pub use matcher::{CaseMode, Query};
pub use path::{basename, normalize_path, PathFilter};
pub use record::{parse_records, render_records, Records, VisitRecord};
pub use resolver::{ResolveOptions, Resolver};
pub use store::PersistentStore;
