//! Normalization and reconciliation of scraped repository metadata.
//!
//! ```text
//! RawRecord ──canonicalize(now)──▶ CanonicalRecord ──Reconciler──▶ unique by repo
//!              ├─ normalize_timestamp                               │
//!              └─ normalize_star                          filter_records(DirtyList)
//! ```
//!
//! Everything here is pure and synchronous. The current instant is always
//! an explicit argument, never read from the clock.

mod canonical;
mod filter;
mod reconcile;
mod star;
mod timestamp;

pub use canonical::{MissingRepoKey, canonicalize};
pub use filter::{DirtyList, RepoKeyed, filter_records};
pub use reconcile::{ReconcileStats, Reconciler, reconcile};
pub use star::{normalize_star, normalize_star_text};
pub use timestamp::{epoch_millis, normalize_timestamp};
