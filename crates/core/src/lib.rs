//! Daybook core: the offline-tolerant engine behind a multi-domain
//! personal productivity app (finance, workout, planner).
//!
//! Two coupled engines over one event log:
//!
//! - the **sync engine** (write path): optimistic local apply, primary +
//!   fallback remote commit, temporary → canonical identity
//!   reconciliation, rollback on total failure, and reload-based eventual
//!   consistency driven by remote change notifications;
//! - the **aggregation engine** (read path): budgets, goal progress,
//!   streaks and chart series recomputed from the raw event log against
//!   period windows, never trusted from stored counters.
//!
//! The crate is a library consumed by presentation code. Collaborators
//! (remote store, change feed, durable mirror, principal provider) are
//! trait seams injected at construction, so tests substitute fakes for all
//! of them.

pub mod aggregate;
pub mod cache;
pub mod errors;
pub mod finance;
pub mod ids;
pub mod mirror;
pub mod planner;
pub mod records;
pub mod session;
pub mod store;
pub mod sync;
pub mod workout;

pub use errors::{CoreError, MutationOp, Result};
pub use ids::{EntityId, NaturalKey, TEMP_ID_PREFIX};
pub use records::{EntityKind, Record};
pub use session::Daybook;
pub use store::{ChangeFeed, ChangeNotice, PrincipalProvider, RemoteStore};
pub use sync::{RemoteContext, SyncConfig};
