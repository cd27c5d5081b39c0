//! Reconciliation pass
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌───────────┐   ┌─────────────┐   ┌───────────┐
//! │ Query     ├──►│ Descriptor ├──►│ Classifier├──►│ Eligibility ├──►│ Matcher   │
//! │ Facade    │   │ Builder    │   │           │   │ Filter      │   │/Reconciler│
//! └───────────┘   └────────────┘   └───────────┘   └─────────────┘   └─────┬─────┘
//!                                                                          │
//!                                Volume parts detour through batching ─────┤
//!                                                                          ▼
//!                                 ┌───────────┐   ┌───────────┐   ┌─────────────┐
//!                                 │ Lifecycle │◄──┤ Socket    │◄──┤ Volume late │
//!                                 │ Manager   │   │ Propagator│   │ resolution  │
//!                                 └───────────┘   └───────────┘   └─────────────┘
//! ```
//!
//! One pass consumes the previous cook's outputs and the current cooked
//! scene, and produces the reconciled output set plus an explicit two-phase
//! stale partition (clear now / clear after builder hand-off).

pub mod collections;
pub mod lifecycle;
pub mod matcher;
pub mod process;
pub mod sockets;
pub mod volumes;

pub use lifecycle::StalePartition;
pub use process::{reconcile, reconcile_timed, ReconcileError, ReconcileOutcome, ReconcileStats};
