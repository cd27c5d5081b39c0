//! cook_recon - Engine/host independent cook-output reconciliation
//!
//! This crate reconciles the parts produced by a procedural cook with the
//! outputs built from the previous cook, so host-side objects keep a stable
//! identity across re-cooks. It talks to the cooking engine only through the
//! [`query::CookQuery`] facade and to the host only through
//! [`presentation::OutputConsumer`], so it carries no engine or host
//! dependencies.
//!
//! # Features
//!
//! - **Stable identity**: parts are matched to previous outputs by node-id
//!   key with a name fallback, so session restarts do not churn objects
//! - **Classification**: raw part/container signals resolve to mesh, curve,
//!   instancer or volume kinds, with attribute-instancer detection
//! - **Heightfield batching**: volume layers of one terrain tile coalesce
//!   into one output, with late resolution for layers that arrive first
//! - **Two-phase clearing**: stale terrain outputs clear only after the new
//!   outputs were handed to the consumer
//!
//! # Example
//!
//! ```ignore
//! use cook_recon::{reconcile, handoff, ReconcileConfig};
//!
//! let config = ReconcileConfig::default();
//! let mut outcome = reconcile(&query, &config, previous_outputs, &cook_counts)?;
//!
//! handoff(&mut outcome, &mut consumer);
//!
//! // Feed back into the next pass
//! let previous_outputs = outcome.outputs;
//! let cook_counts = outcome.cook_counts;
//! ```

pub mod classify;
pub mod config;
pub mod descriptor;
pub mod output;
pub mod presentation;
pub mod query;
pub mod reconcile;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used items
pub use config::ReconcileConfig;
pub use descriptor::PartDescriptor;
pub use output::{Output, OutputSet, PresentationHandle, PresentationSlot, SplitKey};
pub use presentation::{handoff, NullConsumer, OutputConsumer};
pub use query::{CookQuery, QueryError};
pub use reconcile::{
  reconcile, reconcile_timed, ReconcileError, ReconcileOutcome, ReconcileStats, StalePartition,
};
pub use types::{
  AttributeOwner, InstancerKind, NodeId, OutputId, OutputType, PartId, PartKind, RawGeoType,
  RawPartType,
};
