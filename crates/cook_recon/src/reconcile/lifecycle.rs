//! Stale output lifecycle.
//!
//! Outputs left in the previous set after matching are gone from the scene.
//! Most are cleared immediately; terrain outputs defer their clear until
//! after the new outputs were handed to the consumer, since landscape
//! rebuilds reuse the old tiles' resources.

use tracing::debug;

use crate::output::Output;

/// The two-phase partition of the outputs to clear.
#[derive(Debug, Default)]
pub struct StalePartition {
  /// Cleared before any new output is handed off.
  pub clear_now: Vec<Output>,
  /// Cleared strictly after every new output was handed off.
  pub clear_deferred: Vec<Output>,
}

/// Splits the unmatched previous outputs by their clear timing. The output
/// type driving the decision is the one computed on the previous pass.
pub fn partition_stale(previous: Vec<Output>) -> StalePartition {
  let mut partition = StalePartition::default();
  for output in previous {
    if output.defers_clear() {
      debug!(output = output.id.raw(), "deferring clear of stale terrain output");
      partition.clear_deferred.push(output);
    } else {
      debug!(output = output.id.raw(), output_type = ?output.output_type, "clearing stale output");
      partition.clear_now.push(output);
    }
  }
  partition
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;
