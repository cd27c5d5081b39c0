//! Consumer-side hand-off.
//!
//! The pass itself never touches host objects; everything presentation
//! related funnels through [`OutputConsumer`]. [`handoff`] fixes the
//! ordering contract: detached collection objects first, then immediate
//! clears, then the new outputs (instancer-style last, since they reference
//! the presentation objects the others build), and deferred clears strictly
//! at the end.

use crate::output::{Output, PresentationSlot};
use crate::types::OutputType;
use crate::reconcile::ReconcileOutcome;

/// What the host does with reconciled outputs.
pub trait OutputConsumer {
  /// A reconciled output, reused or new. The consumer builds or refreshes
  /// its presentation objects and records handles in `output.objects`.
  fn on_output_ready(&mut self, output: &mut Output);

  /// A stale output. The consumer tears its presentation objects down.
  fn on_output_cleared(&mut self, output: Output);

  /// A presentation object detached from a discarded collection output
  /// before its owner was cleared.
  fn on_presentation_detached(&mut self, slot: PresentationSlot) {
    let _ = slot;
  }
}

/// Consumer that drops everything. Useful for passes run only for their
/// outcome bookkeeping.
pub struct NullConsumer;

impl OutputConsumer for NullConsumer {
  fn on_output_ready(&mut self, _output: &mut Output) {}

  fn on_output_cleared(&mut self, _output: Output) {}
}

fn builds_from_presentation(output_type: OutputType) -> bool {
  matches!(
    output_type,
    OutputType::Instancer | OutputType::GeometryCollection
  )
}

/// Hands one pass outcome to the consumer in dependency order. The clear
/// lists and detached slots are drained; the outputs stay in the outcome
/// for the next pass.
pub fn handoff<C: OutputConsumer>(outcome: &mut ReconcileOutcome, consumer: &mut C) {
  for slot in outcome.detached_collections.drain(..) {
    consumer.on_presentation_detached(slot);
  }

  for output in outcome.clear_now.drain(..) {
    consumer.on_output_cleared(output);
  }

  for output in outcome
    .outputs
    .iter_mut()
    .filter(|output| !builds_from_presentation(output.output_type))
  {
    consumer.on_output_ready(output);
  }
  for output in outcome
    .outputs
    .iter_mut()
    .filter(|output| builds_from_presentation(output.output_type))
  {
    consumer.on_output_ready(output);
  }

  for output in outcome.clear_deferred.drain(..) {
    consumer.on_output_cleared(output);
  }

  for output in &mut outcome.outputs {
    output.updating = false;
  }
}

#[cfg(test)]
#[path = "presentation_test.rs"]
mod presentation_test;
