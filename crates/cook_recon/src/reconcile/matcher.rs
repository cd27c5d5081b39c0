//! Part-to-output matching.
//!
//! Every surviving part descriptor routes to exactly one output: either a
//! previous-cook output whose member list already contains an equivalent
//! part (the output and its presentation objects are reused), or a newly
//! created one. Volume parts have their own matching rules and detour
//! through [`super::volumes`].

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::config::ReconcileConfig;
use crate::descriptor::PartDescriptor;
use crate::output::{Output, OutputSet};
use crate::types::PartKind;

use super::volumes;

// ============================================================================
// Routing
// ============================================================================

/// Routes one eligible descriptor into the output set.
///
/// `found_tiles` carries the heightfield tile indices already claimed by a
/// new output for the current object, which drives the volume batching
/// decision. It must be scoped per object.
pub fn route_part(
  set: &mut OutputSet,
  descriptor: PartDescriptor,
  found_tiles: &mut FxHashSet<i32>,
  config: &ReconcileConfig,
) {
  if descriptor.kind == PartKind::Volume {
    volumes::route_volume(set, descriptor, found_tiles, config);
    return;
  }

  let found = set.previous.iter().position(|output| {
    if !output.has_part(&descriptor) {
      return false;
    }
    // A curve that flips between editable and baked geometry must not
    // reuse the old output: the two are presented through different
    // object kinds.
    if descriptor.kind == PartKind::Curve && output.editable != descriptor.editable {
      return false;
    }
    true
  });

  match found {
    Some(index) => {
      let mut output = set.previous.remove(index);
      trace!(
        output = output.id.raw(),
        object = descriptor.object_id.0,
        part = descriptor.part_id.0,
        "reusing output for part"
      );
      output.updating = true;
      output.editable = descriptor.editable;
      output.push_part(descriptor);
      set.fresh.push(output);
    }
    None => {
      trace!(
        object = descriptor.object_id.0,
        part = descriptor.part_id.0,
        "creating output for part"
      );
      let mut output = Output::new(descriptor.editable);
      output.push_part(descriptor);
      set.fresh.push(output);
    }
  }
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod matcher_test;
