//! Volume routing and heightfield batching.
//!
//! Terrain tiles arrive as several volume parts (height plus any number of
//! non-height layers) that must land in the same output. Matching against
//! the previous cook insists on the volume name so an old tile output is
//! only reused for the same layer; matching against outputs created this
//! pass relaxes the name so sibling layers batch into the tile output their
//! height part just claimed. Parts whose tile output does not exist yet are
//! parked and resolved after the whole scene was walked.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::config::ReconcileConfig;
use crate::descriptor::PartDescriptor;
use crate::output::{Output, OutputSet};

// ============================================================================
// Routing
// ============================================================================

/// Routes one volume descriptor into the output set.
pub fn route_volume(
  set: &mut OutputSet,
  descriptor: PartDescriptor,
  found_tiles: &mut FxHashSet<i32>,
  config: &ReconcileConfig,
) {
  // Previous-cook outputs first: full match, name included.
  if let Some(index) = set
    .previous
    .iter()
    .position(|output| output.volume_match(&descriptor, true))
  {
    let mut output = set.previous.remove(index);
    trace!(
      output = output.id.raw(),
      tile = descriptor.volume_tile_index,
      volume = %descriptor.volume_name,
      "reusing terrain output for volume"
    );
    output.updating = true;
    output.editable = descriptor.editable;
    output.push_part(descriptor);
    set.fresh.push(output);
    return;
  }

  // Then outputs already created this pass, name relaxed so layers of the
  // same tile coalesce.
  if let Some(output) = set
    .fresh
    .iter_mut()
    .find(|output| output.volume_match(&descriptor, false))
  {
    trace!(
      output = output.id.raw(),
      tile = descriptor.volume_tile_index,
      volume = %descriptor.volume_name,
      "batching volume into tile output"
    );
    output.updating = true;
    output.editable = descriptor.editable;
    output.push_part(descriptor);
    return;
  }

  // No home yet. Non-height layers always wait for their tile output; a
  // height part waits only when edit layers are active and another layer
  // of the same tile already claimed the output slot.
  let batch = if !config.is_height_volume(&descriptor.volume_name) {
    true
  } else {
    descriptor.has_edit_layers && found_tiles.contains(&descriptor.volume_tile_index)
  };
  found_tiles.insert(descriptor.volume_tile_index);

  if batch {
    set.unassigned_volumes.push(descriptor);
    return;
  }

  let mut output = Output::new(descriptor.editable);
  output.push_part(descriptor);
  set.fresh.push(output);
}

// ============================================================================
// Late resolution
// ============================================================================

/// Attaches the parked volume parts to the tile outputs created during the
/// pass. Parts whose tile never materialized are dropped.
pub fn resolve_unassigned(set: &mut OutputSet) {
  let pending = std::mem::take(&mut set.unassigned_volumes);
  for descriptor in pending {
    match set
      .fresh
      .iter_mut()
      .find(|output| output.volume_match(&descriptor, false))
    {
      Some(output) => {
        output.push_part(descriptor);
      }
      None => {
        debug!(
          object = descriptor.object_id.0,
          tile = descriptor.volume_tile_index,
          volume = %descriptor.volume_name,
          "volume part matches no tile output - discarding"
        );
      }
    }
  }
}

#[cfg(test)]
#[path = "volumes_test.rs"]
mod volumes_test;
