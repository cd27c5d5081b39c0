//! Socket propagation.
//!
//! Sockets can be authored on point-only parts that produce no output of
//! their own. They are collected per container while the container's parts
//! are walked, then stamped onto every fresh member the container
//! contributed this pass.

use crate::output::Output;
use crate::query::MeshSocket;
use crate::types::NodeId;

/// Appends `sockets` to every fresh (non-stale) part of `outputs` that came
/// from the given object/geo container.
pub fn propagate_container_sockets(
  outputs: &mut [Output],
  object_id: NodeId,
  geo_id: NodeId,
  sockets: &[MeshSocket],
) {
  if sockets.is_empty() {
    return;
  }
  for output in outputs.iter_mut() {
    let first_fresh = if output.stale_count < output.parts.len() {
      output.stale_count
    } else {
      0
    };
    for part in output.parts[first_fresh..].iter_mut() {
      if !part.same_container(object_id, geo_id) {
        continue;
      }
      part.sockets.extend(sockets.iter().cloned());
    }
  }
}

#[cfg(test)]
#[path = "sockets_test.rs"]
mod sockets_test;
