//! Geometry-collection output reuse.
//!
//! Collection outputs own no parts of their own after a cook; a previous
//! collection output survives only if every presentation object it holds is
//! named by some collection member produced this pass. Presentation objects
//! of discarded collection outputs are detached and reported separately so
//! the consumer can decide their fate.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::output::{OutputSet, PresentationSlot, SplitKey};
use crate::query::CookQuery;
use crate::types::{InstancerKind, OutputType};

/// Collects the collection names referenced by the fresh outputs' members.
pub fn collection_names<Q: CookQuery>(query: &Q, set: &OutputSet) -> FxHashSet<String> {
  let mut names = FxHashSet::default();
  for output in &set.fresh {
    for part in output.fresh_parts() {
      if part.instancer_kind != InstancerKind::GeometryCollection {
        continue;
      }
      if let Some(name) = query.collection_name(part.geo_id, part.part_id) {
        names.insert(name);
      }
    }
  }
  names
}

/// Moves previous collection outputs whose presentation objects are all
/// still referenced into the fresh set. Unreferenced presentation objects
/// are detached; their former output stays in the previous set and gets
/// cleared with the rest of the stale outputs.
pub fn reuse_collection_outputs(
  set: &mut OutputSet,
  names: &FxHashSet<String>,
) -> Vec<PresentationSlot> {
  let mut detached = Vec::new();

  let mut index = set.previous.len();
  while index > 0 {
    index -= 1;
    if set.previous[index].output_type != OutputType::GeometryCollection {
      continue;
    }

    let mut live = 0usize;
    let mut missing: Vec<SplitKey> = Vec::new();
    for (key, slot) in &set.previous[index].objects {
      if slot.handle.is_none() {
        continue;
      }
      live += 1;
      if !names.contains(&slot.name) {
        missing.push(key.clone());
      }
    }

    if live > 0 && missing.is_empty() {
      let mut output = set.previous.remove(index);
      debug!(output = output.id.raw(), "reusing geometry collection output");
      // Its stale members were never revalidated; the collection is
      // rebuilt from the fresh packed parts.
      output.prune_stale_parts();
      set.fresh.push(output);
    } else {
      let output = &mut set.previous[index];
      for key in missing {
        if let Some(slot) = output.objects.remove(&key) {
          debug!(
            output = output.id.raw(),
            name = %slot.name,
            "detaching presentation object from stale collection output"
          );
          detached.push(slot);
        }
      }
    }
  }

  detached
}

#[cfg(test)]
#[path = "collections_test.rs"]
mod collections_test;
