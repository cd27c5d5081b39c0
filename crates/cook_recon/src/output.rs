//! Output - the persistent identity unit handed to builders.
//!
//! An output survives across cooks as long as at least one of its member
//! descriptors is revalidated each pass. Builders attach presentation
//! objects to it through the per-split slot map; the reconciliation core
//! never creates or destroys presentation objects itself.

use rustc_hash::FxHashMap;

use crate::descriptor::PartDescriptor;
use crate::types::{NodeId, OutputId, OutputType, PartId, PartKind};

/// Identifier of one split of one part, the key of the presentation map.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SplitKey {
  pub object_id: NodeId,
  pub geo_id: NodeId,
  pub part_id: PartId,
  pub split_name: String,
}

/// Opaque handle to a builder-owned presentation object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PresentationHandle(pub u64);

/// One presentation slot: the builder-owned object for one split, referenced
/// weakly (the handle may be dangling after the host tore the object down).
#[derive(Clone, Debug, Default)]
pub struct PresentationSlot {
  pub handle: Option<PresentationHandle>,

  /// Host-side object name; the geometry-collection reuse rule compares
  /// these against the names referenced by the new cook.
  pub name: String,
}

/// Persistent output entity.
#[derive(Clone, Debug)]
pub struct Output {
  /// Stable identity, preserved when the output is reused across cooks.
  pub id: OutputId,

  /// Member descriptors, in assignment order. The first `stale_count`
  /// entries are carried over from the previous cook and not yet
  /// revalidated.
  pub parts: Vec<PartDescriptor>,

  /// Per-split presentation objects, owned by the builders.
  pub objects: FxHashMap<SplitKey, PresentationSlot>,

  /// Derived from the member kinds; recomputed once per pass after all
  /// descriptors are assigned.
  pub output_type: OutputType,

  /// Whether this output represents editable content.
  pub editable: bool,

  /// True while the output is being reused by the current pass.
  pub updating: bool,

  /// Number of leading members that are stale carry-overs.
  pub stale_count: usize,
}

impl Output {
  pub fn new(editable: bool) -> Self {
    Self {
      id: OutputId::new(),
      parts: Vec::new(),
      objects: FxHashMap::default(),
      output_type: OutputType::Invalid,
      editable,
      updating: false,
      stale_count: 0,
    }
  }

  /// Mark every current member as a stale carry-over from the previous cook.
  ///
  /// Members are only ever appended, so tracking the count is enough.
  pub fn mark_all_parts_stale(&mut self) {
    self.stale_count = self.parts.len();
    self.updating = false;
  }

  /// Drop the members that were never revalidated this pass.
  pub fn prune_stale_parts(&mut self) {
    self.parts.drain(..self.stale_count.min(self.parts.len()));
    self.stale_count = 0;
  }

  /// Append a descriptor produced by the current pass.
  pub fn push_part(&mut self, descriptor: PartDescriptor) {
    self.parts.push(descriptor);
  }

  /// Members produced by the current pass (excludes stale carry-overs).
  pub fn fresh_parts(&self) -> &[PartDescriptor] {
    let first = self.stale_count.min(self.parts.len());
    &self.parts[first..]
  }

  /// Whether any member matches the descriptor's identity key.
  pub fn has_part(&self, descriptor: &PartDescriptor) -> bool {
    self.parts.iter().any(|part| part.key_eq(descriptor))
  }

  /// Tile-identity predicate for volume batching.
  ///
  /// Matches when a member volume shares the descriptor's asset/object/geo
  /// ids and tile index. With `name_must_match` (used against previous-cook
  /// outputs) the volume name, edit-layer presence and edit-layer name must
  /// also agree; without it (used against outputs created this pass) any
  /// volume of the same tile matches.
  pub fn volume_match(&self, descriptor: &PartDescriptor, name_must_match: bool) -> bool {
    if descriptor.kind != PartKind::Volume {
      return false;
    }

    if descriptor.volume_name.is_empty() {
      return false;
    }

    for part in &self.parts {
      if part.asset_id != descriptor.asset_id
        || part.object_id != descriptor.object_id
        || part.geo_id != descriptor.geo_id
      {
        continue;
      }

      if part.kind != PartKind::Volume {
        continue;
      }

      if part.volume_tile_index != descriptor.volume_tile_index {
        continue;
      }

      if name_must_match {
        if part.has_edit_layers != descriptor.has_edit_layers {
          continue;
        }

        if descriptor.has_edit_layers
          && !descriptor
            .volume_layer_name
            .eq_ignore_ascii_case(&part.volume_layer_name)
        {
          continue;
        }

        if !descriptor.volume_name.eq_ignore_ascii_case(&part.volume_name) {
          continue;
        }
      }

      return true;
    }

    false
  }

  /// Recompute the output type from the current member kinds.
  ///
  /// Volumes win (the output is a terrain tile), then instancers, then
  /// meshes, then curves. Geometry-collection outputs keep their type even
  /// without members, since their content is not descriptor-driven.
  pub fn update_output_type(&mut self) {
    let mut mesh_count = 0;
    let mut curve_count = 0;
    let mut volume_count = 0;
    let mut instancer_count = 0;

    for part in &self.parts {
      match part.kind {
        PartKind::Mesh => mesh_count += 1,
        PartKind::Curve => curve_count += 1,
        PartKind::Volume => volume_count += 1,
        PartKind::Instancer => instancer_count += 1,
        PartKind::Invalid => {}
      }
    }

    self.output_type = if volume_count > 0 {
      OutputType::Terrain
    } else if instancer_count > 0 {
      OutputType::Instancer
    } else if mesh_count > 0 {
      OutputType::Mesh
    } else if curve_count > 0 {
      OutputType::Curve
    } else if self.output_type == OutputType::GeometryCollection {
      OutputType::GeometryCollection
    } else {
      OutputType::Invalid
    };
  }

  /// Whether destruction of this output must wait until after builder
  /// hand-off. Terrain tiles are read by their replacements.
  pub fn defers_clear(&self) -> bool {
    self.output_type == OutputType::Terrain
  }

  pub fn has_geo_changed(&self) -> bool {
    self.parts.iter().any(|part| part.has_geo_changed)
  }

  pub fn has_transform_changed(&self) -> bool {
    self.parts.iter().any(|part| part.has_transform_changed)
  }

  pub fn has_materials_changed(&self) -> bool {
    self.parts.iter().any(|part| part.has_materials_changed)
  }
}

/// Working collections threaded through one reconciliation pass.
#[derive(Default)]
pub struct OutputSet {
  /// Outputs from the previous cook; drained as they are reused. Whatever
  /// remains at the end of the pass is stale.
  pub previous: Vec<Output>,

  /// Outputs produced (created or reused) by the current pass.
  pub fresh: Vec<Output>,

  /// Volume descriptors deferred because their tile output did not exist
  /// yet when they were routed.
  pub unassigned_volumes: Vec<PartDescriptor>,
}

impl OutputSet {
  pub fn new(previous: Vec<Output>) -> Self {
    Self {
      previous,
      fresh: Vec::new(),
      unassigned_volumes: Vec::new(),
    }
  }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod output_test;
