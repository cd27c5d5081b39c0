//! PartDescriptor - per-part snapshot built every cook.
//!
//! One descriptor is the unit of comparison for output matching. It is a
//! plain value type; building one only touches the engine facade for the
//! sub-info queries its classified kind allows.

use glam::Affine3A;
use smallvec::SmallVec;
use tracing::debug;

use crate::config::ReconcileConfig;
use crate::query::{CookQuery, CurveInfo, GeoInfo, MeshSocket, ObjectInfo, PartInfo, RootInfo, VolumeInfo};
use crate::types::{AttributeOwner, InstancerKind, NodeId, PartId, PartKind, RawPartType};

/// Snapshot of one cooked part plus its classification and flags.
///
/// Rebuilt from scratch every cook; never mutated in place across passes
/// except for socket propagation.
#[derive(Clone, Debug)]
pub struct PartDescriptor {
  pub asset_id: NodeId,
  pub asset_name: String,

  pub object_id: NodeId,
  pub object_name: String,

  pub geo_id: NodeId,
  pub part_id: PartId,
  pub part_name: String,
  pub has_custom_part_name: bool,

  /// Owning object's world transform.
  pub transform: Affine3A,

  pub kind: PartKind,
  pub instancer_kind: InstancerKind,

  pub visible: bool,
  pub editable: bool,
  pub templated: bool,
  pub instanced: bool,

  pub has_geo_changed: bool,
  pub has_part_changed: bool,
  pub has_materials_changed: bool,
  pub has_transform_changed: bool,

  /// Primitive group names that split this mesh part, lexicographically
  /// sorted.
  pub split_groups: SmallVec<[String; 4]>,

  // Volume sub-fields, default unless the part is a usable volume.
  pub volume_name: String,
  pub volume_tile_index: i32,
  pub volume_layer_name: String,
  pub has_edit_layers: bool,
  pub volume_info: Option<VolumeInfo>,

  /// Curve sub-info, present only for true curve parts.
  pub curve_info: Option<CurveInfo>,

  /// Sockets attached to this part (both socket sources).
  pub sockets: SmallVec<[MeshSocket; 2]>,

  // Cached engine info snapshots.
  pub object_info: ObjectInfo,
  pub geo_info: GeoInfo,
  pub part_info: PartInfo,
}

impl PartDescriptor {
  pub fn is_valid(&self) -> bool {
    self.object_id.is_valid() && self.geo_id.is_valid() && self.part_id.is_valid()
  }

  /// Matching key equality.
  ///
  /// Two descriptors refer to the same identity when their id triples and
  /// kinds match. When the ids differ but the kinds agree (node ids can be
  /// reallocated by a re-cook), object and part names decide.
  pub fn key_eq(&self, other: &PartDescriptor) -> bool {
    let ids_match = self.object_id == other.object_id
      && self.geo_id == other.geo_id
      && self.part_id == other.part_id;
    let kind_match = self.kind == other.kind;

    if ids_match && kind_match {
      return true;
    }

    if !ids_match && kind_match {
      return self.object_name == other.object_name && self.part_name == other.part_name;
    }

    false
  }

  /// Whether this descriptor shares a geometry container with the given ids.
  pub fn same_container(&self, object_id: NodeId, geo_id: NodeId) -> bool {
    self.object_id == object_id && self.geo_id == geo_id
  }
}

/// Context shared by every part of one geometry container.
pub struct PartContext<'a> {
  pub root: &'a RootInfo,
  pub object: &'a ObjectInfo,
  pub geo: &'a GeoInfo,

  /// Owning object's transform, identity when the engine reported none.
  pub transform: Affine3A,
}

/// Build the descriptor for one classified part.
///
/// `geo_split_groups` caches split-group names per container: the first
/// non-instanced mesh part computes them, later parts of the same container
/// copy them instead of re-querying.
pub fn build_descriptor<Q: CookQuery>(
  query: &Q,
  config: &ReconcileConfig,
  ctx: &PartContext<'_>,
  part: &PartInfo,
  kind: PartKind,
  instancer_kind: InstancerKind,
  sockets: SmallVec<[MeshSocket; 2]>,
  geo_split_groups: &mut Option<SmallVec<[String; 4]>>,
) -> PartDescriptor {
  let geo_id = ctx.geo.node_id;

  let mut descriptor = PartDescriptor {
    asset_id: ctx.root.node_id,
    asset_name: ctx.root.name.clone(),
    object_id: ctx.object.node_id,
    object_name: ctx.object.name.clone(),
    geo_id,
    part_id: part.part_id,
    part_name: part.name.clone(),
    has_custom_part_name: false,
    transform: ctx.transform,
    kind,
    instancer_kind,
    visible: ctx.object.visible && !part.is_instanced,
    editable: ctx.geo.is_editable,
    // Never consider a display geo as templated.
    templated: if ctx.geo.is_display { false } else { ctx.geo.is_templated },
    instanced: part.is_instanced,
    has_geo_changed: ctx.geo.has_geo_changed,
    has_part_changed: part.has_changed,
    has_materials_changed: ctx.geo.has_material_changed,
    has_transform_changed: ctx.object.has_transform_changed,
    split_groups: SmallVec::new(),
    volume_name: String::new(),
    volume_tile_index: -1,
    volume_layer_name: String::new(),
    has_edit_layers: false,
    volume_info: None,
    curve_info: None,
    sockets,
    object_info: ctx.object.clone(),
    geo_info: ctx.geo.clone(),
    part_info: part.clone(),
  };

  // Per-part name override attribute replaces the cooked part name.
  if let Some(custom) = query.custom_part_name(geo_id, part.part_id) {
    if !custom.is_empty() {
      descriptor.part_name = custom;
      descriptor.has_custom_part_name = true;
    }
  }

  // Mesh only: split groups from primitive group names.
  if kind == PartKind::Mesh {
    extract_split_groups(query, config, part, &mut descriptor, geo_split_groups);
  }

  // Volume only: name / tile / edit-layer sub-info. The volume-info query is
  // gated on the classified kind; issuing it for any other part type is an
  // engine crash hazard.
  if kind == PartKind::Volume {
    extract_volume_info(query, &mut descriptor, part);
  }

  // Curve only, and only when the raw type is curve as well: closed curves
  // are surfaced as raw meshes, and the curve-info query crashes on those.
  if kind == PartKind::Curve && part.raw_type == RawPartType::Curve {
    if let Ok(curve_info) = query.curve_info(geo_id, part.part_id) {
      descriptor.curve_info = Some(curve_info);
    }
  }

  descriptor
}

fn extract_split_groups<Q: CookQuery>(
  query: &Q,
  config: &ReconcileConfig,
  part: &PartInfo,
  descriptor: &mut PartDescriptor,
  geo_split_groups: &mut Option<SmallVec<[String; 4]>>,
) {
  if !part.is_instanced {
    if let Some(cached) = geo_split_groups {
      // Split groups were already computed for this container; copy them.
      descriptor.split_groups = cached.clone();
      return;
    }
  }

  let group_names = query
    .group_names(
      descriptor.geo_id,
      part.part_id,
      AttributeOwner::Primitive,
      part.is_instanced,
    )
    .unwrap_or_default();

  for group_name in group_names {
    if config.is_split_group(&group_name) {
      descriptor.split_groups.push(group_name);
    }
  }

  // Plain lexicographic sort; ordinal suffixes beyond one digit do not
  // order numerically ("lod10" sorts before "lod2").
  descriptor.split_groups.sort();

  if !part.is_instanced {
    *geo_split_groups = Some(descriptor.split_groups.clone());
  }
}

fn extract_volume_info<Q: CookQuery>(query: &Q, descriptor: &mut PartDescriptor, part: &PartInfo) {
  let volume_info = match query.volume_info(descriptor.geo_id, part.part_id) {
    Ok(volume_info) => volume_info,
    Err(error) => {
      debug!(
        geo = descriptor.geo_id.0,
        part = part.part_id.0,
        %error,
        "failed to fetch volume info"
      );
      return;
    }
  };

  if !volume_info.is_usable() {
    return;
  }

  descriptor.volume_name = volume_info.name.clone();

  if let Some(tile) = query.tile_index(descriptor.geo_id, part.part_id) {
    descriptor.volume_tile_index = if tile >= 0 { tile } else { -1 };
  }

  if let Some(layer_name) = query.edit_layer_name(descriptor.geo_id, part.part_id) {
    descriptor.volume_layer_name = layer_name;
    descriptor.has_edit_layers = true;
  }

  descriptor.volume_info = Some(volume_info);
}

#[cfg(test)]
#[path = "descriptor_test.rs"]
mod descriptor_test;
