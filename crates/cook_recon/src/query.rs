//! CookQuery - read-only facade over the cook engine.
//!
//! This trait is the only way the reconciliation core talks to the engine.
//! Every call may fail or report "not present"; per-part failures are never
//! fatal to a pass. Implementations wrap the actual engine session; tests use
//! a scripted mock (see `test_utils`).
//!
//! Two calls are crash hazards at the engine level and must only be issued
//! under the structural gating the descriptor builder provides:
//! - `curve_info` on a part whose raw type is not `Curve`
//! - `volume_info` on a part that is not a volume

use glam::Affine3A;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::types::{AttributeOwner, NodeId, PartId, RawGeoType, RawPartType};

/// Failure of a single facade call.
#[derive(Debug, Error)]
pub enum QueryError {
  /// The engine call itself failed.
  #[error("engine call '{0}' failed")]
  EngineFailure(&'static str),

  /// The queried node handle does not refer to a live node.
  #[error("invalid node id {0}")]
  InvalidNode(i32),
}

/// Root (asset-level) node information.
#[derive(Clone, Debug)]
pub struct RootInfo {
  /// The asset's own node.
  pub node_id: NodeId,

  /// The object-level node wrapping the asset.
  pub object_node_id: NodeId,

  /// Parent of the asset node. Outputs are gathered from here when the asset
  /// has no children.
  pub parent_id: NodeId,

  pub name: String,

  /// False for assets that are a bare geometry node with no child nodes.
  pub has_children: bool,

  /// True when the asset's root is itself a geometry-bearing node
  /// (its node id differs from its object node id).
  pub is_geometry_root: bool,

  /// True when the asset contains immediate geometry nodes; subnets are then
  /// ignored for output gathering.
  pub has_immediate_geometry: bool,
}

/// Per-object (scene node) information.
#[derive(Clone, Debug)]
pub struct ObjectInfo {
  pub node_id: NodeId,
  pub name: String,

  pub visible: bool,
  pub is_instancer: bool,
  pub is_instanced: bool,

  pub has_transform_changed: bool,

  /// Object transform. `None` when the engine reported no transform for this
  /// object; the descriptor builder substitutes identity.
  pub transform: Option<Affine3A>,
}

/// Per-geometry-container information.
#[derive(Clone, Debug)]
pub struct GeoInfo {
  pub node_id: NodeId,
  pub name: String,
  pub geo_type: RawGeoType,

  pub is_editable: bool,
  pub is_templated: bool,
  pub is_display: bool,

  pub has_geo_changed: bool,
  pub has_material_changed: bool,

  pub part_count: i32,
}

/// Per-part information.
#[derive(Clone, Debug, Default)]
pub struct PartInfo {
  pub part_id: PartId,
  pub name: String,
  pub raw_type: RawPartType,

  pub face_count: i32,
  pub vertex_count: i32,
  pub point_count: i32,

  pub is_instanced: bool,
  pub instance_count: i32,
  pub instanced_part_count: i32,

  pub has_changed: bool,
}

/// Volume sub-info, queried only for volume parts.
#[derive(Clone, Debug, Default)]
pub struct VolumeInfo {
  pub name: String,

  pub tuple_size: i32,
  pub is_float: bool,
  pub tile_size: i32,

  pub x_length: i32,
  pub y_length: i32,
  pub z_length: i32,

  pub min_x: i32,
  pub min_y: i32,
  pub min_z: i32,
}

impl VolumeInfo {
  /// Only single-tuple float 2D volumes are usable as terrain layers.
  pub fn is_usable(&self) -> bool {
    self.tuple_size == 1 && self.is_float && self.z_length == 1
  }
}

/// Curve sub-info, queried only for true curve parts.
#[derive(Clone, Debug, Default)]
pub struct CurveInfo {
  pub curve_count: i32,
  pub vertex_count: i32,
  pub knot_count: i32,

  pub is_periodic: bool,
  pub is_rational: bool,
  pub has_knots: bool,

  pub order: i32,
}

/// Side-channel socket record attached to a part.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSocket {
  pub name: String,
  pub transform: Affine3A,
  pub actor: String,
  pub tag: String,
}

/// Geometry containers gathered from one object node, plus the containers
/// that must be manually re-cooked before their parts can be enumerated.
#[derive(Clone, Debug, Default)]
pub struct GatheredGeos {
  pub geos: Vec<GeoInfo>,
  pub force_cook: FxHashSet<NodeId>,
}

/// Read-only facade over the cook engine.
pub trait CookQuery {
  /// Asset-level info. Failure here aborts the pass.
  fn root_info(&self) -> Result<RootInfo, QueryError>;

  /// Ids of the object-level subnets under the root. Membership in this set
  /// acts as the visibility filter for object nodes.
  fn subnet_object_ids(&self) -> Result<Vec<NodeId>, QueryError>;

  /// Whether an object node is visible given the visible-node set (the
  /// engine walks parent visibility internally).
  fn is_object_fully_visible(&self, visible_set: &FxHashSet<NodeId>, object: NodeId) -> bool;

  /// All object nodes contained in the asset. Failure here aborts the pass.
  fn object_infos(&self) -> Result<Vec<ObjectInfo>, QueryError>;

  /// Editable geometry containers of the whole asset, fetched once per pass.
  /// Display geos and non-curve containers are not included.
  fn editable_geos(&self) -> Result<Vec<GeoInfo>, QueryError>;

  /// Display / output / templated containers reachable from a node.
  /// `use_output_nodes` and `output_templated` mirror the caller's config.
  fn output_geos(
    &self,
    node: NodeId,
    use_output_nodes: bool,
    output_templated: bool,
  ) -> Result<GatheredGeos, QueryError>;

  /// Current cook count of a container, if the engine tracks one.
  fn cook_count(&self, geo: NodeId) -> Option<i32>;

  /// Manually re-cook a container and return its refreshed info. Used for
  /// templated/editable containers whose part count reads zero.
  fn force_cook(&self, geo: NodeId) -> Result<GeoInfo, QueryError>;

  fn part_info(&self, geo: NodeId, part: PartId) -> Result<PartInfo, QueryError>;

  /// CRASH HAZARD: only call for parts classified as volumes.
  fn volume_info(&self, geo: NodeId, part: PartId) -> Result<VolumeInfo, QueryError>;

  /// CRASH HAZARD: only call when the raw part type is `Curve`.
  fn curve_info(&self, geo: NodeId, part: PartId) -> Result<CurveInfo, QueryError>;

  /// Attribute existence probe.
  fn has_attribute(&self, geo: NodeId, part: PartId, name: &str, owner: AttributeOwner) -> bool;

  /// Terrain tile index attribute value, when present.
  fn tile_index(&self, geo: NodeId, part: PartId) -> Option<i32>;

  /// Terrain edit-layer name attribute value, when present.
  fn edit_layer_name(&self, geo: NodeId, part: PartId) -> Option<String>;

  /// Custom per-part output name override, when present.
  fn custom_part_name(&self, geo: NodeId, part: PartId) -> Option<String>;

  /// Named group membership for a part at the given owner level.
  fn group_names(
    &self,
    geo: NodeId,
    part: PartId,
    owner: AttributeOwner,
    instanced: bool,
  ) -> Result<Vec<String>, QueryError>;

  /// Sockets declared through the detail-level socket attribute.
  fn detail_sockets(&self, geo: NodeId, part: PartId, instanced: bool) -> Vec<MeshSocket>;

  /// Sockets declared through named primitive groups.
  fn group_sockets(&self, geo: NodeId, part: PartId, instanced: bool) -> Vec<MeshSocket>;

  /// Whether a packed-primitive part carries a geometry-collection payload.
  fn is_geometry_collection(&self, geo: NodeId, part: PartId) -> bool;

  /// Name referenced by a geometry-collection instancer part, when present.
  fn collection_name(&self, geo: NodeId, part: PartId) -> Option<String>;
}
