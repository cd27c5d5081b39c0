//! Test utilities for reconciliation tests.
//!
//! Provides a scripted mock of the engine facade plus descriptor fixtures,
//! so each stage can be tested in isolation and full passes can be run
//! against declarative scenes.
//!
//! The mock emulates the engine's crash hazards: querying curve info on a
//! non-curve part or volume info on a non-volume part panics, so any test
//! driving the full pass also verifies the structural query gating.

use std::cell::RefCell;

use glam::Affine3A;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::descriptor::PartDescriptor;
use crate::query::{
  CookQuery, CurveInfo, GatheredGeos, GeoInfo, MeshSocket, ObjectInfo, PartInfo, QueryError,
  RootInfo, VolumeInfo,
};
use crate::types::{AttributeOwner, InstancerKind, NodeId, PartId, PartKind, RawGeoType, RawPartType};

// =============================================================================
// Descriptor fixtures
// =============================================================================

/// Minimal descriptor with the given identity key and kind.
pub fn descriptor(object: i32, geo: i32, part: i32, name: &str, kind: PartKind) -> PartDescriptor {
  PartDescriptor {
    asset_id: NodeId(1000),
    asset_name: "asset".to_string(),
    object_id: NodeId(object),
    object_name: format!("object{object}"),
    geo_id: NodeId(geo),
    part_id: PartId(part),
    part_name: name.to_string(),
    has_custom_part_name: false,
    transform: Affine3A::IDENTITY,
    kind,
    instancer_kind: InstancerKind::None,
    visible: true,
    editable: false,
    templated: false,
    instanced: false,
    has_geo_changed: true,
    has_part_changed: true,
    has_materials_changed: true,
    has_transform_changed: true,
    split_groups: SmallVec::new(),
    volume_name: String::new(),
    volume_tile_index: -1,
    volume_layer_name: String::new(),
    has_edit_layers: false,
    volume_info: None,
    curve_info: None,
    sockets: SmallVec::new(),
    object_info: ObjectInfo {
      node_id: NodeId(object),
      name: format!("object{object}"),
      visible: true,
      is_instancer: false,
      is_instanced: false,
      has_transform_changed: false,
      transform: Some(Affine3A::IDENTITY),
    },
    geo_info: GeoInfo {
      node_id: NodeId(geo),
      name: format!("geo{geo}"),
      geo_type: RawGeoType::Default,
      is_editable: false,
      is_templated: false,
      is_display: true,
      has_geo_changed: true,
      has_material_changed: false,
      part_count: 1,
    },
    part_info: PartInfo {
      part_id: PartId(part),
      name: name.to_string(),
      raw_type: RawPartType::Mesh,
      face_count: 1,
      vertex_count: 3,
      point_count: 3,
      is_instanced: false,
      instance_count: 0,
      instanced_part_count: 0,
      has_changed: true,
    },
  }
}

/// Volume descriptor fixture for batching tests.
pub fn volume_descriptor(
  object: i32,
  geo: i32,
  part: i32,
  volume_name: &str,
  tile: i32,
) -> PartDescriptor {
  let mut d = descriptor(object, geo, part, volume_name, PartKind::Volume);
  d.volume_name = volume_name.to_string();
  d.volume_tile_index = tile;
  d.part_info.raw_type = RawPartType::Volume;
  d
}

// =============================================================================
// Mock scene
// =============================================================================

/// One scripted part.
#[derive(Clone, Default)]
pub struct MockPart {
  pub info: PartInfo,
  pub attributes: Vec<(String, AttributeOwner)>,
  pub tile_index: Option<i32>,
  pub edit_layer: Option<String>,
  pub custom_name: Option<String>,
  pub volume: Option<VolumeInfo>,
  pub curve: Option<CurveInfo>,
  pub prim_groups: Vec<String>,
  pub detail_sockets: Vec<MeshSocket>,
  pub group_sockets: Vec<MeshSocket>,
  pub geometry_collection: bool,
  pub collection_name: Option<String>,
  pub fail_part_info: bool,
}

impl MockPart {
  pub fn mesh(id: i32, name: &str) -> Self {
    Self {
      info: PartInfo {
        part_id: PartId(id),
        name: name.to_string(),
        raw_type: RawPartType::Mesh,
        face_count: 2,
        vertex_count: 6,
        point_count: 4,
        is_instanced: false,
        instance_count: 0,
        instanced_part_count: 0,
        has_changed: true,
      },
      ..Default::default()
    }
  }

  pub fn point_cloud(id: i32, name: &str, point_count: i32) -> Self {
    let mut part = Self::mesh(id, name);
    part.info.vertex_count = 0;
    part.info.face_count = 0;
    part.info.point_count = point_count;
    part
  }

  pub fn curve(id: i32, name: &str) -> Self {
    let mut part = Self::mesh(id, name);
    part.info.raw_type = RawPartType::Curve;
    part.curve = Some(CurveInfo {
      curve_count: 1,
      vertex_count: 4,
      knot_count: 0,
      is_periodic: false,
      is_rational: false,
      has_knots: false,
      order: 2,
    });
    part
  }

  pub fn packed(id: i32, name: &str, instance_count: i32) -> Self {
    let mut part = Self::mesh(id, name);
    part.info.raw_type = RawPartType::Instancer;
    part.info.vertex_count = 0;
    part.info.point_count = 1;
    part.info.instance_count = instance_count;
    part
  }

  pub fn volume(id: i32, volume_name: &str, tile: i32) -> Self {
    let mut part = Self::mesh(id, volume_name);
    part.info.raw_type = RawPartType::Volume;
    part.volume = Some(VolumeInfo {
      name: volume_name.to_string(),
      tuple_size: 1,
      is_float: true,
      tile_size: 0,
      x_length: 64,
      y_length: 64,
      z_length: 1,
      min_x: 0,
      min_y: 0,
      min_z: 0,
    });
    part.tile_index = Some(tile);
    part
  }

  pub fn with_edit_layer(mut self, layer: &str) -> Self {
    self.edit_layer = Some(layer.to_string());
    self
  }

  pub fn with_attribute(mut self, name: &str, owner: AttributeOwner) -> Self {
    self.attributes.push((name.to_string(), owner));
    self
  }
}

/// One scripted geometry container.
#[derive(Clone)]
pub struct MockGeo {
  pub info: GeoInfo,
  pub parts: Vec<MockPart>,

  /// Info reported after a forced cook, when different.
  pub cooked_info: Option<GeoInfo>,
}

impl MockGeo {
  pub fn display(id: i32) -> Self {
    Self {
      info: GeoInfo {
        node_id: NodeId(id),
        name: format!("geo{id}"),
        geo_type: RawGeoType::Default,
        is_editable: false,
        is_templated: false,
        is_display: true,
        has_geo_changed: true,
        has_material_changed: false,
        part_count: 0,
      },
      parts: Vec::new(),
      cooked_info: None,
    }
  }

  pub fn editable_curve(id: i32) -> Self {
    let mut geo = Self::display(id);
    geo.info.geo_type = RawGeoType::Curve;
    geo.info.is_editable = true;
    geo.info.is_display = false;
    geo
  }

  pub fn with_part(mut self, part: MockPart) -> Self {
    self.parts.push(part);
    self.info.part_count = self.parts.len() as i32;
    self
  }
}

/// One scripted object node.
#[derive(Clone)]
pub struct MockObject {
  pub info: ObjectInfo,
  pub geos: Vec<MockGeo>,
}

impl MockObject {
  pub fn visible(id: i32, name: &str) -> Self {
    Self {
      info: ObjectInfo {
        node_id: NodeId(id),
        name: name.to_string(),
        visible: true,
        is_instancer: false,
        is_instanced: false,
        has_transform_changed: false,
        transform: Some(Affine3A::IDENTITY),
      },
      geos: Vec::new(),
    }
  }

  pub fn with_geo(mut self, geo: MockGeo) -> Self {
    self.geos.push(geo);
    self
  }
}

/// Scripted engine facade.
pub struct MockQuery {
  pub root: RootInfo,
  pub objects: Vec<MockObject>,
  pub editable: Vec<MockGeo>,

  /// Objects hidden from the fully-visible check even when in the set.
  pub hidden_objects: FxHashSet<NodeId>,

  /// Containers to report as needing a cook before parts can be read.
  pub force_cook: FxHashSet<NodeId>,

  pub cook_counts: FxHashMap<NodeId, i32>,
  pub cook_requests: RefCell<Vec<NodeId>>,
}

impl MockQuery {
  pub fn new() -> Self {
    Self {
      root: RootInfo {
        node_id: NodeId(1000),
        object_node_id: NodeId(1),
        parent_id: NodeId(999),
        name: "asset".to_string(),
        has_children: true,
        is_geometry_root: false,
        has_immediate_geometry: false,
      },
      objects: Vec::new(),
      editable: Vec::new(),
      hidden_objects: FxHashSet::default(),
      force_cook: FxHashSet::default(),
      cook_counts: FxHashMap::default(),
      cook_requests: RefCell::new(Vec::new()),
    }
  }

  pub fn with_object(mut self, object: MockObject) -> Self {
    self.objects.push(object);
    self
  }

  pub fn with_editable(mut self, geo: MockGeo) -> Self {
    self.editable.push(geo);
    self
  }

  fn find_geo(&self, geo: NodeId) -> Option<&MockGeo> {
    self
      .objects
      .iter()
      .flat_map(|object| object.geos.iter())
      .chain(self.editable.iter())
      .find(|candidate| candidate.info.node_id == geo)
  }

  fn find_part(&self, geo: NodeId, part: PartId) -> Option<&MockPart> {
    self
      .find_geo(geo)?
      .parts
      .iter()
      .find(|candidate| candidate.info.part_id == part)
  }
}

impl Default for MockQuery {
  fn default() -> Self {
    Self::new()
  }
}

impl CookQuery for MockQuery {
  fn root_info(&self) -> Result<RootInfo, QueryError> {
    Ok(self.root.clone())
  }

  fn subnet_object_ids(&self) -> Result<Vec<NodeId>, QueryError> {
    Ok(self.objects.iter().map(|object| object.info.node_id).collect())
  }

  fn is_object_fully_visible(&self, visible_set: &FxHashSet<NodeId>, object: NodeId) -> bool {
    visible_set.contains(&object) && !self.hidden_objects.contains(&object)
  }

  fn object_infos(&self) -> Result<Vec<ObjectInfo>, QueryError> {
    Ok(self.objects.iter().map(|object| object.info.clone()).collect())
  }

  fn editable_geos(&self) -> Result<Vec<GeoInfo>, QueryError> {
    Ok(self.editable.iter().map(|geo| geo.info.clone()).collect())
  }

  fn output_geos(
    &self,
    node: NodeId,
    _use_output_nodes: bool,
    output_templated: bool,
  ) -> Result<GatheredGeos, QueryError> {
    let Some(object) = self.objects.iter().find(|object| object.info.node_id == node) else {
      return Ok(GatheredGeos::default());
    };

    let geos = object
      .geos
      .iter()
      .map(|geo| geo.info.clone())
      .filter(|info| !info.is_templated || output_templated)
      .collect();

    Ok(GatheredGeos {
      geos,
      force_cook: self.force_cook.clone(),
    })
  }

  fn cook_count(&self, geo: NodeId) -> Option<i32> {
    self.cook_counts.get(&geo).copied()
  }

  fn force_cook(&self, geo: NodeId) -> Result<GeoInfo, QueryError> {
    self.cook_requests.borrow_mut().push(geo);

    let Some(mock_geo) = self.find_geo(geo) else {
      return Err(QueryError::InvalidNode(geo.0));
    };

    Ok(mock_geo.cooked_info.clone().unwrap_or_else(|| mock_geo.info.clone()))
  }

  fn part_info(&self, geo: NodeId, part: PartId) -> Result<PartInfo, QueryError> {
    let Some(mock_part) = self.find_part(geo, part) else {
      return Err(QueryError::EngineFailure("part_info"));
    };

    if mock_part.fail_part_info {
      return Err(QueryError::EngineFailure("part_info"));
    }

    Ok(mock_part.info.clone())
  }

  fn volume_info(&self, geo: NodeId, part: PartId) -> Result<VolumeInfo, QueryError> {
    let mock_part = self
      .find_part(geo, part)
      .ok_or(QueryError::EngineFailure("volume_info"))?;

    // Emulate the engine-level crash trigger.
    assert_eq!(
      mock_part.info.raw_type,
      RawPartType::Volume,
      "volume_info queried on a non-volume part"
    );

    mock_part
      .volume
      .clone()
      .ok_or(QueryError::EngineFailure("volume_info"))
  }

  fn curve_info(&self, geo: NodeId, part: PartId) -> Result<CurveInfo, QueryError> {
    let mock_part = self
      .find_part(geo, part)
      .ok_or(QueryError::EngineFailure("curve_info"))?;

    // Emulate the engine-level crash trigger.
    assert_eq!(
      mock_part.info.raw_type,
      RawPartType::Curve,
      "curve_info queried on a non-curve part"
    );

    mock_part
      .curve
      .clone()
      .ok_or(QueryError::EngineFailure("curve_info"))
  }

  fn has_attribute(&self, geo: NodeId, part: PartId, name: &str, owner: AttributeOwner) -> bool {
    self
      .find_part(geo, part)
      .map(|mock_part| {
        mock_part
          .attributes
          .iter()
          .any(|(attr_name, attr_owner)| attr_name == name && *attr_owner == owner)
      })
      .unwrap_or(false)
  }

  fn tile_index(&self, geo: NodeId, part: PartId) -> Option<i32> {
    self.find_part(geo, part)?.tile_index
  }

  fn edit_layer_name(&self, geo: NodeId, part: PartId) -> Option<String> {
    self.find_part(geo, part)?.edit_layer.clone()
  }

  fn custom_part_name(&self, geo: NodeId, part: PartId) -> Option<String> {
    self.find_part(geo, part)?.custom_name.clone()
  }

  fn group_names(
    &self,
    geo: NodeId,
    part: PartId,
    owner: AttributeOwner,
    _instanced: bool,
  ) -> Result<Vec<String>, QueryError> {
    if owner != AttributeOwner::Primitive {
      return Ok(Vec::new());
    }

    Ok(
      self
        .find_part(geo, part)
        .map(|mock_part| mock_part.prim_groups.clone())
        .unwrap_or_default(),
    )
  }

  fn detail_sockets(&self, geo: NodeId, part: PartId, _instanced: bool) -> Vec<MeshSocket> {
    self
      .find_part(geo, part)
      .map(|mock_part| mock_part.detail_sockets.clone())
      .unwrap_or_default()
  }

  fn group_sockets(&self, geo: NodeId, part: PartId, _instanced: bool) -> Vec<MeshSocket> {
    self
      .find_part(geo, part)
      .map(|mock_part| mock_part.group_sockets.clone())
      .unwrap_or_default()
  }

  fn is_geometry_collection(&self, geo: NodeId, part: PartId) -> bool {
    self
      .find_part(geo, part)
      .map(|mock_part| mock_part.geometry_collection)
      .unwrap_or(false)
  }

  fn collection_name(&self, geo: NodeId, part: PartId) -> Option<String> {
    self.find_part(geo, part)?.collection_name.clone()
  }
}

/// A socket fixture.
pub fn socket(name: &str) -> MeshSocket {
  MeshSocket {
    name: name.to_string(),
    transform: Affine3A::IDENTITY,
    actor: String::new(),
    tag: String::new(),
  }
}
