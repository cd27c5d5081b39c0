//! Core identifiers and classification enums.

use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Engine handles
// =============================================================================

/// Handle to a node in the cook engine (asset, object or geometry container).
///
/// The engine uses signed handles; negative values mean "no node".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub i32);

impl NodeId {
  pub const INVALID: NodeId = NodeId(-1);

  pub fn is_valid(self) -> bool {
    self.0 >= 0
  }
}

/// Per-container part index handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PartId(pub i32);

impl PartId {
  pub const INVALID: PartId = PartId(-1);

  pub fn is_valid(self) -> bool {
    self.0 >= 0
  }
}

impl Default for PartId {
  fn default() -> Self {
    PartId::INVALID
  }
}

// =============================================================================
// OutputId - persistent identity
// =============================================================================

/// Atomic counter for generating unique OutputIds.
static OUTPUT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of an output across cooks.
///
/// Generated atomically - guaranteed unique within process lifetime. Reusing
/// an output preserves its id, so identity preservation across passes is
/// observable as id equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OutputId(u64);

impl OutputId {
  /// Generate a new unique OutputId.
  pub fn new() -> Self {
    Self(OUTPUT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for OutputId {
  fn default() -> Self {
    Self::new()
  }
}

// =============================================================================
// Raw engine types
// =============================================================================

/// Part type as reported by the cook engine, before classification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawPartType {
  Invalid,
  Box,
  Sphere,
  Mesh,
  Curve,
  Instancer,
  Volume,
}

impl Default for RawPartType {
  fn default() -> Self {
    RawPartType::Invalid
  }
}

/// Geometry container type as reported by the cook engine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawGeoType {
  Invalid,
  Default,
  Intermediate,
  Input,
  Curve,
}

impl Default for RawGeoType {
  fn default() -> Self {
    RawGeoType::Invalid
  }
}

/// Owner level of an attribute on a part.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttributeOwner {
  Point,
  Vertex,
  Primitive,
  Detail,
}

// =============================================================================
// Classified types
// =============================================================================

/// Semantic role of a part, inferred by the classifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PartKind {
  Invalid,
  Mesh,
  Curve,
  Instancer,
  Volume,
}

impl Default for PartKind {
  fn default() -> Self {
    PartKind::Invalid
  }
}

/// Instancer sub-kind for parts classified as `PartKind::Instancer`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstancerKind {
  /// Not an instancer.
  None,

  /// The owning object node is flagged as an instancer.
  ObjectInstancer,

  /// Instancing driven by the override instancing attribute (point/detail).
  AttributeInstancer,

  /// Instancing driven by the legacy point instancing attribute.
  OldSchoolAttributeInstancer,

  /// Packed-primitive instancer part.
  PackedPrimitive,

  /// Packed-primitive part whose payload is a geometry collection.
  GeometryCollection,
}

impl Default for InstancerKind {
  fn default() -> Self {
    InstancerKind::None
  }
}

impl InstancerKind {
  /// Packed-style instancers may legitimately report zero points/vertices.
  pub fn is_packed(self) -> bool {
    matches!(
      self,
      InstancerKind::PackedPrimitive | InstancerKind::GeometryCollection
    )
  }
}

/// Output type, derived from the kinds of an output's member parts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputType {
  Invalid,
  Mesh,
  Curve,
  Terrain,
  Instancer,
  GeometryCollection,
}

impl Default for OutputType {
  fn default() -> Self {
    OutputType::Invalid
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
