//! Part classifier - maps raw engine signals to a semantic part kind.
//!
//! The classifier is a pure decision table over the raw part type, the
//! owning container type, object flags and part counts. Attribute probes are
//! only issued from the branches that need them, so crash-hazard queries
//! (curve info on meshes, instancing probes on volumes) are impossible by
//! construction rather than guarded after the fact.

use crate::config::ReconcileConfig;
use crate::query::CookQuery;
use crate::types::{AttributeOwner, InstancerKind, NodeId, PartId, PartKind, RawGeoType, RawPartType};

/// Raw signals for one part, gathered before classification.
#[derive(Clone, Copy, Debug)]
pub struct PartSignals {
  pub raw_type: RawPartType,
  pub geo_type: RawGeoType,
  pub object_is_instancer: bool,
  pub vertex_count: i32,
  pub point_count: i32,
}

/// Lazy attribute probes for classification.
///
/// Implementations are bound to one (geo, part) pair. The classifier calls
/// these only from branches where the answer can change the outcome.
pub trait InstancerProbe {
  /// Probe for an instancing attribute; returns the sub-kind it implies.
  fn attribute_instancer(&self) -> Option<InstancerKind>;

  /// Probe whether a packed-primitive part carries a geometry collection.
  fn is_geometry_collection(&self) -> bool;
}

/// Probe implementation over the engine facade.
pub struct QueryProbe<'a, Q: CookQuery> {
  pub query: &'a Q,
  pub config: &'a ReconcileConfig,
  pub geo: NodeId,
  pub part: PartId,
}

impl<'a, Q: CookQuery> InstancerProbe for QueryProbe<'a, Q> {
  fn attribute_instancer(&self) -> Option<InstancerKind> {
    // Modern override attribute, points then detail.
    if self.query.has_attribute(
      self.geo,
      self.part,
      &self.config.instance_attribute,
      AttributeOwner::Point,
    ) || self.query.has_attribute(
      self.geo,
      self.part,
      &self.config.instance_attribute,
      AttributeOwner::Detail,
    ) {
      return Some(InstancerKind::AttributeInstancer);
    }

    // Legacy point instancing attribute.
    if self.query.has_attribute(
      self.geo,
      self.part,
      &self.config.legacy_instance_attribute,
      AttributeOwner::Point,
    ) {
      return Some(InstancerKind::OldSchoolAttributeInstancer);
    }

    None
  }

  fn is_geometry_collection(&self) -> bool {
    self.query.is_geometry_collection(self.geo, self.part)
  }
}

/// Classify one part.
///
/// Decision table, evaluated top to bottom, first match wins:
/// 1. Raw shape types inside a curve container are curves (closed curves are
///    reported as meshes by the engine).
/// 2. Raw shape types otherwise: instancer objects become instancers
///    (attribute sub-kind when the probe matches, object sub-kind
///    otherwise); empty parts are invalid; point-only parts are attribute
///    instancers when the probe matches, otherwise bare point clouds
///    (invalid); everything else is a mesh.
/// 3. Raw curves are attribute instancers when the probe matches, curves
///    otherwise.
/// 4. Raw instancer parts are packed primitives, or geometry collections
///    when the payload probe recognizes one.
/// 5. Raw volumes are volumes.
/// 6. Anything else is invalid.
pub fn classify(signals: &PartSignals, probe: &impl InstancerProbe) -> (PartKind, InstancerKind) {
  match signals.raw_type {
    RawPartType::Box | RawPartType::Sphere | RawPartType::Mesh => {
      if signals.geo_type == RawGeoType::Curve {
        // Closed curve, surfaced as a mesh by the engine.
        return (PartKind::Curve, InstancerKind::None);
      }

      if signals.object_is_instancer {
        return match probe.attribute_instancer() {
          Some(kind) => (PartKind::Instancer, kind),
          None => (PartKind::Instancer, InstancerKind::ObjectInstancer),
        };
      }

      if signals.vertex_count <= 0 && signals.point_count <= 0 {
        return (PartKind::Invalid, InstancerKind::None);
      }

      if signals.vertex_count <= 0 {
        // Points without vertices: either a point-cloud instancer or nothing.
        return match probe.attribute_instancer() {
          Some(kind) => (PartKind::Instancer, kind),
          None => (PartKind::Invalid, InstancerKind::None),
        };
      }

      (PartKind::Mesh, InstancerKind::None)
    }

    RawPartType::Curve => match probe.attribute_instancer() {
      Some(kind) => (PartKind::Instancer, kind),
      None => (PartKind::Curve, InstancerKind::None),
    },

    RawPartType::Instancer => {
      if probe.is_geometry_collection() {
        (PartKind::Instancer, InstancerKind::GeometryCollection)
      } else {
        (PartKind::Instancer, InstancerKind::PackedPrimitive)
      }
    }

    RawPartType::Volume => (PartKind::Volume, InstancerKind::None),

    RawPartType::Invalid => (PartKind::Invalid, InstancerKind::None),
  }
}

/// Post-classification count veto.
///
/// A part with no vertices and no points is discarded unless it is a
/// packed-style instancer (those only carry an instance count). A part
/// belonging to an instancing object with no points is discarded regardless
/// of kind.
pub fn survives_count_veto(kind: PartKind, instancer_kind: InstancerKind, signals: &PartSignals) -> bool {
  if signals.vertex_count <= 0
    && signals.point_count <= 0
    && !(kind == PartKind::Instancer && instancer_kind.is_packed())
  {
    return false;
  }

  if signals.object_is_instancer && signals.point_count <= 0 {
    return false;
  }

  true
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;
