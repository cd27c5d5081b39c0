//! Pass orchestration.
//!
//! [`reconcile`] runs one full pass over a cooked scene: gather containers,
//! classify and describe parts, match them to the previous cook's outputs,
//! and partition what is left for clearing. [`reconcile_timed`] wraps it
//! with wall-clock and reuse statistics.

use glam::Affine3A;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};
use web_time::Instant;

use crate::classify::{classify, survives_count_veto, PartSignals, QueryProbe};
use crate::config::ReconcileConfig;
use crate::descriptor::{build_descriptor, PartContext};
use crate::output::{Output, OutputSet, PresentationSlot};
use crate::query::{CookQuery, GeoInfo, MeshSocket, ObjectInfo, QueryError, RootInfo};
use crate::types::{NodeId, OutputId, PartId, PartKind, RawPartType};

use super::collections;
use super::lifecycle::{partition_stale, StalePartition};
use super::matcher::route_part;
use super::sockets::propagate_container_sockets;
use super::volumes;

// ============================================================================
// Errors and results
// ============================================================================

/// A pass-aborting failure. Everything else degrades to skipping the
/// affected container or part.
#[derive(Debug, Error)]
pub enum ReconcileError {
  #[error("invalid root node id {0}")]
  InvalidRootNode(i32),
  #[error(transparent)]
  Query(#[from] QueryError),
}

/// Everything one pass produces.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
  /// The reconciled output set, reused and new outputs interleaved in
  /// scene order.
  pub outputs: Vec<Output>,
  /// Stale outputs to clear before hand-off.
  pub clear_now: Vec<Output>,
  /// Stale terrain outputs to clear strictly after hand-off.
  pub clear_deferred: Vec<Output>,
  /// Presentation objects detached from discarded collection outputs.
  pub detached_collections: Vec<PresentationSlot>,
  /// Per-container cook counts observed this pass; feed back into the
  /// next pass for change detection.
  pub cook_counts: FxHashMap<NodeId, i32>,
}

/// Reuse and timing statistics for one pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileStats {
  pub output_count: usize,
  pub reused_count: usize,
  pub created_count: usize,
  pub cleared_count: usize,
  pub total_us: u64,
}

// ============================================================================
// Entry points
// ============================================================================

/// Runs one reconciliation pass.
///
/// `previous` is consumed: matched outputs resurface in the outcome's
/// `outputs`, unmatched ones in its clear lists. `previous_cook_counts` is
/// the `cook_counts` map of the previous outcome (empty on the first pass).
pub fn reconcile<Q: CookQuery>(
  query: &Q,
  config: &ReconcileConfig,
  previous: Vec<Output>,
  previous_cook_counts: &FxHashMap<NodeId, i32>,
) -> Result<ReconcileOutcome, ReconcileError> {
  let root = query.root_info()?;
  if !root.node_id.is_valid() {
    return Err(ReconcileError::InvalidRootNode(root.node_id.0));
  }

  let object_infos = query.object_infos()?;

  let mut set = OutputSet::new(previous);
  for output in &mut set.previous {
    output.mark_all_parts_stale();
  }

  // Editable containers are asset-wide; fetch once, process with the
  // first object.
  let mut editable_geos: Vec<GeoInfo> = match query.editable_geos() {
    Ok(geos) => geos,
    Err(error) => {
      warn!(%error, "failed to gather editable containers");
      Vec::new()
    }
  };

  // The visibility reference set: subnet objects when the asset nests its
  // geometry in children, otherwise just the asset's own object node.
  let mut visible_set: FxHashSet<NodeId> = FxHashSet::default();
  if root.has_children && !root.has_immediate_geometry {
    visible_set.extend(query.subnet_object_ids()?);
  } else {
    visible_set.insert(root.object_node_id);
  }

  let mut cook_counts: FxHashMap<NodeId, i32> = FxHashMap::default();

  for object in &object_infos {
    let (object_visible, gather_node) = if !root.has_children {
      // Geometry directly under the asset: gather from the parent so
      // sibling SOPs are seen.
      (true, root.parent_id)
    } else if root.is_geometry_root && object.node_id == root.object_node_id {
      (true, root.node_id)
    } else {
      (
        query.is_object_fully_visible(&visible_set, object.node_id),
        object.node_id,
      )
    };

    let transform = object.transform.unwrap_or_else(|| {
      warn!(
        object = object.node_id.0,
        name = %object.name,
        "no transform reported for object - using identity"
      );
      Affine3A::IDENTITY
    });

    let mut geos: Vec<GeoInfo> = std::mem::take(&mut editable_geos);
    let mut force_cook: FxHashSet<NodeId> = FxHashSet::default();
    if object_visible {
      match query.output_geos(gather_node, config.use_output_nodes, config.output_templated) {
        Ok(gathered) => {
          geos.extend(gathered.geos);
          force_cook.extend(gathered.force_cook);
        }
        Err(error) => {
          warn!(object = object.node_id.0, %error, "failed to gather output containers");
        }
      }
    }

    // Heightfield tiles already claimed by a new output, per object.
    let mut found_tiles: FxHashSet<i32> = FxHashSet::default();

    for geo in &mut geos {
      refresh_cook_count(query, geo, previous_cook_counts, &mut cook_counts);

      // Containers that report no parts but should have some get cooked
      // individually.
      if geo.part_count <= 0
        && (force_cook.contains(&geo.node_id)
          || geo.is_editable
          || geo.is_templated
          || !geo.is_display)
      {
        let changed = geo.has_geo_changed;
        match query.force_cook(geo.node_id) {
          Ok(refreshed) => {
            *geo = refreshed;
            geo.has_geo_changed |= changed;
          }
          Err(error) => {
            warn!(geo = geo.node_id.0, %error, "forced cook of empty container failed");
          }
        }
      }

      process_geo(query, config, &root, object, geo, transform, &mut set, &mut found_tiles);
    }
  }

  // Members that did not survive this pass are dropped from the reused
  // outputs.
  for output in &mut set.fresh {
    output.prune_stale_parts();
  }

  volumes::resolve_unassigned(&mut set);

  let names = collections::collection_names(query, &set);
  let detached_collections = collections::reuse_collection_outputs(&mut set, &names);

  for output in &mut set.fresh {
    output.update_output_type();
  }

  let StalePartition { clear_now, clear_deferred } = partition_stale(set.previous);

  Ok(ReconcileOutcome {
    outputs: set.fresh,
    clear_now,
    clear_deferred,
    detached_collections,
    cook_counts,
  })
}

/// [`reconcile`] plus reuse statistics and a wall-clock timing.
pub fn reconcile_timed<Q: CookQuery>(
  query: &Q,
  config: &ReconcileConfig,
  previous: Vec<Output>,
  previous_cook_counts: &FxHashMap<NodeId, i32>,
) -> Result<(ReconcileOutcome, ReconcileStats), ReconcileError> {
  let start = Instant::now();
  let previous_ids: FxHashSet<OutputId> = previous.iter().map(|output| output.id).collect();

  let outcome = reconcile(query, config, previous, previous_cook_counts)?;

  let reused_count = outcome
    .outputs
    .iter()
    .filter(|output| previous_ids.contains(&output.id))
    .count();
  let stats = ReconcileStats {
    output_count: outcome.outputs.len(),
    reused_count,
    created_count: outcome.outputs.len() - reused_count,
    cleared_count: outcome.clear_now.len() + outcome.clear_deferred.len(),
    total_us: start.elapsed().as_micros() as u64,
  };
  debug!(
    outputs = stats.output_count,
    reused = stats.reused_count,
    created = stats.created_count,
    cleared = stats.cleared_count,
    total_us = stats.total_us,
    "reconcile pass complete"
  );
  Ok((outcome, stats))
}

// ============================================================================
// Per-container processing
// ============================================================================

/// Updates the container's change flag from its cook count. A missing count
/// on either side counts as changed.
fn refresh_cook_count<Q: CookQuery>(
  query: &Q,
  geo: &mut GeoInfo,
  previous_cook_counts: &FxHashMap<NodeId, i32>,
  cook_counts: &mut FxHashMap<NodeId, i32>,
) {
  if !cook_counts.contains_key(&geo.node_id) {
    if let Some(count) = query.cook_count(geo.node_id) {
      cook_counts.insert(geo.node_id, count);
    }
  }
  let count_changed = match (
    previous_cook_counts.get(&geo.node_id),
    cook_counts.get(&geo.node_id),
  ) {
    (Some(previous), Some(current)) => previous != current,
    _ => true,
  };
  geo.has_geo_changed = geo.has_geo_changed || count_changed;
}

#[allow(clippy::too_many_arguments)]
fn process_geo<Q: CookQuery>(
  query: &Q,
  config: &ReconcileConfig,
  root: &RootInfo,
  object: &ObjectInfo,
  geo: &GeoInfo,
  transform: Affine3A,
  set: &mut OutputSet,
  found_tiles: &mut FxHashSet<i32>,
) {
  // Split groups are container-wide; resolved lazily by the first mesh
  // part and reused by its siblings.
  let mut geo_split_groups: Option<SmallVec<[String; 4]>> = None;
  // Sockets found on parts that produce no output still apply to the
  // container's surviving members.
  let mut geo_sockets: Vec<MeshSocket> = Vec::new();

  for part_index in 0..geo.part_count.max(0) {
    let part_id = PartId(part_index);

    // Templated containers are not cooked by the session cook; cook them
    // here so their part info is current.
    if geo.is_templated && config.output_templated {
      if let Err(error) = query.force_cook(geo.node_id) {
        debug!(geo = geo.node_id.0, %error, "cook of templated container failed");
      }
    }

    let part = match query.part_info(geo.node_id, part_id) {
      Ok(part) => part,
      Err(error) => {
        debug!(
          object = object.node_id.0,
          geo = geo.node_id.0,
          part = part_index,
          %error,
          "unable to retrieve part info - skipping"
        );
        continue;
      }
    };

    if part.raw_type == RawPartType::Invalid {
      continue;
    }

    let signals = PartSignals {
      raw_type: part.raw_type,
      geo_type: geo.geo_type,
      object_is_instancer: object.is_instancer,
      vertex_count: part.vertex_count,
      point_count: part.point_count,
    };
    let probe = QueryProbe { query, config, geo: geo.node_id, part: part.part_id };
    let (kind, instancer_kind) = classify(&signals, &probe);

    if !survives_count_veto(kind, instancer_kind, &signals) {
      debug!(
        object = object.node_id.0,
        geo = geo.node_id.0,
        part = part_index,
        "no points or vertices - skipping"
      );
      continue;
    }

    // Sockets are collected before the invalid-kind drop: a point-only
    // socket part contributes to its container's meshes.
    let mut sockets: SmallVec<[MeshSocket; 2]> = SmallVec::new();
    sockets.extend(query.detail_sockets(geo.node_id, part.part_id, part.is_instanced));
    sockets.extend(query.group_sockets(geo.node_id, part.part_id, part.is_instanced));

    if kind == PartKind::Invalid {
      geo_sockets.extend(sockets);
      continue;
    }

    let ctx = PartContext { root, object, geo, transform };
    let descriptor = build_descriptor(
      query,
      config,
      &ctx,
      &part,
      kind,
      instancer_kind,
      sockets,
      &mut geo_split_groups,
    );

    // Hidden, non-instanced, non-editable parts produce no output.
    if !descriptor.visible && !descriptor.instanced && !descriptor.editable {
      continue;
    }
    // Templated containers only surface meshes.
    if descriptor.templated && kind != PartKind::Mesh {
      continue;
    }

    route_part(set, descriptor, found_tiles, config);
  }

  propagate_container_sockets(&mut set.fresh, object.node_id, geo.node_id, &geo_sockets);
}

#[cfg(test)]
#[path = "process_test.rs"]
mod process_test;
