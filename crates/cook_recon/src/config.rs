//! Configuration for a reconciliation pass.

/// Attribute and group names the pass probes for.
///
/// These are engine-side conventions; they rarely change but are kept
/// configurable so hosts can remap them.
#[derive(Clone, Debug)]
pub struct ReconcileConfig {
  /// Output templated containers (meshes only) when true.
  pub output_templated: bool,

  /// Gather from dedicated output nodes in addition to display nodes.
  pub use_output_nodes: bool,

  /// Volume name that starts a new terrain tile output.
  pub height_volume_name: String,

  /// Instancing attribute probed on points/detail (modern override).
  pub instance_attribute: String,

  /// Legacy point instancing attribute.
  pub legacy_instance_attribute: String,

  /// Primitive group prefixes that trigger mesh splitting.
  pub split_group_prefixes: Vec<String>,
}

impl Default for ReconcileConfig {
  fn default() -> Self {
    Self {
      output_templated: false,
      use_output_nodes: true,
      height_volume_name: "height".to_string(),
      instance_attribute: "instance_override".to_string(),
      legacy_instance_attribute: "instance".to_string(),
      split_group_prefixes: vec![
        "lod".to_string(),
        "collision_geo".to_string(),
        "rendered_collision_geo".to_string(),
      ],
    }
  }
}

impl ReconcileConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_output_templated(mut self, output_templated: bool) -> Self {
    self.output_templated = output_templated;
    self
  }

  pub fn with_use_output_nodes(mut self, use_output_nodes: bool) -> Self {
    self.use_output_nodes = use_output_nodes;
    self
  }

  pub fn with_height_volume_name(mut self, name: impl Into<String>) -> Self {
    self.height_volume_name = name.into();
    self
  }

  /// Whether a primitive group name marks a split group (lod / collision).
  pub fn is_split_group(&self, group_name: &str) -> bool {
    let lower = group_name.to_ascii_lowercase();
    self
      .split_group_prefixes
      .iter()
      .any(|prefix| lower.starts_with(&prefix.to_ascii_lowercase()))
  }

  /// Whether a volume name designates the height layer of a tile.
  pub fn is_height_volume(&self, volume_name: &str) -> bool {
    volume_name.eq_ignore_ascii_case(&self.height_volume_name)
  }
}
