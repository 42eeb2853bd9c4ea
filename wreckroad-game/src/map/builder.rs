//! Layer-by-layer construction of a run map skeleton.
use serde::{Deserialize, Serialize};

use super::connect::{ConnectStats, ConnectivityPolicy, DensityBounds, blank_layer, link};
use super::graph::{EncounterOdds, RunMap};
use super::node::{EncounterKind, Node, NodeId};
use crate::constants::{
    DEFAULT_MAX_CONNECT_ATTEMPTS, LOG_TARGET_LAYOUT, MIN_FIRST_LAYER_ACTIVE, MIN_MAP_HEIGHT,
    MIN_MAP_WIDTH,
};
use crate::error::{ConfigError, MapResult};
use crate::rng::{RollSource, sample_indices};

/// Dimensions and density of one map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub density_min: f64,
    /// Defaults to `1.5 × density_min` rounded to hundredths.
    #[serde(default)]
    pub density_max: Option<f64>,
    #[serde(default = "MapConfig::default_max_connect_attempts")]
    pub max_connect_attempts: u32,
}

impl MapConfig {
    #[must_use]
    pub const fn new(width: usize, height: usize, density_min: f64) -> Self {
        Self {
            width,
            height,
            density_min,
            density_max: None,
            max_connect_attempts: DEFAULT_MAX_CONNECT_ATTEMPTS,
        }
    }

    #[must_use]
    pub const fn with_density_max(mut self, density_max: f64) -> Self {
        self.density_max = Some(density_max);
        self
    }

    #[must_use]
    pub const fn with_max_connect_attempts(mut self, attempts: u32) -> Self {
        self.max_connect_attempts = attempts;
        self
    }

    const fn default_max_connect_attempts() -> u32 {
        DEFAULT_MAX_CONNECT_ATTEMPTS
    }

    /// Check dimensions and resolve the density range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a width below 2, a height below 1, or an
    /// unusable density range.
    pub fn validate(&self) -> Result<DensityBounds, ConfigError> {
        if self.width < MIN_MAP_WIDTH {
            return Err(ConfigError::WidthTooSmall {
                min: MIN_MAP_WIDTH,
                value: self.width,
            });
        }
        if self.height < MIN_MAP_HEIGHT {
            return Err(ConfigError::HeightTooSmall {
                min: MIN_MAP_HEIGHT,
                value: self.height,
            });
        }
        DensityBounds::new(self.density_min, self.density_max)
    }
}

/// Builds untyped map skeletons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerGraphBuilder {
    config: MapConfig,
    density: DensityBounds,
}

impl LayerGraphBuilder {
    /// # Errors
    ///
    /// Returns [`MapError::InvalidConfiguration`](crate::MapError) when the
    /// configuration fails [`MapConfig::validate`].
    pub fn new(config: MapConfig) -> MapResult<Self> {
        let density = config.validate()?;
        Ok(Self { config, density })
    }

    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Build a skeleton: every non-terminal node untyped, the terminal node a boss.
    pub fn build<S: RollSource + ?Sized>(&self, rolls: &mut S) -> RunMap {
        let MapConfig { width, height, .. } = self.config;
        let mut layers: Vec<Vec<Node>> = (0..height).map(|layer| blank_layer(layer, width)).collect();

        let seeded = rolls.roll_between(MIN_FIRST_LAYER_ACTIVE, width);
        let first = sample_indices(width, seeded, rolls);
        for column in &first {
            layers[0][*column].active = true;
        }
        log::debug!(
            target: LOG_TARGET_LAYOUT,
            "seeding {seeded} of {width} first-layer nodes at columns {first:?}"
        );

        let mut boss = Node::blank(NodeId::new(height, width / 2));
        boss.kind = Some(EncounterKind::Boss);
        boss.active = true;
        layers.push(vec![boss]);

        let policy = ConnectivityPolicy::new(self.density, self.config.max_connect_attempts);
        let mut totals = ConnectStats::default();
        for layer_idx in 0..height.saturating_sub(1) {
            let (head, tail) = layers.split_at_mut(layer_idx + 1);
            let stats = policy.connect(&mut head[layer_idx], &mut tail[0], rolls);
            log::trace!(
                target: LOG_TARGET_LAYOUT,
                "layer {layer_idx}: {} sources, {} edges over {} rounds",
                stats.sources,
                stats.edges,
                stats.rounds
            );
            totals.sources += stats.sources;
            totals.edges += stats.edges;
            totals.rounds += stats.rounds;
            totals.forced += stats.forced;
        }

        let (head, tail) = layers.split_at_mut(height);
        let penultimate = &mut head[height - 1];
        let boss = &mut tail[0][0];
        for node in penultimate.iter_mut().filter(|node| node.active) {
            link(node, boss);
        }

        prune(&mut layers, height);

        let map = RunMap {
            width,
            height,
            density: self.density,
            layers,
            base_odds: EncounterOdds::new(),
        };
        log::debug!(
            target: LOG_TARGET_LAYOUT,
            "built {width}x{height} map: {} nodes, {} edges, {} forced",
            map.node_count(),
            map.edge_count(),
            totals.forced
        );
        map
    }
}

/// Drop first-layer nodes without outgoing edges and later non-terminal
/// nodes without incoming edges. Edges between kept nodes are untouched.
fn prune(layers: &mut [Vec<Node>], height: usize) {
    for (layer_idx, layer) in layers.iter_mut().enumerate().take(height) {
        let before = layer.len();
        if layer_idx == 0 {
            layer.retain(|node| !node.outgoing.is_empty());
        } else {
            layer.retain(|node| !node.incoming.is_empty());
        }
        log::trace!(
            target: LOG_TARGET_LAYOUT,
            "layer {layer_idx}: pruned {} of {before}",
            before - layer.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::rng::ScriptedRolls;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn invalid_dimensions_are_rejected_before_rolling() {
        let err = LayerGraphBuilder::new(MapConfig::new(1, 3, 0.4)).unwrap_err();
        assert_eq!(
            err,
            MapError::from(ConfigError::WidthTooSmall { min: 2, value: 1 })
        );
        assert!(LayerGraphBuilder::new(MapConfig::new(3, 0, 0.4)).is_err());
        assert!(LayerGraphBuilder::new(MapConfig::new(3, 2, 0.0)).is_err());
        assert!(LayerGraphBuilder::new(MapConfig::new(3, 2, 0.4).with_density_max(0.3)).is_err());
    }

    #[test]
    fn single_layer_map_wires_every_start_to_the_boss() {
        let builder = LayerGraphBuilder::new(MapConfig::new(4, 1, 0.3)).unwrap();
        // k = 3, sampled columns 3, 1, 2
        let mut rolls = ScriptedRolls::new([], [3, 3, 1, 2]);
        let map = builder.build(&mut rolls);
        let columns: Vec<usize> = map.first_layer().iter().map(Node::column).collect();
        assert_eq!(columns, vec![1, 2, 3]);
        let boss = map.boss().unwrap();
        assert_eq!(boss.id, NodeId::new(1, 2));
        assert_eq!(boss.incoming.len(), 3);
        assert!(map.audit().is_empty());
    }

    #[test]
    fn seeded_maps_pass_audit() {
        let builder = LayerGraphBuilder::new(MapConfig::new(6, 12, 0.25)).unwrap();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let map = builder.build(&mut rng);
            assert!(map.audit().is_empty(), "seed {seed}: {:?}", map.audit());
            assert_eq!(map.layers().len(), 13);
            assert!(map.first_layer().len() >= 2);
            assert_eq!(map.untyped().len(), map.node_count() - 1);
        }
    }
}
