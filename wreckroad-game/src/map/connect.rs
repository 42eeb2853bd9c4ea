//! Edge creation between two adjacent layers.
use serde::{Deserialize, Serialize};

use super::node::{Node, NodeId};
use crate::constants::{DENSITY_SPREAD, DENSITY_STEP, LOG_TARGET_LAYOUT};
use crate::error::ConfigError;
use crate::numbers::round_hundredths;
use crate::rng::{RollSource, shuffle_with};

/// Per-attempt edge probability range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityBounds {
    min: f64,
    max: f64,
}

impl DensityBounds {
    /// Validate a density range. A missing maximum becomes `1.5 × min`
    /// rounded to hundredths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositive`] when `min` is not a positive finite
    /// number, [`ConfigError::BelowDensityStep`] when `min` could round to
    /// zero and [`ConfigError::InvertedBounds`] when `max` is below `min` or
    /// not finite.
    pub fn new(min: f64, max: Option<f64>) -> Result<Self, ConfigError> {
        if !min.is_finite() || min <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "density_min",
                value: min,
            });
        }
        if min < DENSITY_STEP {
            return Err(ConfigError::BelowDensityStep {
                field: "density_min",
                value: min,
                step: DENSITY_STEP,
            });
        }
        let max = max.unwrap_or_else(|| round_hundredths(min * DENSITY_SPREAD));
        if !max.is_finite() || max < min {
            return Err(ConfigError::InvertedBounds {
                field: "density",
                min,
                max,
            });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Fresh per-node density, rounded to hundredths.
    pub fn sample<S: RollSource + ?Sized>(&self, rolls: &mut S) -> f64 {
        round_hundredths(self.min + rolls.roll_unit() * (self.max - self.min))
    }
}

/// Tally of one layer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConnectStats {
    pub sources: usize,
    pub edges: usize,
    pub rounds: u32,
    pub forced: usize,
}

/// Creates edges from one layer into the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectivityPolicy {
    pub density: DensityBounds,
    /// Rounds a node may spend without an edge before `up` is forced.
    pub max_connect_attempts: u32,
}

impl ConnectivityPolicy {
    #[must_use]
    pub const fn new(density: DensityBounds, max_connect_attempts: u32) -> Self {
        Self {
            density,
            max_connect_attempts,
        }
    }

    /// Connect every active node of `source` to `target`.
    ///
    /// Both slices are full-width layers indexed by column. Nodes are visited
    /// in shuffled order. A diagonal is refused when the sibling on that side
    /// already owns the opposing diagonal, so no two edges cross.
    pub fn connect<S: RollSource + ?Sized>(
        &self,
        source: &mut [Node],
        target: &mut [Node],
        rolls: &mut S,
    ) -> ConnectStats {
        let mut order: Vec<usize> = (0..source.len()).collect();
        shuffle_with(&mut order, rolls);

        let mut stats = ConnectStats::default();
        for column in order {
            if !source[column].active {
                continue;
            }
            stats.sources += 1;
            let density = self.density.sample(rolls);
            let has_left = column > 0;
            let has_right = column + 1 < target.len();

            let mut rounds = 0_u32;
            while source[column].outgoing.is_empty() {
                if rounds >= self.max_connect_attempts {
                    log::warn!(
                        target: LOG_TARGET_LAYOUT,
                        "node {} made no edge in {rounds} rounds at density {density}; forcing up edge",
                        source[column].id
                    );
                    link(&mut source[column], &mut target[column]);
                    stats.forced += 1;
                    break;
                }
                rounds += 1;

                if has_left
                    && rolls.roll_unit() < density
                    && !source[column - 1].connect_right
                {
                    link(&mut source[column], &mut target[column - 1]);
                    source[column].connect_left = true;
                }
                if has_right
                    && rolls.roll_unit() < density
                    && !source[column + 1].connect_left
                {
                    link(&mut source[column], &mut target[column + 1]);
                    source[column].connect_right = true;
                }
                if rolls.roll_unit() < density {
                    link(&mut source[column], &mut target[column]);
                }
            }
            stats.rounds += rounds;
            stats.edges += source[column].outgoing.len();
        }
        stats
    }
}

/// Add `from -> to` and wake the target.
pub(crate) fn link(from: &mut Node, to: &mut Node) {
    log::trace!(target: LOG_TARGET_LAYOUT, "edge {} -> {}", from.id, to.id);
    from.outgoing.push(to.id);
    to.incoming.push(from.id);
    to.active = true;
}

/// Blank full-width layer.
pub(crate) fn blank_layer(layer: usize, width: usize) -> Vec<Node> {
    (0..width)
        .map(|column| Node::blank(NodeId::new(layer, column)))
        .collect()
}
