//! Run map generation: layered layout, connectivity and encounter typing.
//!
//! A map is built in two passes. [`LayerGraphBuilder`] allocates the layers,
//! seeds the first layer, connects each layer to the next through
//! [`ConnectivityPolicy`], wires the terminal boss node and prunes dead
//! nodes. [`EventAssigner`] then types every remaining node.

pub mod builder;
pub mod connect;
pub mod events;
pub mod graph;
pub mod node;
pub mod render;
pub mod request;

pub use builder::{LayerGraphBuilder, MapConfig};
pub use connect::{ConnectStats, ConnectivityPolicy, DensityBounds};
pub use events::{AssignmentPick, AssignmentReport, EventAssigner, OddsLedger, default_base_odds};
pub use graph::{AuditViolation, EncounterOdds, RunMap};
pub use node::{EdgeList, EncounterKind, Node, NodeId};
pub use render::{legend, render_map};
pub use request::{MapOffer, MapRequest, MapSettings, generate_map, offer_maps};

use crate::error::MapResult;
use crate::rng::RollSource;

/// Validate `config` and build an untyped skeleton in one step.
///
/// # Errors
///
/// Returns [`crate::MapError::InvalidConfiguration`] for unusable dimensions
/// or densities.
pub fn build_map<S: RollSource + ?Sized>(config: MapConfig, rolls: &mut S) -> MapResult<RunMap> {
    Ok(LayerGraphBuilder::new(config)?.build(rolls))
}
