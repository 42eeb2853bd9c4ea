//! Wreckroad Map Engine
//!
//! Platform-agnostic run-map generation for the Wreckroad vehicle-combat
//! roguelike: layered route maps, encounter typing, rank odds and enemy
//! loadouts. This crate has no UI or platform-specific dependencies.

pub mod constants;
pub mod error;
pub mod loadout;
pub mod map;
pub mod numbers;
pub mod parts;
pub mod power;
pub mod ranks;
pub mod rng;
pub mod sampler;
pub mod seed;
pub mod treasure;
pub mod walk;

use serde::de::DeserializeOwned;
use thiserror::Error;

// Re-export commonly used types
pub use error::{ConfigError, DistributionError, MapError, MapResult};
pub use loadout::{EnemyLoadout, generate_enemy_loadout};
pub use map::{
    AssignmentReport, AuditViolation, EncounterKind, EncounterOdds, EventAssigner,
    LayerGraphBuilder, MapConfig, MapOffer, MapRequest, MapSettings, Node, NodeId, RunMap,
    build_map, generate_map, offer_maps, render_map,
};
pub use parts::{Catalog, Part, PartKind, PartStats, Rank, SlotType};
pub use power::{Inventory, PowerBreakdown, PowerWeights, estimate_power, power_breakdown};
pub use ranks::{RankBand, RankOdds, RankTable, odds_for_power, rank_band};
pub use rng::{RngBundle, RollSource, ScriptedRolls};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy, share_code_for};
pub use treasure::{Reward, TreasureSpec, roll_reward};
pub use walk::{Chooser, RandomChooser, WalkLog, WalkOutcome, walk};

const EMBEDDED_CATALOG: &str = include_str!("../assets/data/catalog.json");
const EMBEDDED_MAP: &str = include_str!("../assets/data/map.json");
const EMBEDDED_RANKS: &str = include_str!("../assets/data/ranks.json");

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the part catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;

    /// Load configuration data for a specific system (`map`, `ranks`)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned;
}

/// Failure raised by [`EmbeddedData`].
#[derive(Debug, Error)]
pub enum EmbeddedDataError {
    #[error("no embedded config named {0}")]
    UnknownConfig(String),
    #[error("embedded data is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serves the JSON assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedData;

impl EmbeddedData {
    /// Raw JSON for a named asset, if one is embedded.
    #[must_use]
    pub fn raw(name: &str) -> Option<&'static str> {
        match name {
            "catalog" => Some(EMBEDDED_CATALOG),
            "map" => Some(EMBEDDED_MAP),
            "ranks" => Some(EMBEDDED_RANKS),
            _ => None,
        }
    }
}

impl DataLoader for EmbeddedData {
    type Error = EmbeddedDataError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Ok(Catalog::from_json(EMBEDDED_CATALOG)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let raw = Self::raw(config_name)
            .ok_or_else(|| EmbeddedDataError::UnknownConfig(config_name.to_string()))?;
        Ok(serde_json::from_str(raw)?)
    }
}

/// Failure raised by [`MapEngine`]: either the data source or the generators.
#[derive(Debug, Error)]
pub enum EngineError<E: std::error::Error + 'static> {
    #[error("failed to load game data: {0}")]
    Data(#[source] E),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Main engine tying a data source to map generation
pub struct MapEngine<L: DataLoader> {
    data_loader: L,
}

impl<L: DataLoader> MapEngine<L> {
    /// Create a new engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    /// Map settings from the `map` config, validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or is unusable.
    pub fn settings(&self) -> Result<MapSettings, EngineError<L::Error>> {
        let settings: MapSettings = self
            .data_loader
            .load_config("map")
            .map_err(EngineError::Data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rank table from the `ranks` config, validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or is unusable.
    pub fn rank_table(&self) -> Result<RankTable, EngineError<L::Error>> {
        let table: RankTable = self
            .data_loader
            .load_config("ranks")
            .map_err(EngineError::Data)?;
        table.validate().map_err(MapError::from)?;
        Ok(table)
    }

    /// Part catalog from the data source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn catalog(&self) -> Result<Catalog, EngineError<L::Error>> {
        self.data_loader.load_catalog().map_err(EngineError::Data)
    }

    /// Generate the configured number of candidate maps for a run seed.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded or generation fails.
    pub fn offers(&self, seed: u64) -> Result<Vec<MapOffer>, EngineError<L::Error>> {
        let settings = self.settings()?;
        let bundle = RngBundle::from_user_seed(seed);
        let mut layout = bundle.layout();
        let mut events = bundle.events();
        let offers = offer_maps(&settings, settings.offer_count, &mut *layout, &mut *events)?;
        log::debug!(
            target: constants::LOG_TARGET_LAYOUT,
            "seed {seed}: {} offers from {} layout draws",
            offers.len(),
            layout.draws()
        );
        Ok(offers)
    }

    /// Build and type one map with fixed dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded or generation fails.
    pub fn generate(
        &self,
        config: MapConfig,
        seed: u64,
    ) -> Result<(RunMap, AssignmentReport), EngineError<L::Error>> {
        let settings = self.settings()?;
        let assigner = settings.assigner()?;
        let config = config.with_max_connect_attempts(settings.max_connect_attempts);
        let bundle = RngBundle::from_user_seed(seed);
        let mut layout = bundle.layout();
        let mut events = bundle.events();
        Ok(generate_map(config, &assigner, &mut *layout, &mut *events)?)
    }

    /// Power breakdown for an inventory under the configured rank table.
    ///
    /// # Errors
    ///
    /// Returns an error if the rank table cannot be loaded or the inventory
    /// holds no chassis.
    pub fn power(&self, inventory: &Inventory) -> Result<PowerBreakdown, EngineError<L::Error>> {
        let table = self.rank_table()?;
        Ok(power_breakdown(inventory, &table)?)
    }

    /// Rank odds scaled to an inventory's power.
    ///
    /// # Errors
    ///
    /// See [`Self::power`].
    pub fn odds(&self, inventory: &Inventory) -> Result<RankOdds, EngineError<L::Error>> {
        let table = self.rank_table()?;
        let power = estimate_power(inventory, &table)?;
        Ok(odds_for_power(power, &table)?)
    }

    /// Enemy for a battle node, scaled to the player's inventory.
    ///
    /// # Errors
    ///
    /// Returns an error if data cannot be loaded or the catalog cannot
    /// satisfy a drawn rank.
    pub fn enemy<S: RollSource + ?Sized>(
        &self,
        inventory: &Inventory,
        rolls: &mut S,
    ) -> Result<EnemyLoadout, EngineError<L::Error>> {
        let odds = self.odds(inventory)?;
        let catalog = self.catalog()?;
        Ok(generate_enemy_loadout(&catalog, &odds, rolls)?)
    }

    /// Treasure contents for a treasure node, scaled to the player's inventory.
    ///
    /// # Errors
    ///
    /// See [`Self::enemy`].
    pub fn treasure<S: RollSource + ?Sized>(
        &self,
        inventory: &Inventory,
        spec: &TreasureSpec,
        rolls: &mut S,
    ) -> Result<Reward, EngineError<L::Error>> {
        let odds = self.odds(inventory)?;
        let catalog = self.catalog()?;
        Ok(roll_reward(&catalog, &odds, spec, rolls)?)
    }
}
