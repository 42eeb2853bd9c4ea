//! Vehicle parts, chassis and the part catalog.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

const DEFAULT_CATALOG_DATA: &str = include_str!("../assets/data/catalog.json");

/// Rarity tier, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Starter,
    Common,
    Uncommon,
    Rare,
    Epic,
}

impl Rank {
    pub const ALL: [Self; 5] = [
        Self::Starter,
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
        }
    }

    /// Parse a rank from its key, ignoring ASCII case.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rank| rank.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Equipment slot offered by a chassis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    Wheels,
    Engine,
    Bumper,
    ItemMount,
    Turret,
}

impl SlotType {
    pub const ALL: [Self; 5] = [
        Self::Wheels,
        Self::Engine,
        Self::Bumper,
        Self::ItemMount,
        Self::Turret,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Wheels => "wheels",
            Self::Engine => "engine",
            Self::Bumper => "bumper",
            Self::ItemMount => "item_mount",
            Self::Turret => "turret",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-slot capacity of a chassis.
pub type SlotCapacity = BTreeMap<SlotType, u32>;

/// Closed set of numeric stats a part contributes to a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartStats {
    #[serde(default)]
    pub integrity: i32,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub speed: i32,
    #[serde(default)]
    pub dodge: i32,
    #[serde(default)]
    pub energy_pool: i32,
    #[serde(default)]
    pub energy_regen: i32,
}

impl PartStats {
    /// Clamp every stat at zero, as a finished vehicle never reports negatives.
    #[must_use]
    pub fn floored(self) -> Self {
        Self {
            integrity: self.integrity.max(0),
            weight: self.weight.max(0),
            speed: self.speed.max(0),
            dodge: self.dodge.max(0),
            energy_pool: self.energy_pool.max(0),
            energy_regen: self.energy_regen.max(0),
        }
    }
}

impl Add for PartStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            integrity: self.integrity + rhs.integrity,
            weight: self.weight + rhs.weight,
            speed: self.speed + rhs.speed,
            dodge: self.dodge + rhs.dodge,
            energy_pool: self.energy_pool + rhs.energy_pool,
            energy_regen: self.energy_regen + rhs.energy_regen,
        }
    }
}

impl std::iter::Sum for PartStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// What a part is: a piece of equipment for one slot, or a chassis with slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartKind {
    Equipment { slot: SlotType },
    Chassis { slots: SlotCapacity },
}

/// A catalog or inventory part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub name: String,
    pub rank: Rank,
    /// Build cost for equipment; budget for a chassis.
    pub tech_points: u32,
    #[serde(default)]
    pub stats: PartStats,
    #[serde(flatten)]
    pub kind: PartKind,
}

impl Part {
    #[must_use]
    pub const fn is_chassis(&self) -> bool {
        matches!(self.kind, PartKind::Chassis { .. })
    }

    /// Slot this equipment fits, `None` for a chassis.
    #[must_use]
    pub const fn slot(&self) -> Option<SlotType> {
        match &self.kind {
            PartKind::Equipment { slot } => Some(*slot),
            PartKind::Chassis { .. } => None,
        }
    }

    /// Slot capacities of a chassis, `None` for equipment.
    #[must_use]
    pub const fn slots(&self) -> Option<&SlotCapacity> {
        match &self.kind {
            PartKind::Chassis { slots } => Some(slots),
            PartKind::Equipment { .. } => None,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {}", self.name, self.rank, self.slot().map_or("chassis", SlotType::key))?;
        write!(f, ", {} tp)", self.tech_points)
    }
}

/// Every part available for enemy builds and rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub parts: Vec<Part>,
}

impl Catalog {
    /// Load a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    /// Catalog compiled into the crate.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self::from_json(DEFAULT_CATALOG_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.id == id)
    }

    /// Chassis of the given rank, in catalog order.
    #[must_use]
    pub fn chassis_of(&self, rank: Rank) -> Vec<&Part> {
        self.parts
            .iter()
            .filter(|part| part.is_chassis() && part.rank == rank)
            .collect()
    }

    /// Equipment for `slot` of the given rank, in catalog order.
    #[must_use]
    pub fn equipment_of(&self, slot: SlotType, rank: Rank) -> Vec<&Part> {
        self.parts
            .iter()
            .filter(|part| part.slot() == Some(slot) && part.rank == rank)
            .collect()
    }

    /// Parts of any kind matching an optional slot filter and a rank.
    #[must_use]
    pub fn query(&self, slot: Option<SlotType>, rank: Rank) -> Vec<&Part> {
        match slot {
            Some(slot) => self.equipment_of(slot, rank),
            None => self.parts.iter().filter(|part| part.rank == rank).collect(),
        }
    }
}
