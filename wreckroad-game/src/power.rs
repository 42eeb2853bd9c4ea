//! Player power estimation from owned equipment.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{CHASSIS_MULTIPLIER, TECH_POINT_WEIGHT};
use crate::error::{ConfigError, MapResult};
use crate::numbers::u32_to_f64;
use crate::parts::{Part, PartKind, SlotType};
use crate::ranks::RankTable;

/// Scoring weights for the power formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerWeights {
    #[serde(default = "PowerWeights::default_tech_point_weight")]
    pub tech_point_weight: f64,
    #[serde(default = "PowerWeights::default_chassis_multiplier")]
    pub chassis_multiplier: f64,
}

impl Default for PowerWeights {
    fn default() -> Self {
        Self {
            tech_point_weight: Self::default_tech_point_weight(),
            chassis_multiplier: Self::default_chassis_multiplier(),
        }
    }
}

impl PowerWeights {
    const fn default_tech_point_weight() -> f64 {
        TECH_POINT_WEIGHT
    }

    const fn default_chassis_multiplier() -> f64 {
        CHASSIS_MULTIPLIER
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Negative`] for a negative or non-finite weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tech_point_weight", self.tech_point_weight),
            ("chassis_multiplier", self.chassis_multiplier),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}

/// Parts a player owns, grouped the way the estimator consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub chassis: Vec<Part>,
    #[serde(default)]
    pub equipment: BTreeMap<SlotType, Vec<Part>>,
}

impl Inventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from loose parts, keeping their order.
    #[must_use]
    pub fn from_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        let mut inventory = Self::new();
        for part in parts {
            inventory.add(part);
        }
        inventory
    }

    /// Store a part under its chassis list or its slot.
    pub fn add(&mut self, part: Part) {
        match &part.kind {
            PartKind::Chassis { .. } => self.chassis.push(part),
            PartKind::Equipment { slot } => {
                self.equipment.entry(*slot).or_default().push(part);
            }
        }
    }

    #[must_use]
    pub fn equipment_for(&self, slot: SlotType) -> &[Part] {
        self.equipment.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// Largest capacity any owned chassis offers for each slot.
    #[must_use]
    pub fn max_slot_counts(&self) -> BTreeMap<SlotType, u32> {
        let mut counts = BTreeMap::new();
        for slots in self.chassis.iter().filter_map(Part::slots) {
            for (slot, capacity) in slots {
                let entry = counts.entry(*slot).or_insert(0);
                *entry = (*entry).max(*capacity);
            }
        }
        counts
    }
}

/// One scored contribution to the power total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerContribution {
    pub part_id: String,
    pub name: String,
    /// Slot the part filled, `None` for a chassis.
    pub slot: Option<SlotType>,
    pub score: f64,
}

/// Power total with the parts that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerBreakdown {
    pub equipment: Vec<PowerContribution>,
    /// Highest-rank chassis first, then highest tech-point chassis.
    pub chassis: [PowerContribution; 2],
    pub total: f64,
}

/// Estimate the player's power level.
///
/// # Errors
///
/// Returns [`ConfigError::NoChassisOwned`] for an inventory without a chassis
/// and rank-table errors for ranks the table does not cover.
pub fn estimate_power(inventory: &Inventory, table: &RankTable) -> MapResult<f64> {
    power_breakdown(inventory, table).map(|breakdown| breakdown.total)
}

/// Estimate the player's power level and report every scored part.
///
/// # Errors
///
/// See [`estimate_power`].
pub fn power_breakdown(inventory: &Inventory, table: &RankTable) -> MapResult<PowerBreakdown> {
    table.validate()?;
    let weights = table.power;
    let by_tech = first_max_by(&inventory.chassis, |part| part.tech_points)
        .ok_or(ConfigError::NoChassisOwned)?;
    let by_rank =
        first_max_by(&inventory.chassis, |part| part.rank).ok_or(ConfigError::NoChassisOwned)?;

    let mut equipment = Vec::new();
    for (slot, capacity) in inventory.max_slot_counts() {
        // Stable sort keeps inventory order among equal ranks, matching
        // repeated first-wins max picks.
        let mut owned: Vec<&Part> = inventory.equipment_for(slot).iter().collect();
        owned.sort_by(|a, b| b.rank.cmp(&a.rank));
        for part in owned.into_iter().take(usize::try_from(capacity).unwrap_or(usize::MAX)) {
            let score = table.rarity_weight(part.rank)?
                + weights.tech_point_weight * u32_to_f64(part.tech_points);
            equipment.push(contribution(part, Some(slot), score));
        }
    }

    let chassis_score = |part: &Part| -> MapResult<f64> {
        Ok(table.rarity_weight(part.rank)?
            + weights.tech_point_weight
                * u32_to_f64(part.tech_points)
                * weights.chassis_multiplier)
    };
    let chassis = [
        contribution(by_rank, None, chassis_score(by_rank)?),
        contribution(by_tech, None, chassis_score(by_tech)?),
    ];

    let total = equipment
        .iter()
        .chain(chassis.iter())
        .map(|entry| entry.score)
        .sum();
    Ok(PowerBreakdown {
        equipment,
        chassis,
        total,
    })
}

fn contribution(part: &Part, slot: Option<SlotType>, score: f64) -> PowerContribution {
    PowerContribution {
        part_id: part.id.clone(),
        name: part.name.clone(),
        slot,
        score,
    }
}

fn first_max_by<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Option<&T> {
    items
        .iter()
        .reduce(|best, item| if key(item) > key(best) { item } else { best })
}
