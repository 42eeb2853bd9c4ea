//! Rank table and the power-scaled rank odds model.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{ABOVE_CEILING_ODDS, BELOW_FLOOR_ODDS, IN_BAND_ODDS};
use crate::error::{ConfigError, MapResult};
use crate::parts::Rank;
use crate::power::PowerWeights;

const DEFAULT_RANKS_DATA: &str = include_str!("../assets/data/ranks.json");

/// Selection weight per rank, ready for [`crate::sampler::draw`].
pub type RankOdds = BTreeMap<Rank, f64>;

/// Power thresholds and odds divisor for one rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankTier {
    /// Power at which this rank becomes the weakest rank still favoured.
    pub floor: f64,
    /// Power at which this rank joins the favoured band.
    pub ceiling: f64,
    /// Divides every odds value for this rank; also the rank's rarity weight.
    #[serde(default = "RankTier::default_multiplier")]
    pub multiplier: f64,
}

impl RankTier {
    const fn default_multiplier() -> f64 {
        1.0
    }
}

/// Complete rank configuration: one tier per rank plus power scoring weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    pub tiers: BTreeMap<Rank, RankTier>,
    #[serde(default)]
    pub power: PowerWeights,
}

impl Default for RankTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RankTable {
    /// Load the rank table compiled into the crate, falling back to [`Self::builtin`].
    #[must_use]
    pub fn default_table() -> Self {
        serde_json::from_str(DEFAULT_RANKS_DATA).unwrap_or_else(|_| Self::builtin())
    }

    /// Code copy of the shipped rank table.
    #[must_use]
    pub fn builtin() -> Self {
        let tier = |floor, ceiling, multiplier| RankTier {
            floor,
            ceiling,
            multiplier,
        };
        Self {
            tiers: BTreeMap::from([
                (Rank::Starter, tier(0.0, 0.0, 0.5)),
                (Rank::Common, tier(5.0, 2.0, 1.0)),
                (Rank::Uncommon, tier(15.0, 8.0, 1.5)),
                (Rank::Rare, tier(45.0, 25.0, 2.0)),
                (Rank::Epic, tier(90.0, 50.0, 3.0)),
            ]),
            power: PowerWeights::default(),
        }
    }

    /// Validate that every rank is configured with usable numbers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRank`] for an absent rank and
    /// [`ConfigError::InvalidRankTier`] for a non-finite threshold or a
    /// multiplier that is not strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rank in Rank::ALL {
            let tier = self.tier(rank)?;
            for (field, value) in [("floor", tier.floor), ("ceiling", tier.ceiling)] {
                if !value.is_finite() {
                    return Err(ConfigError::InvalidRankTier { rank, field, value });
                }
            }
            if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
                return Err(ConfigError::InvalidRankTier {
                    rank,
                    field: "multiplier",
                    value: tier.multiplier,
                });
            }
        }
        self.power.validate()
    }

    /// Tier for `rank`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRank`] when the table has no entry.
    pub fn tier(&self, rank: Rank) -> Result<&RankTier, ConfigError> {
        self.tiers.get(&rank).ok_or(ConfigError::MissingRank(rank))
    }

    /// Rarity weight used by the power estimator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRank`] when the table has no entry.
    pub fn rarity_weight(&self, rank: Rank) -> Result<f64, ConfigError> {
        self.tier(rank).map(|tier| tier.multiplier)
    }
}

/// Inclusive range of ranks favoured at a power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankBand {
    pub floor: Rank,
    pub ceiling: Rank,
}

impl RankBand {
    #[must_use]
    pub fn contains(&self, rank: Rank) -> bool {
        (self.floor..=self.ceiling).contains(&rank)
    }
}

/// Locate the favoured band for `power`.
///
/// The floor is the strongest rank whose `floor` threshold is met and the
/// ceiling the strongest rank whose `ceiling` threshold is met; either falls
/// back to the weakest rank when nothing qualifies.
///
/// # Errors
///
/// Returns an error when the table fails [`RankTable::validate`].
pub fn rank_band(power: f64, table: &RankTable) -> MapResult<RankBand> {
    table.validate()?;
    let mut band = RankBand {
        floor: Rank::Starter,
        ceiling: Rank::Starter,
    };
    for rank in Rank::ALL {
        let tier = table.tier(rank)?;
        if tier.floor <= power {
            band.floor = rank;
        }
        if tier.ceiling <= power {
            band.ceiling = rank;
        }
    }
    Ok(band)
}

/// Rank odds for a power level.
///
/// In-band ranks get `80 / multiplier`, ranks above the band `15 / multiplier`,
/// and every rank below the floor shares the smallest of their
/// `5 / multiplier` values.
///
/// # Errors
///
/// Returns an error when the table fails [`RankTable::validate`].
pub fn odds_for_power(power: f64, table: &RankTable) -> MapResult<RankOdds> {
    let band = rank_band(power, table)?;
    let mut odds = RankOdds::new();
    for rank in Rank::ALL {
        let multiplier = table.tier(rank)?.multiplier;
        let base = if band.contains(rank) {
            IN_BAND_ODDS
        } else if rank < band.floor {
            BELOW_FLOOR_ODDS
        } else {
            ABOVE_CEILING_ODDS
        };
        odds.insert(rank, base / multiplier);
    }
    let below_floor = odds
        .range(..band.floor)
        .map(|(_, value)| *value)
        .reduce(f64::min);
    if let Some(lowest) = below_floor {
        for (_, value) in odds.range_mut(..band.floor) {
            *value = lowest;
        }
    }
    log::trace!(
        target: crate::constants::LOG_TARGET_LOADOUT,
        "rank odds at power {power:.1}: band {}..={} -> {odds:?}",
        band.floor,
        band.ceiling
    );
    Ok(odds)
}
