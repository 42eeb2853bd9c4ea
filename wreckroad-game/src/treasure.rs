//! Part rewards for treasure nodes.
use serde::{Deserialize, Serialize};

use crate::constants::{LOG_TARGET_LOADOUT, TREASURE_CHOICE_COUNT};
use crate::error::{ConfigError, MapResult};
use crate::parts::{Catalog, Part, Rank, SlotType};
use crate::ranks::RankOdds;
use crate::rng::{RollSource, pick_one};
use crate::sampler;

/// What a treasure may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreasureSpec {
    #[serde(default)]
    pub rank_floor: Option<Rank>,
    #[serde(default)]
    pub rank_ceiling: Option<Rank>,
    /// Restrict rewards to one equipment slot.
    #[serde(default)]
    pub slot: Option<SlotType>,
    /// Offer several parts to pick from instead of one random part.
    #[serde(default)]
    pub player_chooses: bool,
}

impl TreasureSpec {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedRanks`] when the floor outranks the ceiling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(floor), Some(ceiling)) = (self.rank_floor, self.rank_ceiling)
            && floor > ceiling
        {
            return Err(ConfigError::InvertedRanks { floor, ceiling });
        }
        Ok(())
    }

    /// Drop the odds of ranks outside the floor and ceiling.
    #[must_use]
    pub fn trim_odds(&self, odds: &RankOdds) -> RankOdds {
        odds.iter()
            .filter(|(rank, _)| self.rank_floor.is_none_or(|floor| **rank >= floor))
            .filter(|(rank, _)| self.rank_ceiling.is_none_or(|ceiling| **rank <= ceiling))
            .map(|(rank, weight)| (*rank, *weight))
            .collect()
    }

    fn candidates<'a>(&self, catalog: &'a Catalog, rank: Rank) -> Result<Vec<&'a Part>, ConfigError> {
        let pool = catalog.query(self.slot, rank);
        if pool.is_empty() {
            return Err(match self.slot {
                Some(slot) => ConfigError::empty_slot(slot, rank),
                None => ConfigError::EmptyCandidates {
                    slot: "reward",
                    rank,
                },
            });
        }
        Ok(pool)
    }
}

/// Rolled treasure contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "parts", rename_all = "snake_case")]
pub enum Reward {
    /// One part handed over directly.
    Single(Part),
    /// Distinct parts for the player to pick from.
    Choice(Vec<Part>),
}

impl Reward {
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        match self {
            Self::Single(part) => std::slice::from_ref(part),
            Self::Choice(parts) => parts,
        }
    }
}

/// Roll treasure contents.
///
/// Choice mode draws a fresh rank per offer and skips a draw whose rank has
/// no part left that is not already on offer, so the offer can shrink.
///
/// # Errors
///
/// Returns [`ConfigError::InvertedRanks`] for a bad spec,
/// [`ConfigError::EmptyCandidates`] when a drawn rank has no catalog part, and
/// distribution errors when trimming leaves nothing to draw.
pub fn roll_reward<S: RollSource + ?Sized>(
    catalog: &Catalog,
    odds: &RankOdds,
    spec: &TreasureSpec,
    rolls: &mut S,
) -> MapResult<Reward> {
    spec.validate()?;
    let odds = spec.trim_odds(odds);

    if !spec.player_chooses {
        let rank = sampler::draw(&odds, rolls)?;
        let pool = spec.candidates(catalog, rank)?;
        let part = pick_one(&pool, rolls).ok_or(ConfigError::EmptyCandidates {
            slot: "reward",
            rank,
        })?;
        log::debug!(target: LOG_TARGET_LOADOUT, "treasure holds {part}");
        return Ok(Reward::Single((*part).clone()));
    }

    let mut offers: Vec<Part> = Vec::with_capacity(TREASURE_CHOICE_COUNT);
    for _ in 0..TREASURE_CHOICE_COUNT {
        let rank = sampler::draw(&odds, rolls)?;
        let unused: Vec<&Part> = spec
            .candidates(catalog, rank)?
            .into_iter()
            .filter(|part| offers.iter().all(|offered| offered.id != part.id))
            .collect();
        if let Some(part) = pick_one(&unused, rolls) {
            offers.push((*part).clone());
        }
    }
    log::debug!(
        target: LOG_TARGET_LOADOUT,
        "treasure offers {} parts",
        offers.len()
    );
    Ok(Reward::Choice(offers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::rng::ScriptedRolls;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn flat_odds() -> RankOdds {
        Rank::ALL.into_iter().map(|rank| (rank, 1.0)).collect()
    }

    #[test]
    fn trimming_keeps_ranks_inside_bounds() {
        let spec = TreasureSpec {
            rank_floor: Some(Rank::Uncommon),
            rank_ceiling: Some(Rank::Rare),
            ..TreasureSpec::default()
        };
        let trimmed = spec.trim_odds(&flat_odds());
        assert_eq!(trimmed.keys().copied().collect::<Vec<_>>(), vec![Rank::Uncommon, Rank::Rare]);
        assert_eq!(TreasureSpec::default().trim_odds(&flat_odds()).len(), 5);
    }

    #[test]
    fn random_mode_respects_slot_and_bounds() {
        let catalog = Catalog::default_catalog();
        let spec = TreasureSpec {
            rank_floor: Some(Rank::Rare),
            slot: Some(SlotType::Engine),
            ..TreasureSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let reward = roll_reward(&catalog, &flat_odds(), &spec, &mut rng).unwrap();
            let Reward::Single(part) = reward else {
                panic!("expected a single part");
            };
            assert_eq!(part.slot(), Some(SlotType::Engine));
            assert!(part.rank >= Rank::Rare);
        }
    }

    #[test]
    fn choice_mode_offers_distinct_parts_and_shrinks() {
        let catalog = Catalog::default_catalog();
        // one epic engine exists, so repeated epic draws cannot fill the offer
        let spec = TreasureSpec {
            rank_floor: Some(Rank::Epic),
            slot: Some(SlotType::Engine),
            player_chooses: true,
            ..TreasureSpec::default()
        };
        let mut rolls = ScriptedRolls::new([0.2, 0.5, 0.8], []);
        let reward = roll_reward(&catalog, &flat_odds(), &spec, &mut rolls).unwrap();
        assert_eq!(reward.parts().len(), 1);

        let spec = TreasureSpec {
            player_chooses: true,
            ..TreasureSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let reward = roll_reward(&catalog, &flat_odds(), &spec, &mut rng).unwrap();
        let parts = reward.parts();
        assert_eq!(parts.len(), 3);
        assert_ne!(parts[0].id, parts[1].id);
        assert_ne!(parts[1].id, parts[2].id);
        assert_ne!(parts[0].id, parts[2].id);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let spec = TreasureSpec {
            rank_floor: Some(Rank::Epic),
            rank_ceiling: Some(Rank::Common),
            ..TreasureSpec::default()
        };
        let mut rolls = ScriptedRolls::default();
        assert_eq!(
            roll_reward(&Catalog::default_catalog(), &flat_odds(), &spec, &mut rolls),
            Err(MapError::from(ConfigError::InvertedRanks {
                floor: Rank::Epic,
                ceiling: Rank::Common,
            }))
        );
    }
}
