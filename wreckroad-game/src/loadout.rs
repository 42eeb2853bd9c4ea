//! Enemy vehicle generation for battle nodes.
use serde::Serialize;

use crate::constants::LOG_TARGET_LOADOUT;
use crate::error::{ConfigError, MapResult};
use crate::parts::{Catalog, Part, PartStats, SlotType};
use crate::ranks::RankOdds;
use crate::rng::{RollSource, pick_one, shuffle_with};
use crate::sampler;

/// An enemy vehicle: one chassis plus the parts that fit its tech-point budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnemyLoadout {
    pub chassis: Part,
    pub parts: Vec<Part>,
    /// One entry per slot capacity left empty because nothing fit the budget.
    pub unfilled: Vec<SlotType>,
    pub tech_points_used: u32,
}

impl EnemyLoadout {
    /// Chassis budget.
    #[must_use]
    pub const fn budget(&self) -> u32 {
        self.chassis.tech_points
    }

    /// Sum of chassis and part stats, floored at zero.
    #[must_use]
    pub fn stats(&self) -> PartStats {
        let parts: PartStats = self.parts.iter().map(|part| part.stats).sum();
        (self.chassis.stats + parts).floored()
    }
}

/// Build an enemy from the catalog.
///
/// The chassis rank and every part rank are drawn from `odds`. Slot types are
/// visited in shuffled order so early slots do not always claim the budget.
///
/// # Errors
///
/// Returns [`ConfigError::EmptyCandidates`] when the catalog has no chassis
/// for a drawn rank or no part at all for a drawn (slot, rank) pair, and
/// distribution errors for unusable odds.
pub fn generate_enemy_loadout<S: RollSource + ?Sized>(
    catalog: &Catalog,
    odds: &RankOdds,
    rolls: &mut S,
) -> MapResult<EnemyLoadout> {
    let chassis_rank = sampler::draw(odds, rolls)?;
    let chassis_pool = catalog.chassis_of(chassis_rank);
    let chassis = pick_one(&chassis_pool, rolls)
        .copied()
        .ok_or(ConfigError::empty_chassis(chassis_rank))?;
    let Some(capacity) = chassis.slots() else {
        return Err(ConfigError::WrongPartKind {
            id: chassis.id.clone(),
            expected: "chassis",
        }
        .into());
    };

    let mut slots: Vec<(SlotType, u32)> = capacity.iter().map(|(slot, n)| (*slot, *n)).collect();
    shuffle_with(&mut slots, rolls);

    let budget = chassis.tech_points;
    let mut used = 0_u32;
    let mut parts = Vec::new();
    let mut unfilled = Vec::new();
    for (slot, count) in slots {
        for _ in 0..count {
            let rank = sampler::draw(odds, rolls)?;
            let pool = catalog.equipment_of(slot, rank);
            if pool.is_empty() {
                return Err(ConfigError::empty_slot(slot, rank).into());
            }
            let fitting: Vec<&Part> = pool
                .into_iter()
                .filter(|part| used.saturating_add(part.tech_points) <= budget)
                .collect();
            match pick_one(&fitting, rolls) {
                Some(part) => {
                    used += part.tech_points;
                    parts.push((*part).clone());
                }
                None => unfilled.push(slot),
            }
        }
    }

    log::debug!(
        target: LOG_TARGET_LOADOUT,
        "enemy {} ({chassis_rank}): {} parts, {used}/{budget} tp, {} unfilled",
        chassis.name,
        parts.len(),
        unfilled.len()
    );
    Ok(EnemyLoadout {
        chassis: chassis.clone(),
        parts,
        unfilled,
        tech_points_used: used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::parts::{PartKind, Rank};
    use crate::ranks::{RankTable, odds_for_power};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn loadouts_stay_within_budget() {
        let catalog = Catalog::default_catalog();
        let table = RankTable::builtin();
        for power in [0.0, 14.5, 27.7, 95.0] {
            let odds = odds_for_power(power, &table).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(power.to_bits());
            for _ in 0..25 {
                let loadout = generate_enemy_loadout(&catalog, &odds, &mut rng).unwrap();
                let spent: u32 = loadout.parts.iter().map(|part| part.tech_points).sum();
                assert_eq!(spent, loadout.tech_points_used);
                assert!(spent <= loadout.budget());
                let capacity: u32 = loadout.chassis.slots().unwrap().values().sum();
                let placed = u32::try_from(loadout.parts.len() + loadout.unfilled.len()).unwrap();
                assert_eq!(placed, capacity);
            }
        }
    }

    #[test]
    fn starter_only_odds_fill_every_slot() {
        let catalog = Catalog::default_catalog();
        let odds = RankOdds::from([(Rank::Starter, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let loadout = generate_enemy_loadout(&catalog, &odds, &mut rng).unwrap();
        assert_eq!(loadout.chassis.id, "rustbucket");
        assert_eq!(loadout.parts.len(), 10);
        assert!(loadout.unfilled.is_empty());
        assert_eq!(loadout.tech_points_used, 10);
        let stats = loadout.stats();
        assert!(stats.integrity > loadout.chassis.stats.integrity);
    }

    #[test]
    fn missing_slot_candidates_are_an_error() {
        let catalog = Catalog::from_parts(
            Catalog::default_catalog()
                .parts
                .into_iter()
                .filter(|part| !(part.slot() == Some(SlotType::Turret) && part.rank == Rank::Starter))
                .collect(),
        );
        let odds = RankOdds::from([(Rank::Starter, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let err = generate_enemy_loadout(&catalog, &odds, &mut rng).unwrap_err();
        assert_eq!(err, MapError::from(ConfigError::empty_slot(SlotType::Turret, Rank::Starter)));
    }

    #[test]
    fn missing_chassis_rank_is_an_error() {
        let catalog = Catalog::from_parts(
            Catalog::default_catalog()
                .parts
                .into_iter()
                .filter(|part| !matches!(part.kind, PartKind::Chassis { .. }))
                .collect(),
        );
        let odds = RankOdds::from([(Rank::Epic, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            generate_enemy_loadout(&catalog, &odds, &mut rng).unwrap_err(),
            MapError::from(ConfigError::empty_chassis(Rank::Epic))
        );
    }
}
