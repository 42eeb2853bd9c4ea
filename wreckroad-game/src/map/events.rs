//! Encounter-type assignment with escalating special odds.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::graph::{EncounterOdds, RunMap};
use super::node::{EncounterKind, NodeId};
use crate::constants::{
    BASE_ODDS_BATTLE, BASE_ODDS_CHOICE, BASE_ODDS_GARAGE, BASE_ODDS_MERCHANT, BASE_ODDS_TREASURE,
    LOG_TARGET_EVENTS, MAX_EVENT_REDRAWS, SPECIAL_ESCALATION,
};
use crate::error::{ConfigError, DistributionError, MapResult};
use crate::sampler::{self, check_weights};
use crate::rng::RollSource;

/// Shipped encounter weights.
#[must_use]
pub fn default_base_odds() -> EncounterOdds {
    EncounterOdds::from([
        (EncounterKind::Battle, BASE_ODDS_BATTLE),
        (EncounterKind::Choice, BASE_ODDS_CHOICE),
        (EncounterKind::Treasure, BASE_ODDS_TREASURE),
        (EncounterKind::Garage, BASE_ODDS_GARAGE),
        (EncounterKind::Merchant, BASE_ODDS_MERCHANT),
    ])
}

/// Live encounter weights for one assignment pass.
///
/// A special type resets to its base weight when picked; every other special
/// type is multiplied by the escalation factor after each pick.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsLedger {
    base: EncounterOdds,
    current: EncounterOdds,
    specials: BTreeSet<EncounterKind>,
    escalation: f64,
}

impl OddsLedger {
    #[must_use]
    pub fn new(base: EncounterOdds, specials: BTreeSet<EncounterKind>, escalation: f64) -> Self {
        Self {
            current: base.clone(),
            base,
            specials,
            escalation,
        }
    }

    #[must_use]
    pub const fn current(&self) -> &EncounterOdds {
        &self.current
    }

    #[must_use]
    pub fn weight(&self, kind: EncounterKind) -> f64 {
        self.current.get(&kind).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_special(&self, kind: EncounterKind) -> bool {
        self.specials.contains(&kind)
    }

    /// Draw from the current weights without updating them.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError`] when the current weights cannot be sampled.
    pub fn draw<S: RollSource + ?Sized>(&self, rolls: &mut S) -> Result<EncounterKind, DistributionError> {
        sampler::draw(&self.current, rolls)
    }

    /// Apply the reset and escalation rules for an accepted pick.
    pub fn record(&mut self, picked: EncounterKind) {
        if self.specials.contains(&picked)
            && let Some(base) = self.base.get(&picked)
        {
            self.current.insert(picked, *base);
        }
        for special in &self.specials {
            if *special == picked {
                continue;
            }
            if let Some(weight) = self.current.get_mut(special) {
                *weight *= self.escalation;
            }
        }
    }
}

/// One node's accepted type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentPick {
    pub node: NodeId,
    pub kind: EncounterKind,
    /// Weight the accepted type carried when it was drawn.
    pub weight: f64,
    /// Draws thrown away because a predecessor already had that special type.
    pub rejections: u32,
}

/// Trace of one assignment pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AssignmentReport {
    pub picks: Vec<AssignmentPick>,
}

impl AssignmentReport {
    #[must_use]
    pub fn total_rejections(&self) -> u32 {
        self.picks.iter().map(|pick| pick.rejections).sum()
    }

    #[must_use]
    pub fn count(&self, kind: EncounterKind) -> usize {
        self.picks.iter().filter(|pick| pick.kind == kind).count()
    }
}

/// Encounter assignment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAssigner {
    #[serde(default = "default_base_odds")]
    base_odds: EncounterOdds,
    #[serde(default = "EventAssigner::default_specials")]
    specials: BTreeSet<EncounterKind>,
    #[serde(default = "EventAssigner::default_escalation")]
    escalation: f64,
}

impl Default for EventAssigner {
    fn default() -> Self {
        Self {
            base_odds: default_base_odds(),
            specials: Self::default_specials(),
            escalation: Self::default_escalation(),
        }
    }
}

impl EventAssigner {
    /// Assigner over `base_odds` with the standard special types and escalation.
    ///
    /// # Errors
    ///
    /// See [`Self::validate`].
    pub fn new(base_odds: EncounterOdds) -> MapResult<Self> {
        let assigner = Self {
            base_odds,
            ..Self::default()
        };
        assigner.validate()?;
        Ok(assigner)
    }

    /// # Errors
    ///
    /// See [`Self::validate`].
    pub fn with_specials(mut self, specials: impl IntoIterator<Item = EncounterKind>) -> MapResult<Self> {
        self.specials = specials.into_iter().collect();
        self.validate()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`Self::validate`].
    pub fn with_escalation(mut self, escalation: f64) -> MapResult<Self> {
        self.escalation = escalation;
        self.validate()?;
        Ok(self)
    }

    fn default_specials() -> BTreeSet<EncounterKind> {
        EncounterKind::SPECIAL.into_iter().collect()
    }

    const fn default_escalation() -> f64 {
        SPECIAL_ESCALATION
    }

    #[must_use]
    pub const fn base_odds(&self) -> &EncounterOdds {
        &self.base_odds
    }

    /// Check the base odds and escalation factor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BossInBaseOdds`] when the base odds name the boss,
    /// [`ConfigError::EscalationTooSmall`] for a factor below 1.0, and
    /// [`DistributionError`] when the base odds cannot be sampled.
    pub fn validate(&self) -> MapResult<()> {
        if self.base_odds.contains_key(&EncounterKind::Boss) {
            return Err(ConfigError::BossInBaseOdds.into());
        }
        if !self.escalation.is_finite() || self.escalation < 1.0 {
            return Err(ConfigError::EscalationTooSmall(self.escalation).into());
        }
        check_weights(&self.base_odds)?;
        Ok(())
    }

    /// Type every untyped node, layer by layer and left to right.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::NoCompliantKind`] when every positively
    /// weighted type is a special already held by a predecessor.
    pub fn assign<S: RollSource + ?Sized>(
        &self,
        map: &mut RunMap,
        rolls: &mut S,
    ) -> MapResult<AssignmentReport> {
        self.validate()?;
        let mut ledger = OddsLedger::new(
            self.base_odds.clone(),
            self.specials.clone(),
            self.escalation,
        );
        let mut report = AssignmentReport::default();
        let order: Vec<NodeId> = map
            .nodes()
            .filter(|node| node.kind.is_none())
            .map(|node| node.id)
            .collect();

        for id in order {
            let blocked: BTreeSet<EncounterKind> = map
                .predecessors(id)
                .iter()
                .filter_map(|pred| map.node(*pred).and_then(|node| node.kind))
                .filter(|kind| ledger.is_special(*kind))
                .collect();
            let (kind, rejections) = pick_compliant(&ledger, &blocked, id, rolls)?;
            let weight = ledger.weight(kind);
            if let Some(node) = map.node_mut(id) {
                node.kind = Some(kind);
            }
            ledger.record(kind);
            log::trace!(
                target: LOG_TARGET_EVENTS,
                "node {id}: {kind} (weight {weight:.3}, {rejections} rejected)"
            );
            report.picks.push(AssignmentPick {
                node: id,
                kind,
                weight,
                rejections,
            });
        }

        map.base_odds = self.base_odds.clone();
        log::debug!(
            target: LOG_TARGET_EVENTS,
            "typed {} nodes with {} rejected draws",
            report.picks.len(),
            report.total_rejections()
        );
        Ok(report)
    }
}

/// Redraw until the pick is not a blocked special.
///
/// After `MAX_EVENT_REDRAWS` rejections the draw is taken from the compliant
/// types alone, which has the same distribution as continued redrawing.
fn pick_compliant<S: RollSource + ?Sized>(
    ledger: &OddsLedger,
    blocked: &BTreeSet<EncounterKind>,
    id: NodeId,
    rolls: &mut S,
) -> MapResult<(EncounterKind, u32)> {
    let compliant: EncounterOdds = ledger
        .current()
        .iter()
        .filter(|(kind, weight)| **weight > 0.0 && !blocked.contains(kind))
        .map(|(kind, weight)| (*kind, *weight))
        .collect();
    if compliant.is_empty() {
        return Err(DistributionError::NoCompliantKind {
            node: id.to_string(),
        }
        .into());
    }

    let mut rejections = 0_u32;
    while rejections < MAX_EVENT_REDRAWS {
        let kind = ledger.draw(rolls)?;
        if !blocked.contains(&kind) {
            return Ok((kind, rejections));
        }
        rejections += 1;
    }
    Ok((sampler::draw(&compliant, rolls)?, rejections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::map::builder::{LayerGraphBuilder, MapConfig};
    use crate::rng::ScriptedRolls;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ledger_escalates_unpicked_specials_and_resets_the_pick() {
        let mut ledger = OddsLedger::new(
            default_base_odds(),
            EncounterKind::SPECIAL.into_iter().collect(),
            1.2,
        );
        ledger.record(EncounterKind::Battle);
        assert!(close(ledger.weight(EncounterKind::Treasure), 0.12));
        assert!(close(ledger.weight(EncounterKind::Garage), 0.24));
        assert!(close(ledger.weight(EncounterKind::Battle), 0.6));

        ledger.record(EncounterKind::Garage);
        assert!(close(ledger.weight(EncounterKind::Garage), 0.2), "reset to base");
        assert!(close(ledger.weight(EncounterKind::Treasure), 0.144));
        assert!(close(ledger.weight(EncounterKind::Merchant), 0.144));
    }

    #[test]
    fn boss_and_weak_escalation_are_rejected() {
        let mut odds = default_base_odds();
        odds.insert(EncounterKind::Boss, 1.0);
        assert_eq!(
            EventAssigner::new(odds).unwrap_err(),
            MapError::from(ConfigError::BossInBaseOdds)
        );
        assert!(EventAssigner::default().with_escalation(0.9).is_err());
        assert!(matches!(
            EventAssigner::new(EncounterOdds::new()),
            Err(MapError::InvalidDistribution(DistributionError::Empty))
        ));
    }

    #[test]
    fn all_blocked_specials_fail_instead_of_looping() {
        let builder = LayerGraphBuilder::new(MapConfig::new(2, 2, 1.0)).unwrap();
        let mut map = builder.build(&mut ScriptedRolls::default());
        let assigner =
            EventAssigner::new(EncounterOdds::from([(EncounterKind::Garage, 1.0)])).unwrap();
        let err = assigner
            .assign(&mut map, &mut ScriptedRolls::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MapError::InvalidDistribution(DistributionError::NoCompliantKind { .. })
        ));
    }

    #[test]
    fn blocked_special_is_redrawn() {
        // two columns, density 1.0: every node links up, diagonals where allowed
        let builder = LayerGraphBuilder::new(MapConfig::new(2, 2, 1.0)).unwrap();
        let mut map = builder.build(&mut ScriptedRolls::default());
        let odds = EncounterOdds::from([(EncounterKind::Battle, 1.0), (EncounterKind::Treasure, 1.0)]);
        let assigner = EventAssigner::new(odds).unwrap();
        // layer 0 draws treasure twice; layer 1 draws treasure (blocked), then battle
        let mut rolls = ScriptedRolls::new([0.9, 0.9, 0.9, 0.1, 0.1], []);
        let report = assigner.assign(&mut map, &mut rolls).unwrap();
        assert_eq!(report.picks.len(), 4);
        assert_eq!(report.picks[2].rejections, 1);
        assert_eq!(report.picks[2].kind, EncounterKind::Battle);
        assert!(map.audit().is_empty());
        assert!(map.untyped().is_empty());
    }

    #[test]
    fn seeded_assignment_never_repeats_specials_along_edges() {
        let builder = LayerGraphBuilder::new(MapConfig::new(7, 15, 0.35)).unwrap();
        let assigner = EventAssigner::default();
        for seed in 0..40 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut map = builder.build(&mut rng);
            let report = assigner.assign(&mut map, &mut rng).unwrap();
            assert_eq!(report.picks.len(), map.node_count() - 1);
            assert!(map.audit().is_empty(), "seed {seed}: {:?}", map.audit());
            assert_eq!(map.boss().and_then(|boss| boss.kind), Some(EncounterKind::Boss));
            assert_eq!(report.count(EncounterKind::Boss), 0);
        }
    }
}
