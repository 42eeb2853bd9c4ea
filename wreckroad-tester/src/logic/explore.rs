use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use wreckroad_game::{
    Chooser, DataLoader, EncounterKind, Inventory, MapEngine, PowerBreakdown, Rank, RankOdds,
    RngBundle, TreasureSpec, WalkOutcome, odds_for_power, rank_band, render_map, walk,
};

use super::seeds::SeedInfo;

/// Default power levels for the odds table: the fixture inventories plus
/// each rank threshold.
pub const DEFAULT_POWERS: [f64; 8] = [0.0, 3.0, 8.0, 14.5, 27.7, 45.0, 90.0, 140.0];

pub const STARTER_LOADOUT: [&str; 3] = ["rustbucket", "moped_engine", "bicycle_wheels"];

/// One rendered map offer.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMap {
    pub seed: u64,
    pub code: Option<String>,
    pub offer: usize,
    pub width: usize,
    pub height: usize,
    pub density: f64,
    pub kinds: BTreeMap<EncounterKind, usize>,
    pub rendering: String,
}

/// Odds at one power level.
#[derive(Debug, Clone, Serialize)]
pub struct OddsRow {
    pub power: f64,
    pub floor: Rank,
    pub ceiling: Rank,
    pub odds: RankOdds,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerReport {
    pub parts: Vec<String>,
    pub breakdown: PowerBreakdown,
    pub odds: RankOdds,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalkRecord {
    pub seed: u64,
    pub code: Option<String>,
    pub path: Vec<String>,
    pub outcome: WalkOutcome,
    pub encounters: Vec<String>,
    pub final_power: f64,
}

pub fn generate_maps<L: DataLoader>(
    engine: &MapEngine<L>,
    seeds: &[SeedInfo],
) -> Result<Vec<GeneratedMap>> {
    let mut maps = Vec::new();
    for info in seeds {
        let offers = engine
            .offers(info.seed)
            .with_context(|| format!("generating offers for seed {}", info.seed))?;
        for (offer_idx, offer) in offers.into_iter().enumerate() {
            maps.push(GeneratedMap {
                seed: info.seed,
                code: info.share_code(),
                offer: offer_idx,
                width: offer.map.width(),
                height: offer.map.height(),
                density: offer.map.density().min(),
                kinds: offer.map.kind_counts(),
                rendering: render_map(&offer.map),
            });
        }
    }
    Ok(maps)
}

pub fn odds_table<L: DataLoader>(engine: &MapEngine<L>, powers: &[f64]) -> Result<Vec<OddsRow>> {
    let table = engine.rank_table()?;
    powers
        .iter()
        .map(|&power| -> Result<OddsRow> {
            let band = rank_band(power, &table)?;
            Ok(OddsRow {
                power,
                floor: band.floor,
                ceiling: band.ceiling,
                odds: odds_for_power(power, &table)?,
            })
        })
        .collect()
}

pub fn load_inventory<L: DataLoader>(
    engine: &MapEngine<L>,
    part_ids: &[String],
) -> Result<Inventory> {
    let catalog = engine.catalog()?;
    let mut inventory = Inventory::new();
    for id in part_ids {
        let part = catalog
            .get(id)
            .with_context(|| format!("catalog has no part named {id}"))?;
        inventory.add(part.clone());
    }
    Ok(inventory)
}

pub fn power_report<L: DataLoader>(
    engine: &MapEngine<L>,
    part_ids: &[String],
) -> Result<PowerReport> {
    let inventory = load_inventory(engine, part_ids)?;
    Ok(PowerReport {
        parts: part_ids.to_vec(),
        breakdown: engine.power(&inventory)?,
        odds: engine.odds(&inventory)?,
    })
}

/// Walk the first offer of a seed, fighting on battle and boss nodes and
/// collecting treasure into the inventory.
pub fn walk_run<L: DataLoader, C: Chooser + ?Sized>(
    engine: &MapEngine<L>,
    info: &SeedInfo,
    part_ids: &[String],
    chooser: &mut C,
) -> Result<WalkRecord> {
    let mut inventory = load_inventory(engine, part_ids)?;
    let offers = engine.offers(info.seed)?;
    let map = &offers
        .first()
        .with_context(|| format!("seed {} produced no maps", info.seed))?
        .map;

    let bundle = RngBundle::from_user_seed(info.seed);
    let mut encounters = Vec::new();
    let mut failure = None;
    let log = walk(map, chooser, |node| {
        let step = match node.kind {
            Some(EncounterKind::Battle | EncounterKind::Boss) => engine
                .enemy(&inventory, &mut *bundle.loadout())
                .map(|enemy| {
                    format!(
                        "{}: {} with {} parts ({}/{} tp)",
                        node.id,
                        enemy.chassis.name,
                        enemy.parts.len(),
                        enemy.tech_points_used,
                        enemy.budget()
                    )
                }),
            Some(EncounterKind::Treasure) => engine
                .treasure(&inventory, &TreasureSpec::default(), &mut *bundle.rewards())
                .map(|reward| {
                    let names: Vec<&str> =
                        reward.parts().iter().map(|part| part.name.as_str()).collect();
                    for part in reward.parts() {
                        inventory.add(part.clone());
                    }
                    format!("{}: treasure {}", node.id, names.join(", "))
                }),
            Some(kind) => Ok(format!("{}: {kind}", node.id)),
            None => Ok(format!("{}: untyped", node.id)),
        };
        match step {
            Ok(line) => {
                encounters.push(line);
                ControlFlow::Continue(())
            }
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        }
    });
    if let Some(err) = failure {
        return Err(err).context("resolving an encounter");
    }

    Ok(WalkRecord {
        seed: info.seed,
        code: info.share_code(),
        path: log.path.iter().map(ToString::to_string).collect(),
        outcome: log.outcome,
        encounters,
        final_power: engine.power(&inventory)?.total,
    })
}
