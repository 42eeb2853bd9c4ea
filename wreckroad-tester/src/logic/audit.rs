use anyhow::Result;
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::time::Instant;
use wreckroad_game::numbers::usize_to_f64;
use wreckroad_game::{DataLoader, EncounterKind, MapEngine, MapOffer, RandomChooser, walk};

use super::seeds::{SeedInfo, code_suffix};

/// Audit outcome for one generated map.
#[derive(Debug, Clone, Serialize)]
pub struct MapRecord {
    pub seed: u64,
    pub code: Option<String>,
    pub offer: usize,
    pub width: usize,
    pub height: usize,
    pub density: f64,
    pub nodes: usize,
    pub edges: usize,
    pub kinds: BTreeMap<EncounterKind, usize>,
    pub rejections: u32,
    pub fingerprint: u64,
    pub problems: Vec<String>,
}

impl MapRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Totals across a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub maps: usize,
    pub failed: usize,
    pub mean_nodes: f64,
    pub mean_edges: f64,
    /// Share of typed non-boss nodes per encounter kind.
    pub kind_share: BTreeMap<EncounterKind, f64>,
    pub failures: Vec<String>,
    pub elapsed_ms: u128,
}

impl AuditSummary {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failed == 0
    }
}

pub struct MapAuditor<'a, L: DataLoader> {
    engine: &'a MapEngine<L>,
    verbose: bool,
}

impl<'a, L: DataLoader> MapAuditor<'a, L> {
    pub const fn new(engine: &'a MapEngine<L>, verbose: bool) -> Self {
        Self { engine, verbose }
    }

    /// Generate every offer for each seed and iteration and check it.
    pub fn sweep(
        &self,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Result<(Vec<MapRecord>, AuditSummary)> {
        let start = Instant::now();
        let mut records = Vec::new();
        for info in seeds {
            for iteration in 0..iterations.max(1) {
                let seed = info.iteration_seed(iteration);
                let offers = self.engine.offers(seed)?;
                let replay = self.engine.offers(seed)?;
                for (idx, offer) in offers.iter().enumerate() {
                    let mut record = inspect(seed, idx, offer);
                    let replayed = replay.get(idx).map(|again| again.map.fingerprint());
                    if replayed != Some(record.fingerprint) {
                        record
                            .problems
                            .push("same seed produced a different map".to_string());
                    }
                    if self.verbose {
                        let status = if record.passed() { "ok".green() } else { "FAIL".red() };
                        println!(
                            "🗺️  seed {seed} offer {idx}: {}x{} {} nodes {status}",
                            record.width, record.height, record.nodes
                        );
                    }
                    records.push(record);
                }
            }
        }
        let summary = summarize(&records, start.elapsed().as_millis());
        Ok((records, summary))
    }
}

fn inspect(seed: u64, offer_idx: usize, offer: &MapOffer) -> MapRecord {
    let map = &offer.map;
    let mut problems: Vec<String> = map
        .audit()
        .into_iter()
        .map(|violation| format!("{violation:?}"))
        .collect();
    if !map.untyped().is_empty() {
        problems.push(format!("{} untyped nodes", map.untyped().len()));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut chooser = RandomChooser::new(&mut rng);
    let log = walk(map, &mut chooser, |_| ControlFlow::Continue(()));
    if !log.reached_boss() {
        problems.push(format!(
            "random walk ended {:?} at {:?}",
            log.outcome,
            log.path.last()
        ));
    }

    MapRecord {
        seed,
        code: wreckroad_game::share_code_for(seed),
        offer: offer_idx,
        width: map.width(),
        height: map.height(),
        density: map.density().min(),
        nodes: map.node_count(),
        edges: map.edge_count(),
        kinds: map.kind_counts(),
        rejections: offer.report.total_rejections(),
        fingerprint: map.fingerprint(),
        problems,
    }
}

fn summarize(records: &[MapRecord], elapsed_ms: u128) -> AuditSummary {
    let maps = records.len();
    let denom = usize_to_f64(maps.max(1));
    let mut kind_totals: BTreeMap<EncounterKind, usize> = BTreeMap::new();
    for record in records {
        for (kind, count) in &record.kinds {
            if *kind != EncounterKind::Boss {
                *kind_totals.entry(*kind).or_default() += count;
            }
        }
    }
    let typed: usize = kind_totals.values().sum();
    let kind_share = kind_totals
        .into_iter()
        .map(|(kind, count)| (kind, usize_to_f64(count) / usize_to_f64(typed.max(1))))
        .collect();

    let failures = records
        .iter()
        .filter(|record| !record.passed())
        .map(|record| {
            format!(
                "seed {}{} offer {}: {}",
                record.seed,
                code_suffix(record.code.as_deref()),
                record.offer,
                record.problems.join("; ")
            )
        })
        .collect::<Vec<_>>();

    AuditSummary {
        maps,
        failed: failures.len(),
        mean_nodes: records.iter().map(|r| usize_to_f64(r.nodes)).sum::<f64>() / denom,
        mean_edges: records.iter().map(|r| usize_to_f64(r.edges)).sum::<f64>() / denom,
        kind_share,
        failures,
        elapsed_ms,
    }
}
