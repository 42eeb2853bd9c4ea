//! Traversal of a finished map, driven by an external chooser.
use serde::Serialize;
use std::ops::ControlFlow;

use crate::map::{EncounterKind, Node, NodeId, RunMap};
use crate::rng::RollSource;

/// Blocking selection prompt.
pub trait Chooser {
    /// Pick one of `options`, or `None` to give up.
    fn select_one(&mut self, prompt: &str, options: &[String]) -> Option<usize>;
}

impl<F> Chooser for F
where
    F: FnMut(&str, &[String]) -> Option<usize>,
{
    fn select_one(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        self(prompt, options)
    }
}

/// Picks uniformly at random; used for automated walks.
#[derive(Debug)]
pub struct RandomChooser<'a, S: RollSource + ?Sized> {
    rolls: &'a mut S,
}

impl<'a, S: RollSource + ?Sized> RandomChooser<'a, S> {
    pub fn new(rolls: &'a mut S) -> Self {
        Self { rolls }
    }
}

impl<S: RollSource + ?Sized> Chooser for RandomChooser<'_, S> {
    fn select_one(&mut self, _prompt: &str, options: &[String]) -> Option<usize> {
        if options.is_empty() {
            return None;
        }
        Some(self.rolls.roll_between(0, options.len() - 1))
    }
}

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkOutcome {
    /// The boss node was entered and visited.
    BossReached,
    /// The chooser declined to pick.
    Abandoned,
    /// The visitor stopped the run.
    Stopped,
}

/// Path taken through a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkLog {
    pub path: Vec<NodeId>,
    pub outcome: WalkOutcome,
}

impl WalkLog {
    #[must_use]
    pub fn reached_boss(&self) -> bool {
        self.outcome == WalkOutcome::BossReached
    }
}

/// Walk `map` from a chosen first-layer node to the boss.
///
/// `visit` runs on every entered node, the boss included; returning
/// `ControlFlow::Break` ends the run there. An out-of-range choice counts as
/// abandoning the run.
pub fn walk<C, V>(map: &RunMap, chooser: &mut C, mut visit: V) -> WalkLog
where
    C: Chooser + ?Sized,
    V: FnMut(&Node) -> ControlFlow<()>,
{
    let mut path = Vec::new();
    let starts: Vec<NodeId> = map.first_layer().iter().map(|node| node.id).collect();
    let mut current = match choose(map, chooser, "Select your starting point:", &starts) {
        Some(id) => id,
        None => {
            return WalkLog {
                path,
                outcome: WalkOutcome::Abandoned,
            };
        }
    };

    loop {
        let Some(node) = map.node(current) else {
            return WalkLog {
                path,
                outcome: WalkOutcome::Abandoned,
            };
        };
        path.push(current);
        log::debug!("entering {node}");
        if visit(node).is_break() {
            return WalkLog {
                path,
                outcome: WalkOutcome::Stopped,
            };
        }
        if node.kind == Some(EncounterKind::Boss) || node.outgoing.is_empty() {
            let outcome = if current == map.boss_id() {
                WalkOutcome::BossReached
            } else {
                WalkOutcome::Stopped
            };
            return WalkLog { path, outcome };
        }
        current = match choose(map, chooser, "Select your next area:", &node.outgoing) {
            Some(id) => id,
            None => {
                return WalkLog {
                    path,
                    outcome: WalkOutcome::Abandoned,
                };
            }
        };
    }
}

fn choose<C: Chooser + ?Sized>(
    map: &RunMap,
    chooser: &mut C,
    prompt: &str,
    ids: &[NodeId],
) -> Option<NodeId> {
    let options: Vec<String> = ids
        .iter()
        .map(|id| map.node(*id).map_or_else(|| id.to_string(), ToString::to_string))
        .collect();
    let idx = chooser.select_one(prompt, &options)?;
    ids.get(idx).copied()
}
