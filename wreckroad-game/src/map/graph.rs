//! The finished run map and its structural audit.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::Hasher;
use twox_hash::XxHash64;

use super::connect::DensityBounds;
use super::node::{EncounterKind, Node, NodeId};

/// Weight per encounter type.
pub type EncounterOdds = BTreeMap<EncounterKind, f64>;

/// Layered encounter graph for one run.
///
/// `layers` holds `height` non-terminal layers followed by the single-node
/// terminal layer. Each layer keeps its retained nodes sorted by column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMap {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) density: DensityBounds,
    pub(crate) layers: Vec<Vec<Node>>,
    #[serde(default)]
    pub(crate) base_odds: EncounterOdds,
}

/// A broken structural rule found by [`RunMap::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum AuditViolation {
    /// A first-layer node with nowhere to go.
    DeadStart { node: NodeId },
    /// A non-first, non-terminal node nothing leads into.
    Unreachable { node: NodeId },
    /// A non-terminal node with no outgoing edge.
    DeadEnd { node: NodeId },
    /// The terminal layer does not hold exactly one node.
    TerminalLayerSize { nodes: usize },
    /// The terminal node is not typed as a boss.
    TerminalNotBoss { node: NodeId },
    /// The terminal node has outgoing edges.
    TerminalHasOutgoing { node: NodeId },
    /// Terminal in-degree differs from the penultimate layer's size.
    TerminalInDegree { expected: usize, actual: usize },
    /// An edge points at a missing node or skips a layer.
    BadEdge { from: NodeId, to: NodeId },
    /// `outgoing` and `incoming` lists disagree.
    AsymmetricEdge { from: NodeId, to: NodeId },
    /// Sibling at `left` goes right while its neighbour goes left.
    Crossing { left: NodeId, right: NodeId },
    /// Two connected nodes share a special type.
    RepeatedSpecial {
        from: NodeId,
        to: NodeId,
        kind: EncounterKind,
    },
}

impl RunMap {
    /// Maximum nodes per non-terminal layer.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of non-terminal layers.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn density(&self) -> DensityBounds {
        self.density
    }

    /// Encounter weights the map was typed with; empty before assignment.
    #[must_use]
    pub const fn base_odds(&self) -> &EncounterOdds {
        &self.base_odds
    }

    /// Every layer, terminal last.
    #[must_use]
    pub fn layers(&self) -> &[Vec<Node>] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&[Node]> {
        self.layers.get(index).map(Vec::as_slice)
    }

    /// Nodes a run may start on.
    #[must_use]
    pub fn first_layer(&self) -> &[Node] {
        self.layer(0).unwrap_or_default()
    }

    /// Id of the terminal node.
    #[must_use]
    pub const fn boss_id(&self) -> NodeId {
        NodeId::new(self.height, self.width / 2)
    }

    #[must_use]
    pub fn boss(&self) -> Option<&Node> {
        self.node(self.boss_id())
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        let layer = self.layers.get(id.layer)?;
        layer
            .binary_search_by_key(&id.column, Node::column)
            .ok()
            .and_then(|idx| layer.get(idx))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let layer = self.layers.get_mut(id.layer)?;
        let idx = layer.binary_search_by_key(&id.column, Node::column).ok()?;
        layer.get_mut(idx)
    }

    /// Targets reachable from `id` in one step.
    #[must_use]
    pub fn next_choices(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.outgoing.as_slice())
    }

    /// Nodes with an edge into `id`.
    #[must_use]
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.incoming.as_slice())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.layers.iter().flatten()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Every edge as `(from, to)`, ordered by source.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes()
            .flat_map(|node| node.outgoing.iter().map(move |to| (node.id, *to)))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes().map(|node| node.outgoing.len()).sum()
    }

    /// Count of nodes per assigned type.
    #[must_use]
    pub fn kind_counts(&self) -> BTreeMap<EncounterKind, usize> {
        let mut counts = BTreeMap::new();
        for kind in self.nodes().filter_map(|node| node.kind) {
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }

    /// Nodes still waiting for an encounter type.
    #[must_use]
    pub fn untyped(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|node| node.kind.is_none())
            .map(|node| node.id)
            .collect()
    }

    /// Check every structural rule a finished map must satisfy.
    ///
    /// Untyped nodes are not violations; type rules only apply to typed pairs.
    #[must_use]
    pub fn audit(&self) -> Vec<AuditViolation> {
        let mut violations = Vec::new();
        let terminal = self.height;

        for (layer_idx, layer) in self.layers.iter().enumerate() {
            for node in layer {
                if layer_idx == 0 && node.outgoing.is_empty() {
                    violations.push(AuditViolation::DeadStart { node: node.id });
                } else if layer_idx > 0 && layer_idx < terminal && node.incoming.is_empty() {
                    violations.push(AuditViolation::Unreachable { node: node.id });
                }
                if layer_idx > 0 && layer_idx < terminal && node.outgoing.is_empty() {
                    violations.push(AuditViolation::DeadEnd { node: node.id });
                }
                self.audit_edges(node, &mut violations);
            }
        }

        self.audit_terminal(&mut violations);
        self.audit_crossings(&mut violations);
        violations
    }

    fn audit_edges(&self, node: &Node, violations: &mut Vec<AuditViolation>) {
        for to in &node.outgoing {
            let Some(target) = self.node(*to) else {
                violations.push(AuditViolation::BadEdge { from: node.id, to: *to });
                continue;
            };
            if to.layer != node.id.layer + 1 {
                violations.push(AuditViolation::BadEdge { from: node.id, to: *to });
            }
            if !target.incoming.contains(&node.id) {
                violations.push(AuditViolation::AsymmetricEdge { from: node.id, to: *to });
            }
            if let (Some(kind), Some(other)) = (node.kind, target.kind)
                && kind == other
                && kind.is_special()
            {
                violations.push(AuditViolation::RepeatedSpecial {
                    from: node.id,
                    to: *to,
                    kind,
                });
            }
        }
        for from in &node.incoming {
            if !self.node(*from).is_some_and(|source| source.has_edge_to(node.id)) {
                violations.push(AuditViolation::AsymmetricEdge { from: *from, to: node.id });
            }
        }
    }

    fn audit_terminal(&self, violations: &mut Vec<AuditViolation>) {
        let Some(terminal_layer) = self.layers.get(self.height) else {
            violations.push(AuditViolation::TerminalLayerSize { nodes: 0 });
            return;
        };
        if terminal_layer.len() != 1 {
            violations.push(AuditViolation::TerminalLayerSize {
                nodes: terminal_layer.len(),
            });
        }
        let Some(boss) = terminal_layer.first() else {
            return;
        };
        if boss.kind != Some(EncounterKind::Boss) {
            violations.push(AuditViolation::TerminalNotBoss { node: boss.id });
        }
        if !boss.outgoing.is_empty() {
            violations.push(AuditViolation::TerminalHasOutgoing { node: boss.id });
        }
        let expected = self
            .height
            .checked_sub(1)
            .and_then(|idx| self.layers.get(idx))
            .map_or(0, |layer| layer.iter().filter(|node| node.active).count());
        if boss.incoming.len() != expected {
            violations.push(AuditViolation::TerminalInDegree {
                expected,
                actual: boss.incoming.len(),
            });
        }
    }

    fn audit_crossings(&self, violations: &mut Vec<AuditViolation>) {
        for layer in self.layers.iter().take(self.height) {
            for pair in layer.windows(2) {
                let (left, right) = (&pair[0], &pair[1]);
                if right.column() != left.column() + 1 {
                    continue;
                }
                let next = left.layer() + 1;
                let goes_right = left.has_edge_to(NodeId::new(next, right.column()));
                let goes_left = right.has_edge_to(NodeId::new(next, left.column()));
                if goes_right && goes_left && next < self.height {
                    violations.push(AuditViolation::Crossing {
                        left: left.id,
                        right: right.id,
                    });
                }
            }
        }
    }

    /// Stable 64-bit digest of the dimensions, densities, base odds, node
    /// kinds and edges.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write_usize(self.width);
        hasher.write_usize(self.height);
        hasher.write_u64(self.density.min().to_bits());
        hasher.write_u64(self.density.max().to_bits());
        for (kind, weight) in &self.base_odds {
            hasher.write_u32(u32::from(kind.glyph()));
            hasher.write_u64(weight.to_bits());
        }
        for node in self.nodes() {
            write_id(&mut hasher, node.id);
            hasher.write_u32(node.kind.map_or(0, |kind| u32::from(kind.glyph())));
            hasher.write_usize(node.outgoing.len());
            for target in &node.outgoing {
                write_id(&mut hasher, *target);
            }
        }
        hasher.finish()
    }
}

fn write_id(hasher: &mut XxHash64, id: NodeId) {
    hasher.write_usize(id.layer);
    hasher.write_usize(id.column);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::connect::DensityBounds;

    fn linked(layers: Vec<Vec<Node>>, edges: &[(NodeId, NodeId)]) -> RunMap {
        let mut map = RunMap {
            width: 2,
            height: layers.len() - 1,
            density: DensityBounds::new(0.5, None).unwrap(),
            layers,
            base_odds: EncounterOdds::new(),
        };
        for (from, to) in edges {
            map.node_mut(*from).unwrap().outgoing.push(*to);
            map.node_mut(*to).unwrap().incoming.push(*from);
        }
        for node in map.layers.iter_mut().flatten() {
            node.active = true;
        }
        map
    }

    fn crossing_map() -> RunMap {
        let a = NodeId::new(0, 0);
        let b = NodeId::new(0, 1);
        let c = NodeId::new(1, 0);
        let d = NodeId::new(1, 1);
        let boss = NodeId::new(2, 1);
        let mut boss_node = Node::blank(boss);
        boss_node.kind = Some(EncounterKind::Boss);
        linked(
            vec![
                vec![Node::blank(a), Node::blank(b)],
                vec![Node::blank(c), Node::blank(d)],
                vec![boss_node],
            ],
            &[(a, d), (b, c), (c, boss), (d, boss)],
        )
    }

    #[test]
    fn audit_flags_crossing_siblings() {
        let map = crossing_map();
        let violations = map.audit();
        assert_eq!(
            violations,
            vec![AuditViolation::Crossing {
                left: NodeId::new(0, 0),
                right: NodeId::new(0, 1),
            }]
        );
    }

    #[test]
    fn audit_flags_repeated_specials_and_terminal_degree() {
        let mut map = crossing_map();
        for id in [NodeId::new(0, 1), NodeId::new(1, 0)] {
            map.node_mut(id).unwrap().kind = Some(EncounterKind::Garage);
        }
        map.node_mut(NodeId::new(1, 1)).unwrap().active = false;
        let violations = map.audit();
        assert!(violations.contains(&AuditViolation::RepeatedSpecial {
            from: NodeId::new(0, 1),
            to: NodeId::new(1, 0),
            kind: EncounterKind::Garage,
        }));
        assert!(violations.contains(&AuditViolation::TerminalInDegree {
            expected: 1,
            actual: 2,
        }));
    }

    #[test]
    fn lookups_follow_columns() {
        let map = crossing_map();
        assert_eq!(map.boss_id(), NodeId::new(2, 1));
        assert_eq!(map.next_choices(NodeId::new(0, 0)), &[NodeId::new(1, 1)]);
        assert_eq!(map.predecessors(map.boss_id()).len(), 2);
        assert!(map.node(NodeId::new(0, 5)).is_none());
        assert_eq!(map.edge_count(), 4);
        assert_eq!(map.node_count(), 5);
        assert_eq!(map.fingerprint(), map.clone().fingerprint());
    }

    #[test]
    fn fingerprint_tracks_kinds_and_edges() {
        let map = crossing_map();
        let mut typed = map.clone();
        typed.node_mut(NodeId::new(0, 0)).unwrap().kind = Some(EncounterKind::Battle);
        assert_ne!(map.fingerprint(), typed.fingerprint());

        let mut rewired = map.clone();
        rewired.node_mut(NodeId::new(0, 0)).unwrap().outgoing[0] = NodeId::new(1, 0);
        assert_ne!(map.fingerprint(), rewired.fingerprint());

        let json = serde_json::to_string(&map).unwrap();
        let reparsed: RunMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map.fingerprint(), reparsed.fingerprint());
    }
}
