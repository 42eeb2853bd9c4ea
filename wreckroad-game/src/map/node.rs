//! Nodes of a run map.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Edge list stored inline for the common one-to-three fan-out.
pub type EdgeList = SmallVec<[NodeId; 3]>;

/// Position of a node: layer index and column at allocation time.
///
/// Columns survive pruning, so an id stays valid after its neighbours are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub layer: usize,
    pub column: usize,
}

impl NodeId {
    #[must_use]
    pub const fn new(layer: usize, column: usize) -> Self {
        Self { layer, column }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer, self.column)
    }
}

/// Encounter type carried by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    Battle,
    Choice,
    Treasure,
    Garage,
    Merchant,
    Boss,
}

impl EncounterKind {
    pub const ALL: [Self; 6] = [
        Self::Battle,
        Self::Choice,
        Self::Treasure,
        Self::Garage,
        Self::Merchant,
        Self::Boss,
    ];

    /// Types that escalate while unseen and never repeat along an edge.
    pub const SPECIAL: [Self; 3] = [Self::Treasure, Self::Merchant, Self::Garage];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Battle => "battle",
            Self::Choice => "choice",
            Self::Treasure => "treasure",
            Self::Garage => "garage",
            Self::Merchant => "merchant",
            Self::Boss => "boss",
        }
    }

    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Treasure | Self::Garage | Self::Merchant)
    }

    /// Single-character map glyph.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Battle => 'B',
            Self::Choice => '?',
            Self::Treasure => 'T',
            Self::Garage => 'G',
            Self::Merchant => '$',
            Self::Boss => 'X',
        }
    }
}

impl fmt::Display for EncounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One encounter slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub active: bool,
    pub kind: Option<EncounterKind>,
    pub outgoing: EdgeList,
    pub incoming: EdgeList,
    /// Set once this node has taken its diagonal edge to the left.
    pub connect_left: bool,
    /// Set once this node has taken its diagonal edge to the right.
    pub connect_right: bool,
}

impl Node {
    #[must_use]
    pub fn blank(id: NodeId) -> Self {
        Self {
            id,
            active: false,
            kind: None,
            outgoing: EdgeList::new(),
            incoming: EdgeList::new(),
            connect_left: false,
            connect_right: false,
        }
    }

    #[must_use]
    pub const fn layer(&self) -> usize {
        self.id.layer
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.id.column
    }

    #[must_use]
    pub fn has_edge_to(&self, target: NodeId) -> bool {
        self.outgoing.contains(&target)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{kind} @ {}", self.id),
            None => write!(f, "untyped @ {}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_kinds_match_predicate() {
        for kind in EncounterKind::ALL {
            assert_eq!(EncounterKind::SPECIAL.contains(&kind), kind.is_special());
        }
    }

    #[test]
    fn ids_order_by_layer_then_column() {
        let mut ids = vec![NodeId::new(1, 0), NodeId::new(0, 2), NodeId::new(0, 1)];
        ids.sort();
        assert_eq!(ids, vec![NodeId::new(0, 1), NodeId::new(0, 2), NodeId::new(1, 0)]);
        assert_eq!(NodeId::new(3, 1).to_string(), "3:1");
    }

    #[test]
    fn kinds_serialize_as_snake_case() {
        let json = serde_json::to_string(&EncounterKind::Merchant).unwrap();
        assert_eq!(json, "\"merchant\"");
        let node = Node::blank(NodeId::new(0, 0));
        assert_eq!(node.to_string(), "untyped @ 0:0");
    }
}
