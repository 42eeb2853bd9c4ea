//! Error kinds surfaced by map generation and the odds models.
use thiserror::Error;

use crate::parts::{Rank, SlotType};

/// Convenience alias used across the crate.
pub type MapResult<T> = Result<T, MapError>;

/// Top-level failure returned by every fallible construction step.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("invalid distribution: {0}")]
    InvalidDistribution(#[from] DistributionError),
}

/// Configuration values rejected before any random draw is consumed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("map width must be at least {min} (got {value})")]
    WidthTooSmall { min: usize, value: usize },
    #[error("map height must be at least {min} (got {value})")]
    HeightTooSmall { min: usize, value: usize },
    #[error("{field} must be positive and finite (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be finite and non-negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} {value} is below the density step {step}")]
    BelowDensityStep {
        field: &'static str,
        value: f64,
        step: f64,
    },
    #[error("{field} minimum {min} exceeds maximum {max}")]
    InvertedBounds {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} range invalid (min {min} > max {max})")]
    InvertedRange {
        field: &'static str,
        min: usize,
        max: usize,
    },
    #[error("rank floor {floor} is above rank ceiling {ceiling}")]
    InvertedRanks { floor: Rank, ceiling: Rank },
    #[error("rank {0} is missing from the rank table")]
    MissingRank(Rank),
    #[error("rank table entry for {rank} has invalid {field} ({value})")]
    InvalidRankTier {
        rank: Rank,
        field: &'static str,
        value: f64,
    },
    #[error("no catalog candidates for {slot} at rank {rank}")]
    EmptyCandidates { slot: &'static str, rank: Rank },
    #[error("inventory holds no chassis")]
    NoChassisOwned,
    #[error("boss encounters cannot be drawn from base odds")]
    BossInBaseOdds,
    #[error("escalation factor must be at least 1.0 (got {0})")]
    EscalationTooSmall(f64),
    #[error("part {id} is not a {expected}")]
    WrongPartKind { id: String, expected: &'static str },
}

impl ConfigError {
    /// Empty candidate list for an equipment slot.
    #[must_use]
    pub const fn empty_slot(slot: SlotType, rank: Rank) -> Self {
        Self::EmptyCandidates {
            slot: slot.key(),
            rank,
        }
    }

    /// Empty candidate list for a chassis roll.
    #[must_use]
    pub const fn empty_chassis(rank: Rank) -> Self {
        Self::EmptyCandidates {
            slot: "chassis",
            rank,
        }
    }
}

/// Weight tables that cannot be sampled.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistributionError {
    #[error("weight table is empty")]
    Empty,
    #[error("weight table has no positive weight")]
    NoPositiveWeight,
    #[error("weight for {key} is not finite")]
    NonFinite { key: String },
    #[error("no compliant encounter type for node {node}")]
    NoCompliantKind { node: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = MapError::from(ConfigError::WidthTooSmall { min: 2, value: 1 });
        assert_eq!(
            err.to_string(),
            "invalid configuration: map width must be at least 2 (got 1)"
        );
        let err = MapError::from(ConfigError::empty_slot(SlotType::Turret, Rank::Epic));
        assert!(err.to_string().contains("turret at rank epic"));
        let err = MapError::from(DistributionError::NoPositiveWeight);
        assert!(matches!(err, MapError::InvalidDistribution(_)));
    }
}
