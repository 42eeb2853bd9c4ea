//! Weighted key selection shared by encounter, rank and reward draws.
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::error::DistributionError;
use crate::rng::RollSource;

/// Check that a weight table can be sampled.
///
/// # Errors
///
/// Returns [`DistributionError`] when the table is empty, holds a non-finite
/// weight, or has no strictly positive weight.
pub fn check_weights<K: Debug>(weights: &BTreeMap<K, f64>) -> Result<f64, DistributionError> {
    if weights.is_empty() {
        return Err(DistributionError::Empty);
    }
    let mut total = 0.0_f64;
    for (key, weight) in weights {
        if !weight.is_finite() {
            return Err(DistributionError::NonFinite {
                key: format!("{key:?}"),
            });
        }
        if *weight > 0.0 {
            total += weight;
        }
    }
    if total <= 0.0 {
        return Err(DistributionError::NoPositiveWeight);
    }
    Ok(total)
}

/// Draw one key with probability proportional to its weight.
///
/// Keys are visited in map order and weights at or below zero are skipped,
/// so the same roll always lands on the same key. The table is not modified.
///
/// # Errors
///
/// See [`check_weights`].
pub fn draw<K, S>(weights: &BTreeMap<K, f64>, rolls: &mut S) -> Result<K, DistributionError>
where
    K: Ord + Copy + Debug,
    S: RollSource + ?Sized,
{
    let total = check_weights(weights)?;
    let mut remaining = rolls.roll_unit() * total;
    let mut selected = None;
    for (key, weight) in weights {
        if *weight <= 0.0 {
            continue;
        }
        selected = Some(*key);
        if remaining < *weight {
            break;
        }
        remaining -= weight;
    }
    // Float drift can leave a sliver past the last bucket; the last positive key absorbs it.
    selected.ok_or(DistributionError::NoPositiveWeight)
}
