//! Random sources for map generation.
//!
//! Every generator in this crate draws through [`RollSource`], which is
//! implemented for any [`rand::Rng`]. Tests that need a literal outcome use
//! [`ScriptedRolls`] instead of a seeded generator.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;
use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;

/// Minimal random interface consumed by the generators.
pub trait RollSource {
    /// Uniform float in `[0, 1)`.
    fn roll_unit(&mut self) -> f64;

    /// Uniform integer in `[low, high]`. Callers guarantee `low <= high`.
    fn roll_between(&mut self, low: usize, high: usize) -> usize;
}

impl<R: Rng + ?Sized> RollSource for R {
    fn roll_unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    fn roll_between(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }
}

/// Fisher-Yates shuffle driven by a [`RollSource`].
pub fn shuffle_with<T, S: RollSource + ?Sized>(items: &mut [T], rolls: &mut S) {
    for i in (1..items.len()).rev() {
        let j = rolls.roll_between(0, i);
        items.swap(i, j);
    }
}

/// Pick `amount` distinct indices out of `0..len` with a partial Fisher-Yates pass.
///
/// The returned indices keep their draw order.
pub fn sample_indices<S: RollSource + ?Sized>(len: usize, amount: usize, rolls: &mut S) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..len).collect();
    let take = amount.min(len);
    for i in 0..take {
        let j = rolls.roll_between(i, len - 1);
        pool.swap(i, j);
    }
    pool.truncate(take);
    pool
}

/// Pick one element uniformly.
pub fn pick_one<'a, T, S: RollSource + ?Sized>(items: &'a [T], rolls: &mut S) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rolls.roll_between(0, items.len() - 1))
}

/// Replays literal roll sequences.
///
/// Unit rolls and integer rolls come from separate queues so fixtures read
/// in the order the generator consumes them. An exhausted unit queue yields
/// `0.0`; an exhausted integer queue yields `low`. Scripted integers are
/// clamped into the requested range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    units: VecDeque<f64>,
    ints: VecDeque<usize>,
    consumed: u64,
}

impl ScriptedRolls {
    #[must_use]
    pub fn new(units: impl IntoIterator<Item = f64>, ints: impl IntoIterator<Item = usize>) -> Self {
        Self {
            units: units.into_iter().collect(),
            ints: ints.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Rolls still queued (units, ints).
    #[must_use]
    pub fn remaining(&self) -> (usize, usize) {
        (self.units.len(), self.ints.len())
    }

    /// Total rolls answered so far, including fallbacks.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl RollSource for ScriptedRolls {
    fn roll_unit(&mut self) -> f64 {
        self.consumed = self.consumed.saturating_add(1);
        self.units.pop_front().unwrap_or(0.0)
    }

    fn roll_between(&mut self, low: usize, high: usize) -> usize {
        self.consumed = self.consumed.saturating_add(1);
        self.ints
            .pop_front()
            .map_or(low, |value| value.clamp(low, high.max(low)))
    }
}

/// Deterministic bundle of RNG streams segregated by generation domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    layout: RefCell<CountingRng<SmallRng>>,
    events: RefCell<CountingRng<SmallRng>>,
    loadout: RefCell<CountingRng<SmallRng>>,
    rewards: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            layout: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"layout"))),
            events: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"events"))),
            loadout: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"loadout"))),
            rewards: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"rewards"))),
        }
    }

    /// Stream used for node allocation and edge creation.
    #[must_use]
    pub fn layout(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.layout.borrow_mut()
    }

    /// Stream used for encounter-type assignment.
    #[must_use]
    pub fn events(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.events.borrow_mut()
    }

    /// Stream used for enemy loadouts.
    #[must_use]
    pub fn loadout(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.loadout.borrow_mut()
    }

    /// Stream used for treasure rewards.
    #[must_use]
    pub fn rewards(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.rewards.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        // HMAC-SHA256 accepts keys of any length.
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
