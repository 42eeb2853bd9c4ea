//! Centralized tuning constants for Wreckroad map generation.
//!
//! Gameplay numbers that designers tweak live in the JSON assets under
//! `assets/data`; the values here are the structural rules and the code
//! fallbacks used when an asset is missing a field.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_LAYOUT: &str = "wreckroad::layout";
pub(crate) const LOG_TARGET_EVENTS: &str = "wreckroad::events";
pub(crate) const LOG_TARGET_LOADOUT: &str = "wreckroad::loadout";

// Layout -------------------------------------------------------------------
/// Smallest width that can seed the first layer with two active nodes.
pub const MIN_MAP_WIDTH: usize = 2;
/// A map always has at least one non-terminal layer.
pub const MIN_MAP_HEIGHT: usize = 1;
/// Minimum number of active nodes rolled for the first layer.
pub const MIN_FIRST_LAYER_ACTIVE: usize = 2;
/// `density_max = density_min * DENSITY_SPREAD` when no maximum is supplied.
pub const DENSITY_SPREAD: f64 = 1.5;
/// Densities are rounded to this step, so anything smaller could draw zero.
pub const DENSITY_STEP: f64 = 0.01;
/// Upper bound on connection rounds per node before the `up` edge is forced.
pub const DEFAULT_MAX_CONNECT_ATTEMPTS: u32 = 64;

// Map requests -------------------------------------------------------------
pub(crate) const REQUEST_MIN_WIDTH: usize = 4;
pub(crate) const REQUEST_MAX_WIDTH: usize = 8;
pub(crate) const REQUEST_MIN_HEIGHT: usize = 10;
pub(crate) const REQUEST_MAX_HEIGHT: usize = 18;
pub(crate) const REQUEST_MIN_DENSITY: f64 = 0.2;
pub(crate) const REQUEST_MAX_DENSITY: f64 = 0.5;
pub(crate) const DEFAULT_OFFER_COUNT: usize = 3;

// Event odds ---------------------------------------------------------------
pub(crate) const BASE_ODDS_BATTLE: f64 = 0.6;
pub(crate) const BASE_ODDS_CHOICE: f64 = 1.0;
pub(crate) const BASE_ODDS_TREASURE: f64 = 0.1;
pub(crate) const BASE_ODDS_GARAGE: f64 = 0.2;
pub(crate) const BASE_ODDS_MERCHANT: f64 = 0.1;
/// Multiplier applied to every special type that was not picked.
pub const SPECIAL_ESCALATION: f64 = 1.2;
/// Rejected draws per node before sampling only the compliant types.
pub(crate) const MAX_EVENT_REDRAWS: u32 = 64;

// Rank odds ----------------------------------------------------------------
pub(crate) const IN_BAND_ODDS: f64 = 80.0;
pub(crate) const BELOW_FLOOR_ODDS: f64 = 5.0;
pub(crate) const ABOVE_CEILING_ODDS: f64 = 15.0;

// Power estimation ---------------------------------------------------------
pub(crate) const TECH_POINT_WEIGHT: f64 = 0.1;
pub(crate) const CHASSIS_MULTIPLIER: f64 = 0.1;

// Rewards ------------------------------------------------------------------
pub(crate) const TREASURE_CHOICE_COUNT: usize = 3;
