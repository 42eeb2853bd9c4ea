//! Map requests and the multi-map offer flow.
use serde::{Deserialize, Serialize};

use super::builder::{LayerGraphBuilder, MapConfig};
use super::events::{AssignmentReport, EventAssigner, default_base_odds};
use super::graph::{EncounterOdds, RunMap};
use crate::constants::{
    DEFAULT_MAX_CONNECT_ATTEMPTS, DEFAULT_OFFER_COUNT, DENSITY_STEP, LOG_TARGET_LAYOUT,
    MIN_MAP_HEIGHT, MIN_MAP_WIDTH, REQUEST_MAX_DENSITY, REQUEST_MAX_HEIGHT, REQUEST_MAX_WIDTH,
    REQUEST_MIN_DENSITY, REQUEST_MIN_HEIGHT, REQUEST_MIN_WIDTH, SPECIAL_ESCALATION,
};
use crate::error::{ConfigError, MapResult};
use crate::numbers::round_hundredths;
use crate::rng::RollSource;

const DEFAULT_MAP_DATA: &str = include_str!("../../assets/data/map.json");

/// Ranges a new map's dimensions are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRequest {
    #[serde(default = "MapRequest::default_min_width")]
    pub min_width: usize,
    #[serde(default = "MapRequest::default_max_width")]
    pub max_width: usize,
    #[serde(default = "MapRequest::default_min_height")]
    pub min_height: usize,
    #[serde(default = "MapRequest::default_max_height")]
    pub max_height: usize,
    #[serde(default = "MapRequest::default_min_density")]
    pub min_density: f64,
    #[serde(default = "MapRequest::default_max_density")]
    pub max_density: f64,
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            min_width: Self::default_min_width(),
            max_width: Self::default_max_width(),
            min_height: Self::default_min_height(),
            max_height: Self::default_max_height(),
            min_density: Self::default_min_density(),
            max_density: Self::default_max_density(),
        }
    }
}

impl MapRequest {
    const fn default_min_width() -> usize {
        REQUEST_MIN_WIDTH
    }

    const fn default_max_width() -> usize {
        REQUEST_MAX_WIDTH
    }

    const fn default_min_height() -> usize {
        REQUEST_MIN_HEIGHT
    }

    const fn default_max_height() -> usize {
        REQUEST_MAX_HEIGHT
    }

    const fn default_min_density() -> f64 {
        REQUEST_MIN_DENSITY
    }

    const fn default_max_density() -> f64 {
        REQUEST_MAX_DENSITY
    }

    /// Fixed-size request.
    #[must_use]
    pub const fn exact(width: usize, height: usize, density: f64) -> Self {
        Self {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
            min_density: density,
            max_density: density,
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] when a lower bound is unusable or a range is inverted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_width < MIN_MAP_WIDTH {
            return Err(ConfigError::WidthTooSmall {
                min: MIN_MAP_WIDTH,
                value: self.min_width,
            });
        }
        if self.min_height < MIN_MAP_HEIGHT {
            return Err(ConfigError::HeightTooSmall {
                min: MIN_MAP_HEIGHT,
                value: self.min_height,
            });
        }
        for (field, min, max) in [
            ("width", self.min_width, self.max_width),
            ("height", self.min_height, self.max_height),
        ] {
            if max < min {
                return Err(ConfigError::InvertedRange { field, min, max });
            }
        }
        if !self.min_density.is_finite() || self.min_density <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "min_density",
                value: self.min_density,
            });
        }
        if self.min_density < DENSITY_STEP {
            return Err(ConfigError::BelowDensityStep {
                field: "min_density",
                value: self.min_density,
                step: DENSITY_STEP,
            });
        }
        if !self.max_density.is_finite() || self.max_density < self.min_density {
            return Err(ConfigError::InvertedBounds {
                field: "request density",
                min: self.min_density,
                max: self.max_density,
            });
        }
        Ok(())
    }

    /// Draw one map's width, height and density, in that order.
    pub fn roll_config<S: RollSource + ?Sized>(&self, rolls: &mut S) -> MapConfig {
        let width = rolls.roll_between(self.min_width, self.max_width);
        let height = rolls.roll_between(self.min_height, self.max_height);
        let density = round_hundredths(
            self.min_density + rolls.roll_unit() * (self.max_density - self.min_density),
        );
        MapConfig::new(width, height, density)
    }
}

/// Map generation settings loaded from `map.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    #[serde(default)]
    pub request: MapRequest,
    #[serde(default = "MapSettings::default_max_connect_attempts")]
    pub max_connect_attempts: u32,
    #[serde(default = "default_base_odds")]
    pub base_odds: EncounterOdds,
    #[serde(default = "MapSettings::default_escalation")]
    pub escalation: f64,
    #[serde(default = "MapSettings::default_offer_count")]
    pub offer_count: usize,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            request: MapRequest::default(),
            max_connect_attempts: Self::default_max_connect_attempts(),
            base_odds: default_base_odds(),
            escalation: Self::default_escalation(),
            offer_count: Self::default_offer_count(),
        }
    }
}

impl MapSettings {
    const fn default_max_connect_attempts() -> u32 {
        DEFAULT_MAX_CONNECT_ATTEMPTS
    }

    const fn default_escalation() -> f64 {
        SPECIAL_ESCALATION
    }

    const fn default_offer_count() -> usize {
        DEFAULT_OFFER_COUNT
    }

    /// Settings compiled into the crate, with code defaults for anything missing.
    #[must_use]
    pub fn default_settings() -> Self {
        serde_json::from_str(DEFAULT_MAP_DATA).unwrap_or_default()
    }

    /// Assigner configured from these settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the odds or escalation factor are unusable.
    pub fn assigner(&self) -> MapResult<EventAssigner> {
        EventAssigner::new(self.base_odds.clone())?.with_escalation(self.escalation)
    }

    /// # Errors
    ///
    /// Returns the first request, odds or escalation problem found.
    pub fn validate(&self) -> MapResult<()> {
        self.request.validate()?;
        self.assigner().map(|_| ())
    }
}

/// One candidate map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOffer {
    pub config: MapConfig,
    pub map: RunMap,
    pub report: AssignmentReport,
}

/// Build and type one map.
///
/// Layout draws come from `layout`; type draws from `events`.
///
/// # Errors
///
/// Returns configuration errors for the map or assigner, and distribution
/// errors raised while typing nodes.
pub fn generate_map<L, E>(
    config: MapConfig,
    assigner: &EventAssigner,
    layout: &mut L,
    events: &mut E,
) -> MapResult<(RunMap, AssignmentReport)>
where
    L: RollSource + ?Sized,
    E: RollSource + ?Sized,
{
    let mut map = LayerGraphBuilder::new(config)?.build(layout);
    let report = assigner.assign(&mut map, events)?;
    Ok((map, report))
}

/// Build `count` typed maps with dimensions drawn from the settings' request.
///
/// # Errors
///
/// See [`MapSettings::validate`] and [`generate_map`].
pub fn offer_maps<L, E>(
    settings: &MapSettings,
    count: usize,
    layout: &mut L,
    events: &mut E,
) -> MapResult<Vec<MapOffer>>
where
    L: RollSource + ?Sized,
    E: RollSource + ?Sized,
{
    settings.request.validate()?;
    let assigner = settings.assigner()?;
    let mut offers = Vec::with_capacity(count);
    for _ in 0..count {
        let config = settings
            .request
            .roll_config(layout)
            .with_max_connect_attempts(settings.max_connect_attempts);
        let (map, report) = generate_map(config, &assigner, layout, events)?;
        log::debug!(
            target: LOG_TARGET_LAYOUT,
            "offer {}: {}x{} at density {:.2}",
            offers.len() + 1,
            config.width,
            config.height,
            config.density_min
        );
        offers.push(MapOffer {
            config,
            map,
            report,
        });
    }
    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn embedded_settings_match_code_defaults() {
        let settings = MapSettings::default_settings();
        assert_eq!(settings, MapSettings::default());
        settings.validate().unwrap();
    }

    #[test]
    fn roll_config_draws_width_height_then_density() {
        let request = MapRequest::default();
        let mut rolls = ScriptedRolls::new([0.5], [6, 12]);
        let config = request.roll_config(&mut rolls);
        assert_eq!((config.width, config.height), (6, 12));
        assert!((config.density_min - 0.35).abs() < 1e-9);
        assert_eq!(config.density_max, None);
    }

    #[test]
    fn malformed_requests_are_rejected() {
        let mut request = MapRequest::default();
        request.max_width = 3;
        assert_eq!(
            request.validate(),
            Err(ConfigError::InvertedRange {
                field: "width",
                min: 4,
                max: 3
            })
        );
        assert!(MapRequest::exact(1, 5, 0.3).validate().is_err());
        assert!(MapRequest::exact(4, 5, 0.0).validate().is_err());
        let mut request = MapRequest::default();
        request.max_density = 0.1;
        assert!(request.validate().is_err());
    }

    #[test]
    fn densities_that_could_round_to_zero_are_rejected() {
        let mut request = MapRequest::default();
        request.min_density = 0.004;
        request.max_density = 0.01;
        assert_eq!(
            request.validate(),
            Err(ConfigError::BelowDensityStep {
                field: "min_density",
                value: 0.004,
                step: DENSITY_STEP,
            })
        );
        request.min_density = 0.01;
        request.validate().unwrap();
        let mut rolls = ScriptedRolls::new([0.0, 0.5, 1.0], [4, 10, 4, 10, 4, 10]);
        for _ in 0..3 {
            let config = request.roll_config(&mut rolls);
            assert!(config.density_min >= DENSITY_STEP);
            config.validate().unwrap();
        }
    }

    #[test]
    fn offers_respect_request_ranges() {
        let settings = MapSettings::default();
        let mut layout = SmallRng::seed_from_u64(11);
        let mut events = SmallRng::seed_from_u64(12);
        let offers = offer_maps(&settings, 3, &mut layout, &mut events).unwrap();
        assert_eq!(offers.len(), 3);
        for offer in &offers {
            assert!((4..=8).contains(&offer.map.width()));
            assert!((10..=18).contains(&offer.map.height()));
            assert!((0.2..=0.5).contains(&offer.map.density().min()));
            assert!(offer.map.audit().is_empty());
            assert!(offer.map.untyped().is_empty());
        }
    }
}
