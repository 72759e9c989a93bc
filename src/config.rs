//! Runtime settings
//!
//! Every field has a default and can be overridden with a `RAYCAST_*`
//! environment variable. Values that fail to parse are logged and ignored.

use std::env;
use std::str::FromStr;

use log::warn;

use crate::error::{Error, Result};
use crate::grid;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Cells per side of the square map (default: 32)
    pub map_size: usize,

    /// Chance of each cell being a wall (default: 0.3)
    pub wall_probability: f64,

    /// Fixed map seed; random per run when unset
    pub seed: Option<u64>,

    /// Rays cast per frame (default: 320)
    pub resolution: usize,

    /// Focal length, smaller values widen the view (default: 0.8)
    pub focal_length: f64,

    /// Max ray length in cells (default: 14)
    pub range: f64,

    /// Distance at which walls are fully shaded (default: 5)
    pub light_range: f64,

    /// Start heading in radians (default: 0.3 pi)
    pub start_direction: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            map_size: 32,
            wall_probability: 0.3,
            seed: None,
            resolution: 320,
            focal_length: 0.8,
            range: 14.0,
            light_range: 5.0,
            start_direction: std::f64::consts::PI * 0.3,
        }
    }
}

fn override_from<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    slot: &mut T,
) {
    let Some(raw) = lookup(name) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!("Ignoring {name}={raw:?}: not a valid value"),
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        override_from(&lookup, "RAYCAST_MAP_SIZE", &mut settings.map_size);
        override_from(&lookup, "RAYCAST_WALL_PROBABILITY", &mut settings.wall_probability);
        override_from(&lookup, "RAYCAST_RESOLUTION", &mut settings.resolution);
        override_from(&lookup, "RAYCAST_FOCAL_LENGTH", &mut settings.focal_length);
        override_from(&lookup, "RAYCAST_RANGE", &mut settings.range);
        override_from(&lookup, "RAYCAST_LIGHT_RANGE", &mut settings.light_range);

        if let Some(raw) = lookup("RAYCAST_SEED") {
            match raw.trim().parse() {
                Ok(seed) => settings.seed = Some(seed),
                Err(_) => warn!("Ignoring RAYCAST_SEED={raw:?}: not a valid value"),
            }
        }
        settings
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &'static str, reason: String| Err(Error::InvalidSetting { name, reason });

        if self.map_size == 0 || self.map_size > grid::MAX_SIZE {
            return invalid(
                "map_size",
                format!("{} is outside 1..={}", self.map_size, grid::MAX_SIZE),
            );
        }
        if !(0.0..=1.0).contains(&self.wall_probability) {
            return Err(Error::InvalidProbability(self.wall_probability));
        }
        if self.resolution == 0 {
            return invalid("resolution", "must be at least 1".into());
        }
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            return invalid("focal_length", format!("{} is not positive", self.focal_length));
        }
        if !(self.range.is_finite() && self.range > 0.0) {
            return invalid("range", format!("{} is not positive", self.range));
        }
        if !(self.light_range.is_finite() && self.light_range > 0.0) {
            return invalid("light_range", format!("{} is not positive", self.light_range));
        }
        Ok(())
    }

    /// Start position, just off the centre of the map's middle cell.
    pub fn start_position(&self) -> (f64, f64) {
        let centre = (self.map_size / 2) as f64 + 0.3;
        (centre, centre)
    }
}
