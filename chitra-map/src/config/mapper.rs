//! Settings forwarded to the external sonar mapper.
//!
//! None of these are interpreted by the viewer core. They are carried in
//! the config file so a [`SonarMapper`](crate::source::SonarMapper)
//! adapter can read them.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Sonar occupancy model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SonarModel {
    /// Only the cell at the measured range
    #[default]
    SingleCell,
    /// Cells along the acoustic axis
    AcousticAxis,
    /// Full Bayesian cone
    Cone,
}

/// Motion model used when the mapper localizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionModelSettings {
    /// Minimum model height (map cells)
    #[serde(default)]
    pub min_height: i32,

    /// Minimum model width (map cells)
    #[serde(default = "defaults::motion_min_width")]
    pub min_width: i32,

    /// Millimeters of travel per height increment
    #[serde(default = "defaults::unit_distance")]
    pub unit_distance: i32,

    /// Degrees of turn per width increment
    #[serde(default = "defaults::unit_turn")]
    pub unit_turn: i32,

    /// Gaussian scale parameter
    #[serde(default = "defaults::gauss_sigma")]
    pub gauss_sigma: f32,
}

impl Default for MotionModelSettings {
    fn default() -> Self {
        Self {
            min_height: 0,
            min_width: defaults::motion_min_width(),
            unit_distance: defaults::unit_distance(),
            unit_turn: defaults::unit_turn(),
            gauss_sigma: defaults::gauss_sigma(),
        }
    }
}

/// `[mapper]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapperSettings {
    /// Occupancy model
    #[serde(default)]
    pub sonar_model: SonarModel,

    /// Which of the 16 sonars are processed
    #[serde(default = "defaults::enabled_sonars")]
    pub enabled_sonars: [bool; 16],

    /// Half of the region I depth (mm)
    #[serde(default = "defaults::region_i_halfwidth")]
    pub region_i_halfwidth: i32,

    /// Half-width of the sonar cone (degrees)
    #[serde(default = "defaults::beta")]
    pub beta: i32,

    /// Multiplier on the off-axis angle
    #[serde(default = "defaults::alpha_factor")]
    pub alpha_factor: f32,

    /// Cap on occupied probability
    #[serde(default = "defaults::max_occupied")]
    pub max_occupied: f32,

    /// Cap on occupied probability within region II
    #[serde(default = "defaults::max_empty")]
    pub max_empty: f32,

    /// Divisor applied to out-of-range readings
    #[serde(default = "defaults::out_of_range_conversion")]
    pub out_of_range_conversion: i32,

    /// Skip out-of-range readings in the cone model
    #[serde(default = "defaults::enabled")]
    pub ignore_out_of_range: bool,

    /// Skip readings obstructed by earlier ones
    #[serde(default = "defaults::enabled")]
    pub ignore_obstructed: bool,

    /// Certainty above which a cell counts as an obstruction
    #[serde(default = "defaults::obstructed_certainty")]
    pub obstructed_certainty: f32,

    /// Millimeters per grid cell
    #[serde(default = "defaults::mapper_cell_size")]
    pub cell_size_mm: i32,

    /// Maximum travel within one local map (mm)
    #[serde(default = "defaults::local_map_distance")]
    pub local_map_distance: i32,

    /// Localize the global map during construction
    #[serde(default)]
    pub localize: bool,

    /// Localization motion model
    #[serde(default)]
    pub motion_model: MotionModelSettings,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            sonar_model: SonarModel::default(),
            enabled_sonars: defaults::enabled_sonars(),
            region_i_halfwidth: defaults::region_i_halfwidth(),
            beta: defaults::beta(),
            alpha_factor: defaults::alpha_factor(),
            max_occupied: defaults::max_occupied(),
            max_empty: defaults::max_empty(),
            out_of_range_conversion: defaults::out_of_range_conversion(),
            ignore_out_of_range: true,
            ignore_obstructed: true,
            obstructed_certainty: defaults::obstructed_certainty(),
            cell_size_mm: defaults::mapper_cell_size(),
            local_map_distance: defaults::local_map_distance(),
            localize: false,
            motion_model: MotionModelSettings::default(),
        }
    }
}

impl MapperSettings {
    /// Names of fields holding out-of-range values.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.region_i_halfwidth < 10 {
            invalid.push("region_i_halfwidth");
        }
        if !(7..=90).contains(&self.beta) {
            invalid.push("beta");
        }
        if self.alpha_factor <= 0.0 {
            invalid.push("alpha_factor");
        }
        if self.max_occupied <= 0.0 || self.max_occupied >= 1.0 {
            invalid.push("max_occupied");
        }
        if self.max_empty <= 0.0 || self.max_empty > 1.0 {
            invalid.push("max_empty");
        }
        if self.out_of_range_conversion < 1 {
            invalid.push("out_of_range_conversion");
        }
        if !(0.0..=1.0).contains(&self.obstructed_certainty) {
            invalid.push("obstructed_certainty");
        }
        if !(1..=500).contains(&self.cell_size_mm) {
            invalid.push("cell_size_mm");
        }
        if self.local_map_distance < 100 {
            invalid.push("local_map_distance");
        }
        let motion = &self.motion_model;
        if motion.min_height < 0 {
            invalid.push("motion_model.min_height");
        }
        if motion.min_width < 0 {
            invalid.push("motion_model.min_width");
        }
        if motion.unit_distance < 1 {
            invalid.push("motion_model.unit_distance");
        }
        if motion.unit_turn < 1 {
            invalid.push("motion_model.unit_turn");
        }
        if motion.gauss_sigma <= 0.0 {
            invalid.push("motion_model.gauss_sigma");
        }
        invalid
    }

    /// Number of sonars enabled.
    pub fn enabled_sonar_count(&self) -> usize {
        self.enabled_sonars.iter().filter(|&&e| e).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = MapperSettings::default();
        assert!(settings.invalid_fields().is_empty());
        assert_eq!(settings.enabled_sonar_count(), 16);
    }

    #[test]
    fn test_invalid_fields_reported() {
        let settings = MapperSettings {
            beta: 3,
            max_occupied: 1.0,
            motion_model: MotionModelSettings {
                unit_turn: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            settings.invalid_fields(),
            vec!["beta", "max_occupied", "motion_model.unit_turn"]
        );
    }
}
