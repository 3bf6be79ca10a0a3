//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level designer can override them
//! from JSON without touching the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected tuning values
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{min_field} ({min}) must be below {max_field} ({max})")]
    InvertedRange {
        min_field: &'static str,
        min: f32,
        max_field: &'static str,
        max: f32,
    },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("min_gap_distance ({min_gap}) must be at least half of platform_max_width ({half_width})")]
    GapTooSmall { min_gap: f32, half_width: f32 },
    #[error("bonus item chance must be within [0, 1] (got {0})")]
    ChanceOutOfRange(f32),
}

/// Gameplay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub viewport_width: f32,
    pub player_width: f32,

    pub platform_min_width: f32,
    pub platform_max_width: f32,
    pub initial_platform_width: f32,

    pub bonus_zone_min_width: f32,
    pub bonus_zone_max_width: f32,

    pub min_gap_distance: f32,
    pub spawn_offset: f32,

    pub bonus_item_margin: f32,
    pub bonus_item_width: f32,
    /// Score needed before bonus items may appear
    pub bonus_eligibility_score: u32,
    /// Probability of a bonus item once eligible
    pub bonus_item_chance: f32,

    pub stick_growth_rate: f32,
    pub stick_max_length: f32,
    /// Seconds between release and landing resolution
    pub angle_time: f32,

    pub run_speed: f32,
    pub game_end_delay: f32,
    pub platform_slide_time: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            player_width: PLAYER_WIDTH,

            platform_min_width: PLATFORM_MIN_WIDTH,
            platform_max_width: PLATFORM_MAX_WIDTH,
            initial_platform_width: INITIAL_PLATFORM_WIDTH,

            bonus_zone_min_width: BONUS_ZONE_MIN_WIDTH,
            bonus_zone_max_width: BONUS_ZONE_MAX_WIDTH,

            min_gap_distance: MIN_GAP_DISTANCE,
            spawn_offset: SPAWN_OFFSET,

            bonus_item_margin: BONUS_ITEM_MARGIN,
            bonus_item_width: BONUS_ITEM_WIDTH,
            bonus_eligibility_score: BONUS_ELIGIBILITY_SCORE,
            bonus_item_chance: BONUS_ITEM_CHANCE,

            stick_growth_rate: STICK_GROWTH_RATE,
            stick_max_length: STICK_MAX_LENGTH,
            angle_time: ANGLE_TIME,

            run_speed: RUN_SPEED,
            game_end_delay: GAME_END_DELAY,
            platform_slide_time: PLATFORM_SLIDE_TIME,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the values the simulation divides by or draws ranges from
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("viewport_width", self.viewport_width),
            ("player_width", self.player_width),
            ("platform_min_width", self.platform_min_width),
            ("initial_platform_width", self.initial_platform_width),
            ("stick_growth_rate", self.stick_growth_rate),
            ("stick_max_length", self.stick_max_length),
            ("run_speed", self.run_speed),
        ];
        for (field, value) in positive {
            if value <= 0.0 || value.is_nan() {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("angle_time", self.angle_time),
            ("game_end_delay", self.game_end_delay),
            ("platform_slide_time", self.platform_slide_time),
            ("bonus_item_margin", self.bonus_item_margin),
        ];
        for (field, value) in non_negative {
            if value < 0.0 || value.is_nan() {
                return Err(TuningError::Negative { field, value });
            }
        }

        if self.platform_min_width >= self.platform_max_width {
            return Err(TuningError::InvertedRange {
                min_field: "platform_min_width",
                min: self.platform_min_width,
                max_field: "platform_max_width",
                max: self.platform_max_width,
            });
        }
        if self.bonus_zone_min_width > self.bonus_zone_max_width {
            return Err(TuningError::InvertedRange {
                min_field: "bonus_zone_min_width",
                min: self.bonus_zone_min_width,
                max_field: "bonus_zone_max_width",
                max: self.bonus_zone_max_width,
            });
        }
        // A closer next platform could overlap the current one
        let half_width = self.platform_max_width / 2.0;
        if self.min_gap_distance < half_width {
            return Err(TuningError::GapTooSmall {
                min_gap: self.min_gap_distance,
                half_width,
            });
        }
        if !(0.0..=1.0).contains(&self.bonus_item_chance) {
            return Err(TuningError::ChanceOutOfRange(self.bonus_item_chance));
        }
        Ok(())
    }

    /// Where the player stands after every successful swap
    pub fn home_x(&self) -> f32 {
        -self.viewport_width / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "stick_growth_rate": 600.0 }"#).unwrap();
        assert_eq!(tuning.stick_growth_rate, 600.0);
        assert_eq!(tuning.stick_max_length, STICK_MAX_LENGTH);
        assert_eq!(tuning.bonus_eligibility_score, 2);
    }

    #[test]
    fn test_rejects_inverted_platform_bounds() {
        let err = Tuning::from_json(r#"{ "platform_min_width": 400.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::InvertedRange { .. }));
    }

    #[test]
    fn test_rejects_zero_speed() {
        let err = Tuning::from_json(r#"{ "run_speed": 0.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::NotPositive { field: "run_speed", .. }));
    }

    #[test]
    fn test_rejects_bad_chance() {
        let err = Tuning::from_json(r#"{ "bonus_item_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::ChanceOutOfRange(_)));
    }

    #[test]
    fn test_rejects_negative_delays_and_margin() {
        for field in [
            "angle_time",
            "game_end_delay",
            "platform_slide_time",
            "bonus_item_margin",
        ] {
            let json = format!(r#"{{ "{}": -0.5 }}"#, field);
            let err = Tuning::from_json(&json).unwrap_err();
            assert!(
                matches!(err, TuningError::Negative { field: f, .. } if f == field),
                "{}: {}",
                field,
                err
            );
        }
        assert!(Tuning::from_json(r#"{ "angle_time": 0.0 }"#).is_ok());
    }

    #[test]
    fn test_rejects_gap_that_overlaps_platforms() {
        let err = Tuning::from_json(r#"{ "min_gap_distance": 100.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::GapTooSmall { .. }));
        assert!(Tuning::from_json(r#"{ "min_gap_distance": 150.0 }"#).is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ nope").unwrap_err(),
            TuningError::Parse(_)
        ));
    }
}
