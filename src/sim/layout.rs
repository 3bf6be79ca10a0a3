//! Platform layout generation
//!
//! Decides where the next platform lands, how wide it is, how wide its
//! perfect-landing zone is, and whether a bonus item hangs in the gap.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::span::Span;
use crate::tuning::Tuning;

/// Inclusive width range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthBounds {
    pub min: f32,
    pub max: f32,
}

impl WidthBounds {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Where `width` sits between min and max, clamped to `[0, 1]`
    pub fn proportion(&self, width: f32) -> f32 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0.0;
        }
        ((width - self.min) / range).clamp(0.0, 1.0)
    }

    /// Width at proportion `t` of the range
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + t * (self.max - self.min)
    }
}

/// Perfect-landing target centered on a platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusZone {
    pub position_x: f32,
    pub width: f32,
    pub visible: bool,
}

impl BonusZone {
    pub fn span(&self) -> Span {
        Span::centered(self.position_x, self.width)
    }
}

/// A platform; `position_x` is the center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub position_x: f32,
    pub width: f32,
    pub bonus_zone: BonusZone,
    /// Whether the body takes part in crash checks
    pub collidable: bool,
}

impl Platform {
    pub fn span(&self) -> Span {
        Span::centered(self.position_x, self.width)
    }

    #[inline]
    pub fn left_edge(&self) -> f32 {
        self.position_x - self.width / 2.0
    }

    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.position_x + self.width / 2.0
    }

    /// Where the player comes to rest after crossing onto this platform
    pub fn landing_x(&self) -> f32 {
        self.position_x + self.width / 3.0
    }

    pub fn translate(&mut self, dx: f32) {
        self.position_x += dx;
        self.bonus_zone.position_x += dx;
    }

    /// Called once the player stands on it: no more crashes, no more bonus
    pub fn retire(&mut self) {
        self.collidable = false;
        self.bonus_zone.visible = false;
    }
}

/// Collectible hanging under the bridge line, inside the gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusItem {
    pub id: u32,
    pub position_x: f32,
    pub width: f32,
}

impl BonusItem {
    pub fn span(&self) -> Span {
        Span::centered(self.position_x, self.width)
    }
}

/// Layout rules, extracted from [`Tuning`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformLayout {
    pub platform_width: WidthBounds,
    pub bonus_zone_width: WidthBounds,
    pub min_gap_distance: f32,
    pub spawn_offset: f32,
    pub item_margin: f32,
    pub item_width: f32,
    pub eligibility_score: u32,
    pub item_chance: f32,
}

impl From<&Tuning> for PlatformLayout {
    fn from(tuning: &Tuning) -> Self {
        Self {
            platform_width: WidthBounds::new(tuning.platform_min_width, tuning.platform_max_width),
            bonus_zone_width: WidthBounds::new(
                tuning.bonus_zone_min_width,
                tuning.bonus_zone_max_width,
            ),
            min_gap_distance: tuning.min_gap_distance,
            spawn_offset: tuning.spawn_offset,
            item_margin: tuning.bonus_item_margin,
            item_width: tuning.bonus_item_width,
            eligibility_score: tuning.bonus_eligibility_score,
            item_chance: tuning.bonus_item_chance,
        }
    }
}

impl PlatformLayout {
    /// Random platform width within bounds
    pub fn platform_width(&self, rng: &mut dyn RandomSource) -> f32 {
        rng.range(self.platform_width.min, self.platform_width.max)
    }

    /// Bonus zone width, proportional to where the platform width sits in its range
    pub fn bonus_zone_width(&self, platform_width: f32) -> f32 {
        let t = self.platform_width.proportion(platform_width);
        self.bonus_zone_width.lerp(t)
    }

    /// Center of the next platform, measured from the previous platform's right edge
    pub fn next_platform_position(
        &self,
        rng: &mut dyn RandomSource,
        previous_edge_x: f32,
        viewport_width: f32,
    ) -> f32 {
        let min_distance = self.min_gap_distance;
        let max_distance = viewport_width - self.platform_width.max - self.spawn_offset;
        if max_distance < min_distance {
            log::debug!(
                "Viewport {} too narrow for gap range, using minimum distance",
                viewport_width
            );
        }
        previous_edge_x + rng.range(min_distance, max_distance.max(min_distance))
    }

    /// Center for a bonus item in the gap, or `None` when the gap cannot hold it
    ///
    /// The item stays `item_margin` clear of both platform edges.
    pub fn bonus_item_position(
        &self,
        rng: &mut dyn RandomSource,
        current_right_edge: f32,
        next_left_edge: f32,
    ) -> Option<f32> {
        let room = Span::new(current_right_edge, next_left_edge)
            .inset(self.item_margin + self.item_width / 2.0)?;
        Some(rng.range(room.left, room.right))
    }

    /// Whether this turn proposes a bonus item at all
    pub fn wants_bonus_item(&self, rng: &mut dyn RandomSource, score: u32) -> bool {
        score >= self.eligibility_score && rng.chance(self.item_chance)
    }

    /// Build a platform of a given width; the bonus zone is centered on it
    pub fn build_platform(&self, id: u32, position_x: f32, width: f32, bonus_visible: bool) -> Platform {
        Platform {
            id,
            position_x,
            width,
            bonus_zone: BonusZone {
                position_x,
                width: self.bonus_zone_width(width),
                visible: bonus_visible,
            },
            collidable: true,
        }
    }

    /// Generate the next platform past `previous_edge_x`
    pub fn spawn_platform(
        &self,
        rng: &mut dyn RandomSource,
        id: u32,
        previous_edge_x: f32,
        viewport_width: f32,
    ) -> Platform {
        let position_x = self.next_platform_position(rng, previous_edge_x, viewport_width);
        let width = self.platform_width(rng);
        self.build_platform(id, position_x, width, true)
    }
}
