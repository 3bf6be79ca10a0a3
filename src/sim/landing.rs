//! Landing resolution and mid-air contact checks
//!
//! `resolve` decides where a fallen stick ends up. The contact helpers reduce
//! player/platform/bonus collisions to interval overlap.

use serde::{Deserialize, Serialize};

use super::layout::{BonusItem, Platform};
use super::player::Player;
use super::span::Span;

/// Outcome of a stick falling across the gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Landing {
    /// Tip inside the perfect zone; also counts as landing on the platform
    BonusHit,
    PlatformHit,
    Miss,
}

impl Landing {
    pub fn is_success(self) -> bool {
        !matches!(self, Landing::Miss)
    }
}

/// Body group reported by a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionGroup {
    Platform,
    Bonus,
}

/// Decide the landing for a stick tip at `stick_tip_x`
///
/// The bonus zone is checked first. Both checks use strict inequalities, so
/// a tip exactly on an edge is outside.
pub fn resolve(stick_tip_x: f32, platform: Span, bonus_zone: Span, bonus_eligible: bool) -> Landing {
    if bonus_eligible && bonus_zone.contains_strict(stick_tip_x) {
        return Landing::BonusHit;
    }
    if platform.contains_strict(stick_tip_x) {
        return Landing::PlatformHit;
    }
    Landing::Miss
}

/// [`resolve`] against a platform and its own bonus zone
pub fn resolve_on(stick_tip_x: f32, platform: &Platform) -> Landing {
    resolve(
        stick_tip_x,
        platform.span(),
        platform.bonus_zone.span(),
        platform.bonus_zone.visible,
    )
}

/// First collidable platform the hanging player runs into
///
/// Only a flipped player can hit a platform body: walking on top of the
/// bridge puts them level with the platform surface.
pub fn platform_contact<'a>(
    player: &Player,
    platforms: impl IntoIterator<Item = &'a Platform>,
) -> Option<&'a Platform> {
    if !player.flipped {
        return None;
    }
    let body = player.body();
    platforms
        .into_iter()
        .find(|p| p.collidable && body.overlaps(&p.span()))
}

/// Whether the hanging player touches the bonus item
pub fn item_contact(player: &Player, item: &BonusItem) -> bool {
    player.flipped && player.body().overlaps(&item.span())
}
