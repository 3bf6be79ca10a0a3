//! Stick growth
//!
//! Linear growth at a fixed rate with a hard cap. Hitting the cap stops growth
//! and reports an auto-release, exactly as if the player had let go.

use serde::{Deserialize, Serialize};

/// Growth phase of a stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StickPhase {
    Idle,
    Growing,
    Released,
}

/// How the renderer should show the stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StickPose {
    /// Standing on the platform edge
    Upright,
    /// Tipped over to lie across the gap
    Bridged,
    /// Swung down after a miss
    Dropped,
}

/// What a growth step produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthSignal {
    /// Still growing (or not growing at all)
    None,
    /// The cap was reached this step; treat as a release
    AutoRelease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stick {
    pub id: u32,
    /// World x of the stick's base (the current platform's right edge)
    pub origin_x: f32,
    pub length: f32,
    pub phase: StickPhase,
    pub pose: StickPose,
    growth_rate: f32,
    max_length: f32,
}

impl Stick {
    pub fn new(id: u32, origin_x: f32, growth_rate: f32, max_length: f32) -> Self {
        Self {
            id,
            origin_x,
            length: 0.0,
            phase: StickPhase::Idle,
            pose: StickPose::Upright,
            growth_rate,
            max_length,
        }
    }

    pub fn is_growing(&self) -> bool {
        self.phase == StickPhase::Growing
    }

    /// World x of the stick tip once it lies flat
    pub fn tip_x(&self) -> f32 {
        self.origin_x + self.length
    }

    /// Idle -> Growing, length back to zero
    pub fn start_growth(&mut self) -> bool {
        if self.phase != StickPhase::Idle {
            return false;
        }
        self.length = 0.0;
        self.phase = StickPhase::Growing;
        true
    }

    /// Grow by `rate * dt`; clamps at the cap and signals auto-release there
    pub fn advance(&mut self, dt: f32) -> GrowthSignal {
        if self.phase != StickPhase::Growing || dt <= 0.0 {
            return GrowthSignal::None;
        }
        self.length += self.growth_rate * dt;
        if self.length >= self.max_length {
            self.length = self.max_length;
            self.phase = StickPhase::Released;
            log::debug!("Stick {} reached cap {}", self.id, self.max_length);
            return GrowthSignal::AutoRelease;
        }
        GrowthSignal::None
    }

    /// Growing -> Released; no-op otherwise
    pub fn stop_growth(&mut self) -> bool {
        if self.phase != StickPhase::Growing {
            return false;
        }
        self.phase = StickPhase::Released;
        true
    }

    pub fn translate(&mut self, dx: f32) {
        self.origin_x += dx;
    }
}
