//! Fixed-delay one-shot timers against the frame clock
//!
//! Timers cannot be cancelled. Each action names the entity it targets, and
//! the controller treats a fired timer whose target is gone as a no-op.

use serde::{Deserialize, Serialize};

/// Deferred follow-ups scheduled by the turn controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Resolve the landing of the stick with this id
    ResolveLanding { stick_id: u32 },
    /// Report game over for the run that scheduled it
    EndGame,
    /// The next platform with this id has finished sliding in
    SettlePlatform { platform_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Scheduled {
    remaining: f32,
    action: TimerAction,
}

/// Pending timers, fired in scheduling order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timers {
    pending: Vec<Scheduled>,
}

impl Timers {
    pub fn schedule(&mut self, delay: f32, action: TimerAction) {
        self.pending.push(Scheduled {
            remaining: delay.max(0.0),
            action,
        });
    }

    /// Advance the clock and return the actions that came due
    pub fn advance(&mut self, dt: f32) -> Vec<TimerAction> {
        let mut due = Vec::new();
        self.pending.retain_mut(|timer| {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                due.push(timer.action);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.pending.iter().any(|t| t.action == action)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
