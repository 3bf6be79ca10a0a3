//! Axis-aligned horizontal intervals
//!
//! Every body in the game (platforms, bonus zones, bonus items, the player)
//! is reduced to a span on the x axis. Collision is interval overlap and
//! nothing more.

use serde::{Deserialize, Serialize};

/// A closed interval `[left, right]` on the x axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub left: f32,
    pub right: f32,
}

impl Span {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Span of the given width centered on `center`
    pub fn centered(center: f32, width: f32) -> Self {
        Self {
            left: center - width / 2.0,
            right: center + width / 2.0,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn center(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    /// True when `x` lies strictly inside; touching an edge does not count
    #[inline]
    pub fn contains_strict(&self, x: f32) -> bool {
        x > self.left && x < self.right
    }

    /// True when `other` lies entirely inside this span (edges may touch)
    pub fn contains_span(&self, other: &Span) -> bool {
        other.left >= self.left && other.right <= self.right
    }

    /// Open-interval overlap: spans that merely touch do not overlap
    pub fn overlaps(&self, other: &Span) -> bool {
        self.left < other.right && other.left < self.right
    }

    /// Shrink both ends by `amount`; `None` once the span would be empty
    pub fn inset(&self, amount: f32) -> Option<Span> {
        let span = Span::new(self.left + amount, self.right - amount);
        (span.left < span.right).then_some(span)
    }
}
