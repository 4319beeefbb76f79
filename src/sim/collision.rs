//! Axis-aligned box collision
//!
//! `overlaps` is the only geometric predicate. Which side a mover hit is
//! decided separately from its pre-move position (see `classify_contact`).

use serde::{Deserialize, Serialize};

/// Axis-aligned box: top-left corner plus size (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.h * 0.5
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            w: (self.w - 2.0 * amount).max(0.0),
            h: (self.h - 2.0 * amount).max(0.0),
        }
    }
}

/// Strict overlap test (touching edges do not overlap)
#[inline]
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Which side of a solid an overlapping mover came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Bottom was above the solid's top before the move
    Top,
    /// Top was below the solid's bottom before the move
    Below,
    /// Neither: horizontal contact
    Side,
}

/// Classify a contact from the mover's pre-move y.
///
/// `dy_step` is the vertical displacement applied this tick; when falling it
/// widens the landing window so fast falls still land.
pub fn classify_contact(mover: &Aabb, prev_y: f32, dy_step: f32, solid: &Aabb, tolerance: f32) -> Contact {
    if prev_y + mover.h <= solid.y + dy_step.max(0.0) + tolerance {
        Contact::Top
    } else if prev_y >= solid.bottom() {
        Contact::Below
    } else {
        Contact::Side
    }
}
