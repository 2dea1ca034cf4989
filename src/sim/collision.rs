//! Collision tests and boundary policies
//!
//! All overlap tests are strict: touching edges or tangent circles do not
//! count as a hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Bounding box of a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap on both axes
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Circles collide when the distance between centres is below the sum of radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Toroidal wrap. A body may drift `margin` past an edge before it
/// reappears on the opposite side, also `margin` outside.
pub fn wrap(pos: &mut Vec2, size: Vec2, margin: f32) {
    if pos.x < -margin {
        pos.x = size.x + margin;
    } else if pos.x > size.x + margin {
        pos.x = -margin;
    }
    if pos.y < -margin {
        pos.y = size.y + margin;
    } else if pos.y > size.y + margin {
        pos.y = -margin;
    }
}

/// Face of a rectangle a circle was pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Push a circle out of a rectangle along the axis of least penetration and
/// reflect the matching velocity component, scaled by `restitution`.
///
/// Ties resolve in the order left, right, top, bottom.
pub fn resolve_circle_rect(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    rect: &Rect,
    restitution: f32,
) -> Option<Side> {
    if !Rect::around_circle(*pos, radius).overlaps(rect) {
        return None;
    }

    let left = pos.x + radius - rect.x;
    let right = rect.right() - (pos.x - radius);
    let top = pos.y + radius - rect.y;
    let bottom = rect.bottom() - (pos.y - radius);
    let min = left.min(right).min(top).min(bottom);

    let side = if min == left {
        pos.x = rect.x - radius;
        vel.x = -vel.x.abs() * restitution;
        Side::Left
    } else if min == right {
        pos.x = rect.right() + radius;
        vel.x = vel.x.abs() * restitution;
        Side::Right
    } else if min == top {
        pos.y = rect.y - radius;
        vel.y = -vel.y.abs() * restitution;
        Side::Top
    } else {
        pos.y = rect.bottom() + radius;
        vel.y = vel.y.abs() * restitution;
        Side::Bottom
    };
    Some(side)
}

/// Keep a circle inside `[0, size]`, bouncing off each wall with `restitution`
pub fn bounce_in_bounds(pos: &mut Vec2, vel: &mut Vec2, radius: f32, size: Vec2, restitution: f32) {
    if pos.x - radius < 0.0 {
        pos.x = radius;
        vel.x = vel.x.abs() * restitution;
    }
    if pos.x + radius > size.x {
        pos.x = size.x - radius;
        vel.x = -vel.x.abs() * restitution;
    }
    if pos.y - radius < 0.0 {
        pos.y = radius;
        vel.y = vel.y.abs() * restitution;
    }
    if pos.y + radius > size.y {
        pos.y = size.y - radius;
        vel.y = -vel.y.abs() * restitution;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tangent_circles_do_not_collide() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(!circles_overlap(a, 5.0, b, 5.0));
        assert!(circles_overlap(a, 5.0, b, 5.01));
    }

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_wrap_with_margin() {
        let size = Vec2::new(100.0, 50.0);
        let mut p = Vec2::new(-11.0, 20.0);
        wrap(&mut p, size, 10.0);
        assert_eq!(p, Vec2::new(110.0, 20.0));

        let mut p = Vec2::new(50.0, 51.0);
        wrap(&mut p, size, 0.0);
        assert_eq!(p, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_resolve_landing_on_top() {
        let rect = Rect::new(0.0, 100.0, 200.0, 20.0);
        let mut pos = Vec2::new(100.0, 90.0);
        let mut vel = Vec2::new(0.0, 4.0);
        let side = resolve_circle_rect(&mut pos, &mut vel, 15.0, &rect, 0.5);
        assert_eq!(side, Some(Side::Top));
        assert_eq!(pos.y, 85.0);
        assert_eq!(vel.y, -2.0);
    }

    #[test]
    fn test_resolve_tie_prefers_left() {
        // Square rect with the circle's box exactly covering it: all overlaps equal
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
        let mut pos = Vec2::new(10.0, 10.0);
        let mut vel = Vec2::new(3.0, 0.0);
        let side = resolve_circle_rect(&mut pos, &mut vel, 10.0, &rect, 0.5);
        assert_eq!(side, Some(Side::Left));
        assert_eq!(pos.x, -10.0);
        assert_eq!(vel.x, -1.5);
    }

    #[test]
    fn test_resolve_miss() {
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
        let mut pos = Vec2::new(50.0, 50.0);
        let mut vel = Vec2::ONE;
        assert_eq!(resolve_circle_rect(&mut pos, &mut vel, 5.0, &rect, 0.5), None);
        assert_eq!(vel, Vec2::ONE);
    }

    proptest! {
        #[test]
        fn prop_bounce_keeps_circle_inside(
            x in -500.0f32..1500.0,
            y in -500.0f32..1100.0,
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
        ) {
            let size = Vec2::new(900.0, 600.0);
            let mut pos = Vec2::new(x, y);
            let mut vel = Vec2::new(vx, vy);
            bounce_in_bounds(&mut pos, &mut vel, 15.0, size, 0.5);
            prop_assert!(pos.x >= 15.0 && pos.x <= 885.0);
            prop_assert!(pos.y >= 15.0 && pos.y <= 585.0);
        }

        #[test]
        fn prop_wrap_stays_within_margin(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
        ) {
            let size = Vec2::new(1200.0, 800.0);
            let mut pos = Vec2::new(x, y);
            // A single wrap only fixes bodies that moved at most one frame past
            // the edge, so clamp the input to that regime first.
            pos.x = pos.x.clamp(-60.0, 1260.0);
            pos.y = pos.y.clamp(-60.0, 860.0);
            wrap(&mut pos, size, 50.0);
            prop_assert!(pos.x >= -50.0 && pos.x <= 1250.0);
            prop_assert!(pos.y >= -50.0 && pos.y <= 850.0);
        }

        #[test]
        fn prop_circle_overlap_is_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            ra in 0.0f32..50.0, rb in 0.0f32..50.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(circles_overlap(a, ra, b, rb), circles_overlap(b, rb, a, ra));
        }

        #[test]
        fn prop_resolve_separates(
            x in 0.0f32..200.0,
            y in 80.0f32..140.0,
        ) {
            let rect = Rect::new(50.0, 100.0, 100.0, 20.0);
            let mut pos = Vec2::new(x, y);
            let mut vel = Vec2::new(1.0, 1.0);
            if resolve_circle_rect(&mut pos, &mut vel, 15.0, &rect, 0.5).is_some() {
                // Allow float rounding at the contact edge
                let shrunk = Rect::new(rect.x + 0.01, rect.y + 0.01, rect.w - 0.02, rect.h - 0.02);
                prop_assert!(!Rect::around_circle(pos, 15.0).overlaps(&shrunk));
            }
        }
    }
}
