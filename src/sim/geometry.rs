//! Circle overlap primitive
//!
//! Every collidable is a non-rotated circle. Overlap is a strict comparison of
//! squared distances, so exact tangency never counts and no square root is
//! taken per test.

use glam::Vec2;

/// Shape contract shared by every collidable entity
pub trait Collider {
    /// Circle center
    fn pos(&self) -> Vec2;
    /// Collision radius (non-negative)
    fn radius(&self) -> f32;
}

/// True iff the two circles overlap (tangency is not an overlap)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Overlap test between two colliders
#[inline]
pub fn colliders_overlap(a: &impl Collider, b: &impl Collider) -> bool {
    circles_overlap(a.pos(), a.radius(), b.pos(), b.radius())
}
