//! Base physical body shared by every gameplay entity
//!
//! A body moves by its velocity, collides as a circle, and dies by flag flip.
//! Removal from the live set happens later, during the per-tick sweep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Entity role tag used for collision dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Bullet,
    EnemyBullet,
    PowerUp,
}

/// Position, motion and collision shape of an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing (radians)
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub alive: bool,
}

impl Body {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            width: radius * 2.0,
            height: radius * 2.0,
            radius,
            alive: true,
        }
    }

    /// Set the render footprint (collision radius is unaffected)
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Integrate position by velocity
    #[inline]
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    #[inline]
    pub fn distance_to(&self, other: &Body) -> f32 {
        self.pos.distance(other.pos)
    }

    /// Angle from this body toward `other` (atan2)
    #[inline]
    pub fn angle_to(&self, other: &Body) -> f32 {
        let d = other.pos - self.pos;
        d.y.atan2(d.x)
    }

    /// Circle-circle overlap; dead bodies never collide
    pub fn collides_with(&self, other: &Body) -> bool {
        if !self.alive || !other.alive {
            return false;
        }
        self.distance_to(other) < self.radius + other.radius
    }

    /// Clamp position into the disk at `center`, projecting outward points
    /// back onto the boundary along the center-to-point ray
    pub fn constrain_to_area(&mut self, center: Vec2, radius: f32) {
        let offset = self.pos - center;
        let distance = offset.length();
        if distance > radius {
            let angle = offset.y.atan2(offset.x);
            self.pos = center + crate::polar_to_cartesian(radius, angle);
        }
    }

    /// Mark dead. Callers decide the consequences.
    #[inline]
    pub fn destroy(&mut self) {
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body_at(x: f32, y: f32, radius: f32) -> Body {
        Body::new(0, EntityKind::Enemy, Vec2::new(x, y), radius)
    }

    #[test]
    fn test_update_integrates_velocity() {
        let mut b = body_at(10.0, 10.0, 5.0);
        b.vel = Vec2::new(100.0, -50.0);
        b.update(0.5);
        assert!((b.pos.x - 60.0).abs() < 1e-4);
        assert!((b.pos.y - -15.0).abs() < 1e-4);
    }

    #[test]
    fn test_collision_touching_is_not_overlap() {
        let a = body_at(0.0, 0.0, 5.0);
        let b = body_at(10.0, 0.0, 5.0);
        assert!(!a.collides_with(&b));

        let c = body_at(9.9, 0.0, 5.0);
        assert!(a.collides_with(&c));
    }

    #[test]
    fn test_constrain_projects_onto_boundary() {
        let mut b = body_at(30.0, 40.0, 1.0);
        b.constrain_to_area(Vec2::ZERO, 25.0);
        assert!((b.pos.length() - 25.0).abs() < 1e-3);
        // Same direction as before
        assert!((b.pos.x - 15.0).abs() < 1e-3);
        assert!((b.pos.y - 20.0).abs() < 1e-3);

        let mut inside = body_at(3.0, 4.0, 1.0);
        inside.constrain_to_area(Vec2::ZERO, 25.0);
        assert_eq!(inside.pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_angle_to() {
        let a = body_at(0.0, 0.0, 1.0);
        let b = body_at(0.0, 10.0, 1.0);
        assert!((a.angle_to(&b) - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn collides_with_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ar in 0.5f32..40.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, br in 0.5f32..40.0,
            a_alive: bool, b_alive: bool,
        ) {
            let mut a = body_at(ax, ay, ar);
            let mut b = body_at(bx, by, br);
            a.alive = a_alive;
            b.alive = b_alive;
            prop_assert_eq!(a.collides_with(&b), b.collides_with(&a));
        }

        #[test]
        fn dead_bodies_never_collide(
            x in -50.0f32..50.0, y in -50.0f32..50.0, r in 1.0f32..100.0,
        ) {
            let mut dead = body_at(x, y, r);
            dead.destroy();
            let other = body_at(x, y, r);
            prop_assert!(!dead.collides_with(&other));
            prop_assert!(!other.collides_with(&dead));
        }
    }
}
