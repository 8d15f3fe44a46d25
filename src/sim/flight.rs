//! Flying letters and word chips
//!
//! Ballistic entities launched from an impact point toward a target area.
//! Each entity is removed and reported exactly once when it lands.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::FlightTuning;

/// Height the apex clears above a target that sits above the origin
const APEX_CLEARANCE: f32 = 24.0;

/// One ballistic entity carrying a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlyingEntity<P> {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub angular_vel: f32,
    /// Landing point; only `target.y` decides the landing
    pub target: Vec2,
    pub payload: P,
    /// Seconds in flight
    pub age: f32,
}

impl<P> FlyingEntity<P> {
    fn has_landed(&self, max_lifetime: f32) -> bool {
        (self.vel.y > 0.0 && self.pos.y >= self.target.y) || self.age >= max_lifetime
    }
}

/// A landed entity handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Landing<P> {
    pub payload: P,
    pub pos: Vec2,
}

/// Bounded pool of flying entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightPool<P> {
    entities: Vec<FlyingEntity<P>>,
    capacity: usize,
}

impl<P> FlightPool<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: Vec::new(),
            capacity,
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlyingEntity<P>> {
        self.entities.iter()
    }

    /// Add an entity; returns false (and drops it) when the pool is full
    pub fn spawn(&mut self, entity: FlyingEntity<P>) -> bool {
        if self.entities.len() >= self.capacity {
            return false;
        }
        self.entities.push(entity);
        true
    }

    /// Advance every entity and pull out the ones that landed
    pub fn step(&mut self, dt: f32, tuning: &FlightTuning) -> Vec<Landing<P>> {
        let drag = tuning.drag.powf(dt * 60.0);
        for e in &mut self.entities {
            e.vel.x *= drag;
            e.vel.y += tuning.gravity * dt;
            e.pos += e.vel * dt;
            e.angle += e.angular_vel * dt;
            e.age += dt;
        }

        let mut landed = Vec::new();
        let mut i = 0;
        while i < self.entities.len() {
            if self.entities[i].has_landed(tuning.max_lifetime) {
                // Order of the survivors is kept for stable rendering
                let e = self.entities.remove(i);
                landed.push(Landing {
                    payload: e.payload,
                    pos: e.pos,
                });
            } else {
                i += 1;
            }
        }
        landed
    }

}

/// Initial velocity for an entity launched from `origin` toward `target`.
/// The upward speed is raised when needed so the apex clears `target.y`.
pub fn launch_velocity(
    origin: Vec2,
    target: Vec2,
    power: f32,
    head_vx: f32,
    tuning: &FlightTuning,
    rng: &mut impl Rng,
) -> Vec2 {
    let mut up = tuning.launch_base + power.max(0.0) * tuning.launch_scale;
    let rise = origin.y - target.y;
    if rise > 0.0 {
        let needed = (2.0 * tuning.gravity.max(0.0) * (rise + APEX_CLEARANCE)).sqrt();
        up = up.max(needed);
    }
    let pull = (target.x - origin.x) * tuning.target_pull;
    let jitter = if tuning.spread > 0.0 {
        rng.random_range(-tuning.spread..tuning.spread)
    } else {
        0.0
    };
    Vec2::new(head_vx * tuning.inherit_vx + pull + jitter, -up)
}

/// A freshly launched entity with random spin
pub fn launch<P>(
    origin: Vec2,
    target: Vec2,
    power: f32,
    head_vx: f32,
    payload: P,
    tuning: &FlightTuning,
    rng: &mut impl Rng,
) -> FlyingEntity<P> {
    let vel = launch_velocity(origin, target, power, head_vx, tuning, rng);
    let angular_vel = if tuning.max_angular_vel > 0.0 {
        rng.random_range(-tuning.max_angular_vel..tuning.max_angular_vel)
    } else {
        0.0
    };
    FlyingEntity {
        pos: origin,
        vel,
        angle: 0.0,
        angular_vel,
        target,
        payload,
        age: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::LetterTile;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn letter(glyph: char) -> LetterTile {
        LetterTile { glyph }
    }

    #[test]
    fn test_letter_lands_once_with_payload() {
        let tuning = FlightTuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut pool = FlightPool::new(8);
        let origin = Vec2::new(100.0, 100.0);
        let e = launch(origin, Vec2::new(300.0, 500.0), 1.0, 0.0, letter('א'), &tuning, &mut rng);
        assert!(e.vel.y < 0.0, "launch is upward");
        assert!(pool.spawn(e));

        let mut landings = Vec::new();
        let mut ticks = 0;
        while ticks < 1000 {
            landings.extend(pool.step(1.0 / 60.0, &tuning));
            ticks += 1;
            if !landings.is_empty() {
                break;
            }
        }
        assert_eq!(landings.len(), 1);
        assert_eq!(landings[0].payload, letter('א'));
        assert!(landings[0].pos.y >= 500.0);
        assert!(pool.is_empty());

        for _ in 0..30 {
            assert!(pool.step(1.0 / 60.0, &tuning).is_empty());
        }
    }

    #[test]
    fn test_rising_entity_below_target_does_not_land() {
        let tuning = FlightTuning::default();
        let mut pool = FlightPool::new(1);
        pool.spawn(FlyingEntity {
            pos: Vec2::new(0.0, 600.0),
            vel: Vec2::new(0.0, -900.0),
            angle: 0.0,
            angular_vel: 0.0,
            target: Vec2::new(0.0, 500.0),
            payload: letter('ב'),
            age: 0.0,
        });
        assert!(pool.step(1.0 / 60.0, &tuning).is_empty());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_stale_entity_is_delivered() {
        let tuning = FlightTuning {
            gravity: 0.0,
            max_lifetime: 0.5,
            ..Default::default()
        };
        let mut pool = FlightPool::new(1);
        pool.spawn(FlyingEntity {
            pos: Vec2::ZERO,
            vel: Vec2::new(10.0, 0.0),
            angle: 0.0,
            angular_vel: 0.0,
            target: Vec2::new(0.0, 500.0),
            payload: 3u8,
            age: 0.0,
        });
        let mut delivered = 0;
        for _ in 0..60 {
            delivered += pool.step(1.0 / 60.0, &tuning).len();
        }
        assert_eq!(delivered, 1);
    }

    #[test]
    fn test_pool_drops_overflow() {
        let tuning = FlightTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = FlightPool::new(2);
        for _ in 0..2 {
            let e = launch(Vec2::ZERO, Vec2::new(0.0, 100.0), 0.5, 0.0, letter('ג'), &tuning, &mut rng);
            assert!(pool.spawn(e));
        }
        let e = launch(Vec2::ZERO, Vec2::new(0.0, 100.0), 0.5, 0.0, letter('ד'), &tuning, &mut rng);
        assert!(!pool.spawn(e));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_launch_pulls_toward_target_and_inherits_swing() {
        let tuning = FlightTuning {
            spread: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let right = launch_velocity(Vec2::ZERO, Vec2::new(200.0, 0.0), 1.0, 0.0, &tuning, &mut rng);
        assert!(right.x > 0.0);
        assert!((right.y + tuning.launch_base + tuning.launch_scale).abs() < 1e-3);

        let swung = launch_velocity(Vec2::ZERO, Vec2::ZERO, 0.0, 1000.0, &tuning, &mut rng);
        assert!((swung.x - 1000.0 * tuning.inherit_vx).abs() < 1e-3);
    }

    #[test]
    fn test_chip_reaches_target_above_origin() {
        let tuning = FlightTuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut pool = FlightPool::new(1);
        let target = Vec2::new(300.0, 100.0);
        pool.spawn(launch(Vec2::new(200.0, 600.0), target, 1.0, 0.0, 9u8, &tuning, &mut rng));

        let mut landings = Vec::new();
        for _ in 0..600 {
            landings.extend(pool.step(1.0 / 60.0, &tuning));
            if !landings.is_empty() {
                break;
            }
        }
        assert_eq!(landings.len(), 1);
        let y = landings[0].pos.y;
        assert!(y >= target.y && y < target.y + 30.0, "landed at {y}");
    }
}
