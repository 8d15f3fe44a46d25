//! Screen-space geometry for target zones
//!
//! Zones are axis-aligned rectangles in canvas pixels (y grows downward). The
//! host measures them from the page layout; the simulation only reads a cached
//! snapshot that is refreshed after a short TTL.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Whether `x` lies within the horizontal extent, widened by `margin`
    pub fn spans_x(&self, x: f32, margin: f32) -> bool {
        x >= self.left() - margin && x <= self.right() + margin
    }

    /// Whether a circle overlaps the rectangle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let nearest = Vec2::new(
            center.x.clamp(self.left(), self.right()),
            center.y.clamp(self.top(), self.bottom()),
        );
        nearest.distance_squared(center) <= radius * radius
    }

    /// Shrink on every side (never past the center)
    pub fn inset(&self, amount: f32) -> Rect {
        let dx = amount.min(self.w / 2.0);
        let dy = amount.min(self.h / 2.0);
        Rect::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }
}

/// Named zones the simulation interacts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    /// Hammer strike surface
    Anvil,
    /// Pestle strike surface
    Mortar,
    /// Heat source; shovel drop target
    Hearth,
    /// Mold viewport: a heated hammer touching it forges a word
    Mold,
    /// Releasing a dragged tool here puts it away
    Stow,
    /// Where struck letters fly to; shovel scoop surface
    LetterPool,
    /// Where forged word chips fly to
    Verse,
}

/// One snapshot of the page layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zones {
    /// Playfield bounds for free flight; `None` before first layout
    pub bounds: Option<Rect>,
    pub anvil: Option<Rect>,
    pub mortar: Option<Rect>,
    pub hearth: Option<Rect>,
    pub mold: Option<Rect>,
    pub stow: Option<Rect>,
    pub letter_pool: Option<Rect>,
    pub verse: Option<Rect>,
}

impl Zones {
    pub fn get(&self, id: ZoneId) -> Option<Rect> {
        match id {
            ZoneId::Anvil => self.anvil,
            ZoneId::Mortar => self.mortar,
            ZoneId::Hearth => self.hearth,
            ZoneId::Mold => self.mold,
            ZoneId::Stow => self.stow,
            ZoneId::LetterPool => self.letter_pool,
            ZoneId::Verse => self.verse,
        }
    }
}

/// Supplies layout rectangles on demand (DOM measurement on the web)
pub trait LayoutSource {
    fn measure(&self) -> Zones;
}

/// A layout that never changes; used natively and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticLayout(pub Zones);

impl LayoutSource for StaticLayout {
    fn measure(&self) -> Zones {
        self.0.clone()
    }
}

/// TTL cache over a [`LayoutSource`]
///
/// Measurements may be up to `ttl` seconds stale.
#[derive(Debug, Clone)]
pub struct ZoneCache {
    zones: Zones,
    measured_at: Option<f64>,
    ttl: f64,
}

impl ZoneCache {
    pub fn new(ttl: f32) -> Self {
        Self {
            zones: Zones::default(),
            measured_at: None,
            ttl: ttl.max(0.0) as f64,
        }
    }

    /// Current zones, re-measuring if the snapshot is older than the TTL
    pub fn get(&mut self, now: f64, source: &dyn LayoutSource) -> &Zones {
        let stale = match self.measured_at {
            None => true,
            Some(at) => now - at >= self.ttl || now < at,
        };
        if stale {
            self.zones = source.measure();
            self.measured_at = Some(now);
        }
        &self.zones
    }

    /// Force a re-measure on the next `get` (window resize)
    pub fn invalidate(&mut self) {
        self.measured_at = None;
    }

    /// Last snapshot without refreshing
    pub fn snapshot(&self) -> &Zones {
        &self.zones
    }
}

/// Distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingLayout {
        calls: Cell<u32>,
    }

    impl LayoutSource for CountingLayout {
        fn measure(&self) -> Zones {
            self.calls.set(self.calls.get() + 1);
            Zones {
                anvil: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_rect_edges_and_contains() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert!(r.contains(Vec2::new(50.0, 40.0)));
        assert!(!r.contains(Vec2::new(5.0, 40.0)));
        assert!(r.spans_x(5.0, 6.0));
    }

    #[test]
    fn test_overlaps_circle() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(r.overlaps_circle(Vec2::new(110.0, 50.0), 12.0));
        assert!(!r.overlaps_circle(Vec2::new(120.0, 50.0), 12.0));
    }

    #[test]
    fn test_inset_never_inverts() {
        let r = Rect::new(0.0, 0.0, 20.0, 400.0).inset(50.0);
        assert_eq!(r.w, 0.0);
        assert_eq!(r.h, 300.0);
    }

    #[test]
    fn test_zone_cache_respects_ttl() {
        let layout = CountingLayout { calls: Cell::new(0) };
        let mut cache = ZoneCache::new(0.15);

        assert!(cache.get(0.0, &layout).anvil.is_some());
        cache.get(0.1, &layout);
        assert_eq!(layout.calls.get(), 1);

        cache.get(0.2, &layout);
        assert_eq!(layout.calls.get(), 2);

        cache.invalidate();
        cache.get(0.21, &layout);
        assert_eq!(layout.calls.get(), 3);
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(0.0, 100.0);
        assert!((distance_to_segment(Vec2::new(10.0, 50.0), a, b) - 10.0).abs() < 1e-4);
        assert!((distance_to_segment(Vec2::new(0.0, 130.0), a, b) - 30.0).abs() < 1e-4);
        assert!((distance_to_segment(Vec2::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-4);
    }
}
