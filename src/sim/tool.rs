//! Tethered tool engine
//!
//! Hammer, pestle and shovel share one engine. A tool is a heavy head on a
//! shaft. While the player holds it the head hangs from the pointer (the
//! pivot) under a distance constraint; once released or torn free it becomes a
//! projectile, optionally spinning around a flying pivot.
//!
//! Coordinates are canvas pixels with y growing downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::economy::EconomyInputs;
use super::events::{ForgeEvent, SoundCue};
use super::geom::{Rect, ZoneId, Zones, distance_to_segment};
use super::heat::{HeatCharge, HeatSource};
use super::impact;
use crate::tuning::{SpinTuning, ToolTuning, Tuning};
use crate::{angle_from_up, clamp_dt, normalize_angle, safe_direction, up_rotated};

/// Which tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Hammer,
    Pestle,
    Shovel,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Hammer, ToolKind::Pestle, ToolKind::Shovel];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Hammer => "hammer",
            ToolKind::Pestle => "pestle",
            ToolKind::Shovel => "shovel",
        }
    }

    /// Surface this tool strikes to produce
    pub fn strike_zone(&self) -> ZoneId {
        match self {
            ToolKind::Hammer => ZoneId::Anvil,
            ToolKind::Pestle => ZoneId::Mortar,
            ToolKind::Shovel => ZoneId::LetterPool,
        }
    }

    /// Only the hammer presses the mold
    pub fn forges_words(&self) -> bool {
        matches!(self, ToolKind::Hammer)
    }

    pub fn strike_sound(&self) -> SoundCue {
        match self {
            ToolKind::Hammer => SoundCue::AnvilClank,
            ToolKind::Pestle => SoundCue::MortarGrind,
            ToolKind::Shovel => SoundCue::ShovelScoop,
        }
    }
}

/// Mutually exclusive tool regimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMode {
    /// Grabbed, just picked up or rebounding. While the rebound lock runs
    /// the head flies on its bounce, only the hard tether limit applies and
    /// strikes do not count.
    Held,
    /// Grabbed and swinging; strikes are live
    TetheredSwing,
    /// Plain free flight: dropped, or ripped out of the grip by a hard strike
    Free,
    /// Thrown with the head orbiting a flying pivot
    SpinningThrow,
}

/// What a pointer release did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Tool was not held by that pointer
    Ignored,
    /// Released over the stow zone
    Stowed,
    /// Dropped into plain free flight
    Dropped,
    /// Launched into a spinning throw
    Thrown,
}

/// Capabilities the host lends a tool for one call
pub trait ToolHost {
    fn zones(&self) -> &Zones;
    /// `None` until the heat source exists
    fn heat_source(&self) -> Option<&dyn HeatSource>;
    fn inputs(&self) -> &EconomyInputs;
    /// Freeze page scrolling while a tool is dragged
    fn lock_input(&mut self, locked: bool);
    /// Whether `point` is over some other tool
    fn other_tool_near(&self, point: Vec2) -> bool;
    fn emit(&mut self, event: ForgeEvent);
}

/// The striking mass
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Head {
    pub pos: Vec2,
    /// Position one step ago (tethered velocity is derived from this)
    pub prev: Vec2,
    pub vel: Vec2,
}

impl Head {
    pub fn at_rest(pos: Vec2) -> Self {
        Self {
            pos,
            prev: pos,
            vel: Vec2::ZERO,
        }
    }
}

/// One tool instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub kind: ToolKind,
    pub tuning: ToolTuning,
    pub spin: SpinTuning,
    bottom_zone: f32,
    pub pivot: Vec2,
    pub head: Head,
    /// Current tether distance, never above `max_length`
    pub length: f32,
    pub mode: ToolMode,
    /// Pointer currently dragging the tool
    pub pointer_id: Option<i32>,
    pub heat: HeatCharge,
    /// Tumble/orbit rate in free flight (rad/s)
    pub angular_velocity: f32,
    /// Drawn rotation of the shaft around the head in free flight
    pub visual_rotation: f32,
    /// Orbit angle of the head around the flying pivot
    pub spin_rotation: f32,
    pub orbit_radius: f32,
    /// Velocity of the flying pivot during a spinning throw
    pub pivot_vel: Vec2,
    /// Spin built up by power swinging while held
    pub swing_spin: f32,
    last_orientation: f32,
    pub strike_cooldown: f32,
    pub rebound_lock: f32,
    pub regrab_cooldown: f32,
    /// Set once the head has cleared the strike band since the last strike
    pub exit_armed: bool,
    pub(crate) last_dt: f32,
}

impl Tool {
    /// A tool lying at `rest` with its shaft pointing up
    pub fn new(kind: ToolKind, tuning: &Tuning, rest: Vec2) -> Self {
        let tool_tuning = tuning.tool(kind).clone();
        let length = tool_tuning.base_length;
        Self {
            kind,
            heat: HeatCharge::new(tool_tuning.heating_required),
            pivot: rest + up_rotated(0.0) * length,
            head: Head::at_rest(rest),
            length,
            mode: ToolMode::Free,
            pointer_id: None,
            angular_velocity: 0.0,
            visual_rotation: 0.0,
            spin_rotation: 0.0,
            orbit_radius: length,
            pivot_vel: Vec2::ZERO,
            swing_spin: 0.0,
            last_orientation: 0.0,
            strike_cooldown: 0.0,
            rebound_lock: 0.0,
            regrab_cooldown: 0.0,
            exit_armed: true,
            last_dt: 1.0 / 60.0,
            bottom_zone: tuning.zones.bottom_zone,
            spin: tuning.spin.clone(),
            tuning: tool_tuning,
        }
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        matches!(self.mode, ToolMode::Held | ToolMode::TetheredSwing)
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self.mode, ToolMode::Free | ToolMode::SpinningThrow)
    }

    pub fn base_length(&self) -> f32 {
        self.tuning.base_length
    }

    pub fn max_length(&self) -> f32 {
        self.tuning.max_length
    }

    /// Shaft angle clockwise from straight up, pivot to head
    pub fn orientation(&self) -> f32 {
        angle_from_up(self.head.pos - self.pivot)
    }

    /// Current spin magnitude relevant to grabbing
    pub fn spin_rate(&self) -> f32 {
        match self.mode {
            ToolMode::Held | ToolMode::TetheredSwing => 0.0,
            ToolMode::Free | ToolMode::SpinningThrow => self.angular_velocity.abs(),
        }
    }

    /// Whether `point` is on the handle or head
    pub fn hit_test(&self, point: Vec2) -> bool {
        distance_to_segment(point, self.pivot, self.head.pos)
            <= self.tuning.grab_radius.max(self.tuning.head_radius)
    }

    /// Rip speed including grip upgrades
    pub fn rip_threshold(&self, inputs: &EconomyInputs) -> f32 {
        self.tuning.rip_speed + inputs.rip_speed_bonus
    }

    // === Input ===

    /// Pointer down. Returns true if the tool is now held by `pointer_id`.
    pub fn try_grab(&mut self, point: Vec2, pointer_id: i32, host: &mut dyn ToolHost) -> bool {
        if self.is_held() || self.regrab_cooldown > 0.0 {
            return false;
        }
        if !self.hit_test(point) {
            return false;
        }
        // Another tool lying on top wins unless the pointer is right on our head
        if host.other_tool_near(point)
            && point.distance(self.head.pos) > self.tuning.head_radius
        {
            return false;
        }
        if self.spin_rate() > self.spin.max_grab_spin
            && !in_bottom_zone(point, host.zones().bounds, self.bottom_zone)
        {
            log::debug!("{} spinning too fast to catch", self.kind.as_str());
            return false;
        }

        if self.mode == ToolMode::SpinningThrow {
            self.head.vel = self.pivot_vel;
        }
        self.mode = ToolMode::Held;
        self.pointer_id = Some(pointer_id);
        self.pivot = point;
        self.angular_velocity = 0.0;
        self.visual_rotation = 0.0;
        self.swing_spin = 0.0;
        self.length = self.length.clamp(0.0, self.tuning.max_length);
        self.head.prev = self.head.pos - self.head.vel * self.last_dt;
        self.last_orientation = self.orientation();

        host.lock_input(true);
        host.emit(ForgeEvent::Sound(SoundCue::Grab));
        true
    }

    /// Pointer move; only the grabbing pointer steers the pivot
    pub fn drag_to(&mut self, point: Vec2, pointer_id: i32) {
        if self.is_held() && self.pointer_id == Some(pointer_id) {
            self.pivot = point;
        }
    }

    /// Pointer up
    pub fn release(&mut self, point: Vec2, pointer_id: i32, host: &mut dyn ToolHost) -> ReleaseOutcome {
        if !self.is_held() || self.pointer_id != Some(pointer_id) {
            return ReleaseOutcome::Ignored;
        }
        self.pointer_id = None;
        host.lock_input(false);

        if host.zones().stow.is_some_and(|r| r.contains(point)) {
            self.mode = ToolMode::Free;
            self.head.vel = Vec2::ZERO;
            self.angular_velocity = 0.0;
            self.visual_rotation = 0.0;
            host.emit(ForgeEvent::PutAway { tool: self.kind });
            log::info!("{} put away", self.kind.as_str());
            return ReleaseOutcome::Stowed;
        }

        let throw_level = host.inputs().spin_throw_level;
        if throw_level > 0 {
            self.begin_spin_throw(throw_level);
            host.emit(ForgeEvent::Sound(SoundCue::Whoosh));
            ReleaseOutcome::Thrown
        } else {
            self.enter_free(self.swing_spin);
            ReleaseOutcome::Dropped
        }
    }

    /// Switch to plain free flight keeping the current head velocity
    pub(crate) fn enter_free(&mut self, angular_velocity: f32) {
        self.mode = ToolMode::Free;
        self.pointer_id = None;
        self.visual_rotation = angle_from_up(self.pivot - self.head.pos);
        self.angular_velocity = angular_velocity.clamp(-self.spin.max_spin, self.spin.max_spin);
    }

    fn begin_spin_throw(&mut self, throw_level: u32) {
        let spin = &self.spin;
        let shaft = self.pivot - self.head.pos;
        let flying_pivot = self.head.pos + shaft * spin.rebase_fraction;
        let (dir, radius) = safe_direction(self.head.pos - flying_pivot);

        let omega = if self.swing_spin.abs() > spin.inherit_threshold {
            self.swing_spin
        } else {
            let sign = if self.head.vel.x >= 0.0 { 1.0 } else { -1.0 };
            let fresh = spin.base_spin + spin.spin_per_level * throw_level.saturating_sub(1) as f32;
            sign * fresh
        };

        self.mode = ToolMode::SpinningThrow;
        self.pointer_id = None;
        self.pivot = flying_pivot;
        self.orbit_radius = radius;
        self.spin_rotation = angle_from_up(dir);
        self.visual_rotation = self.spin_rotation;
        self.pivot_vel = self.head.vel * spin.throw_velocity_scale;
        self.angular_velocity = omega.clamp(-spin.max_spin, spin.max_spin);
        log::debug!(
            "{} thrown at {:.1} rad/s (level {})",
            self.kind.as_str(),
            self.angular_velocity,
            throw_level
        );
    }

    /// Leave the spinning throw without a visible snap
    pub(crate) fn end_spin(&mut self) {
        self.mode = ToolMode::Free;
        // Orbit angle is measured pivot->head; tumbling is measured head->pivot
        self.visual_rotation = normalize_angle(self.spin_rotation + std::f32::consts::PI);
        self.head.vel = self.pivot_vel;
        self.pivot = self.head.pos + up_rotated(self.visual_rotation) * self.tuning.base_length;
    }

    // === Simulation ===

    /// Advance one frame
    pub fn step(&mut self, host: &mut dyn ToolHost, dt: f32) {
        let dt = clamp_dt(dt);
        self.tick_cooldowns(dt);

        let bounds = host.zones().bounds;
        match self.mode {
            ToolMode::Held | ToolMode::TetheredSwing => {
                self.integrate_tethered(dt);
                self.update_swing_spin(host.inputs().power_swing_level, dt);
            }
            ToolMode::Free => self.integrate_free(bounds, host, dt),
            ToolMode::SpinningThrow => self.integrate_spin(bounds, host, dt),
        }
        self.clamp_runaway(dt);
        self.last_dt = dt;

        self.update_heat(host, dt);
        impact::resolve_strike_zone(self, host);
        if self.kind.forges_words() {
            impact::resolve_mold(self, host);
        }

        if self.is_held() {
            self.clamp_tether();
        }
        if self.mode == ToolMode::Held && self.rebound_lock <= 0.0 {
            self.mode = ToolMode::TetheredSwing;
        }
    }

    fn tick_cooldowns(&mut self, dt: f32) {
        self.strike_cooldown = (self.strike_cooldown - dt).max(0.0);
        self.rebound_lock = (self.rebound_lock - dt).max(0.0);
        self.regrab_cooldown = (self.regrab_cooldown - dt).max(0.0);
    }

    /// Verlet step followed by the distance constraint.
    ///
    /// Velocity is re-derived after constraining; deriving it before would
    /// under-report impact speed.
    fn integrate_tethered(&mut self, dt: f32) {
        let t = &self.tuning;
        let mut vel = (self.head.pos - self.head.prev) / dt;
        vel *= t.air_friction.powf(dt * 60.0);
        vel.y += t.gravity / t.head_mass * dt;

        self.head.prev = self.head.pos;
        self.head.pos += vel * dt;

        self.length = (t.base_length + vel.length() * t.stretch_per_speed).clamp(0.0, t.max_length);
        if self.rebound_lock > 0.0 {
            self.clamp_tether();
        } else {
            self.apply_constraint();
        }
        self.head.vel = (self.head.pos - self.head.prev) / dt;
    }

    /// Single-iteration distance constraint; heavier heads lag a held pivot
    fn apply_constraint(&mut self) {
        let target = self.length.min(self.tuning.max_length);
        let (dir, dist) = safe_direction(self.head.pos - self.pivot);
        let mut correction = dist - target;
        if self.is_held() {
            correction /= self.tuning.head_mass.sqrt();
        }
        self.head.pos -= dir * correction;
        self.clamp_tether();
    }

    /// Hard ceiling on the tether distance
    fn clamp_tether(&mut self) {
        let max = self.tuning.max_length;
        let offset = self.head.pos - self.pivot;
        if offset.length_squared() > max * max {
            let (dir, _) = safe_direction(offset);
            self.head.pos = self.pivot + dir * max;
        }
    }

    fn update_swing_spin(&mut self, power_swing_level: u32, dt: f32) {
        let orientation = self.orientation();
        let rate = normalize_angle(orientation - self.last_orientation) / dt;
        self.last_orientation = orientation;
        if power_swing_level == 0 {
            self.swing_spin = 0.0;
            return;
        }
        let target = rate * self.spin.power_swing_gain * power_swing_level as f32;
        let blend = (6.0 * dt).min(1.0);
        self.swing_spin += (target - self.swing_spin) * blend;
    }

    fn integrate_free(&mut self, bounds: Option<Rect>, host: &mut dyn ToolHost, dt: f32) {
        let t = &self.tuning;
        let mut vel = self.head.vel * t.free_drag.powf(dt * 60.0);
        vel.y += t.gravity * dt;

        self.head.prev = self.head.pos;
        let mut pos = self.head.pos + vel * dt;
        if let Some(b) = bounds {
            let impact = collide_bounds(&mut pos, &mut vel, b, t.head_radius, self.wall_response());
            if impact > t.impact_threshold * 0.5 {
                host.emit(ForgeEvent::Sound(SoundCue::Thud));
            }
        }
        self.head.pos = pos;
        self.head.vel = vel;

        self.tumble(dt);
        self.pivot = self.head.pos + up_rotated(self.visual_rotation) * self.tuning.base_length;
    }

    /// Free-flight rotation: friction, then an ease back upright once slow
    fn tumble(&mut self, dt: f32) {
        let spin = &self.spin;
        self.angular_velocity *= spin.free_spin_friction.powf(dt * 60.0);
        if self.angular_velocity.abs() < spin.settle_threshold {
            self.angular_velocity = 0.0;
            let rotation = normalize_angle(self.visual_rotation);
            self.visual_rotation = rotation - rotation * (spin.settle_rate * dt).min(1.0);
        } else {
            self.visual_rotation = normalize_angle(self.visual_rotation + self.angular_velocity * dt);
        }
    }

    fn integrate_spin(&mut self, bounds: Option<Rect>, host: &mut dyn ToolHost, dt: f32) {
        let t = &self.tuning;
        let mut vel = self.pivot_vel * t.free_drag.powf(dt * 60.0);
        vel.y += t.gravity * dt;
        let mut pivot = self.pivot + vel * dt;
        if let Some(b) = bounds {
            let reach = self.orbit_radius + t.head_radius;
            let impact = collide_bounds(&mut pivot, &mut vel, b, reach, self.wall_response());
            if impact > t.impact_threshold * 0.5 {
                host.emit(ForgeEvent::Sound(SoundCue::Thud));
                self.angular_velocity *= self.spin.pass_spin_loss;
            }
        }
        self.pivot = pivot;
        self.pivot_vel = vel;

        self.angular_velocity *= self.spin.spin_friction.powf(dt * 60.0);
        self.spin_rotation = normalize_angle(self.spin_rotation + self.angular_velocity * dt);
        self.visual_rotation = self.spin_rotation;

        self.head.prev = self.head.pos;
        self.head.pos = self.pivot + up_rotated(self.spin_rotation) * self.orbit_radius;
        self.head.vel = (self.head.pos - self.head.prev) / dt;

        if self.angular_velocity.abs() < self.spin.end_threshold {
            self.end_spin();
        }
    }

    /// Wall restitution and friction, softened by head mass
    pub(crate) fn wall_response(&self) -> WallResponse {
        WallResponse {
            restitution: self.tuning.restitution / self.tuning.head_mass,
            tangential_damping: self.tuning.tangential_damping,
            stop_threshold: self.tuning.stop_threshold,
        }
    }

    fn clamp_runaway(&mut self, dt: f32) {
        let max_speed = self.tuning.max_speed;
        if self.head.vel.length_squared() > max_speed * max_speed {
            self.head.vel = self.head.vel.clamp_length_max(max_speed);
            if self.is_held() {
                self.head.prev = self.head.pos - self.head.vel * dt;
            }
        }
        self.pivot_vel = self.pivot_vel.clamp_length_max(max_speed);
        self.angular_velocity = self
            .angular_velocity
            .clamp(-self.spin.max_spin, self.spin.max_spin);
        self.swing_spin = self.swing_spin.clamp(-self.spin.max_spin, self.spin.max_spin);
        self.length = self.length.clamp(0.0, self.tuning.max_length);
    }

    fn update_heat(&mut self, host: &mut dyn ToolHost, dt: f32) {
        let over_hearth = host
            .zones()
            .hearth
            .is_some_and(|r| r.overlaps_circle(self.head.pos, self.tuning.head_radius));
        let source = if over_hearth { host.heat_source() } else { None };
        let player_max = host.inputs().max_heat_level;
        if self.heat.accumulate(source, player_max, dt) {
            let level = self.heat.level;
            host.emit(ForgeEvent::HeatLevelUp { tool: self.kind, level });
            host.emit(ForgeEvent::Sound(SoundCue::HeatUp));
        }
    }

    /// Set the head velocity, keeping the Verlet history consistent
    pub(crate) fn set_head_velocity(&mut self, vel: Vec2) {
        self.head.vel = vel;
        self.head.prev = self.head.pos - vel * self.last_dt;
    }
}

/// Bounce coefficients for walls and floors
#[derive(Debug, Clone, Copy)]
pub struct WallResponse {
    pub restitution: f32,
    pub tangential_damping: f32,
    pub stop_threshold: f32,
}

/// Keep a circle inside `bounds`, reflecting velocity with loss.
/// Returns the largest normal speed absorbed this call (0 if no contact).
pub fn collide_bounds(pos: &mut Vec2, vel: &mut Vec2, bounds: Rect, radius: f32, response: WallResponse) -> f32 {
    let inner = bounds.inset(radius);
    let mut impact: f32 = 0.0;

    let hit_axis = |p: &mut f32, v: &mut f32, tangent: &mut f32, lo: f32, hi: f32| {
        let mut normal_speed = 0.0;
        if *p > hi {
            *p = hi;
            if *v > 0.0 {
                normal_speed = *v;
                *v = -*v * response.restitution;
            }
        } else if *p < lo {
            *p = lo;
            if *v < 0.0 {
                normal_speed = -*v;
                *v = -*v * response.restitution;
            }
        }
        if normal_speed > 0.0 {
            *tangent *= response.tangential_damping;
            if v.abs() < response.stop_threshold {
                *v = 0.0;
            }
            if tangent.abs() < response.stop_threshold * 0.1 {
                *tangent = 0.0;
            }
        }
        normal_speed
    };

    impact = impact.max(hit_axis(&mut pos.y, &mut vel.y, &mut vel.x, inner.top(), inner.bottom()));
    impact = impact.max(hit_axis(&mut pos.x, &mut vel.x, &mut vel.y, inner.left(), inner.right()));
    impact
}

fn in_bottom_zone(point: Vec2, bounds: Option<Rect>, height: f32) -> bool {
    bounds.is_some_and(|b| point.y >= b.bottom() - height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testkit::TestHost;
    use proptest::prelude::*;

    fn held_hammer(pivot: Vec2) -> (Tool, TestHost) {
        let tuning = Tuning::default();
        let mut host = TestHost::new();
        let mut tool = Tool::new(ToolKind::Hammer, &tuning, pivot + Vec2::new(0.0, 120.0));
        tool.pivot = pivot;
        assert!(tool.try_grab(pivot, 1, &mut host));
        (tool, host)
    }

    #[test]
    fn test_new_tool_rests_free() {
        let tool = Tool::new(ToolKind::Shovel, &Tuning::default(), Vec2::new(100.0, 500.0));
        assert_eq!(tool.mode, ToolMode::Free);
        assert!(tool.is_free() && !tool.is_held());
        assert!((tool.head.pos.distance(tool.pivot) - tool.base_length()).abs() < 1e-3);
    }

    #[test]
    fn test_grab_locks_input_and_promotes_to_swing() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        assert_eq!(tool.mode, ToolMode::Held);
        assert!(host.locked);

        tool.step(&mut host, 1.0 / 60.0);
        assert_eq!(tool.mode, ToolMode::TetheredSwing);
    }

    #[test]
    fn test_grab_requires_hit() {
        let tuning = Tuning::default();
        let mut host = TestHost::new();
        let mut tool = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(100.0, 500.0));
        assert!(!tool.try_grab(Vec2::new(600.0, 100.0), 1, &mut host));
        assert_eq!(tool.mode, ToolMode::Free);
    }

    #[test]
    fn test_other_tool_on_top_blocks_grab() {
        let tuning = Tuning::default();
        let mut host = TestHost::new();
        host.other_tool_at = Some(Vec2::new(100.0, 440.0));
        let mut tool = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(100.0, 500.0));
        assert!(!tool.try_grab(Vec2::new(100.0, 440.0), 1, &mut host));
        // Right on the head still works
        assert!(tool.try_grab(Vec2::new(100.0, 500.0), 1, &mut host));
    }

    #[test]
    fn test_heavy_head_lags_held_pivot() {
        let tuning = Tuning::default();
        let mut host = TestHost::new();
        let mut light = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(400.0, 300.0));
        light.tuning.head_mass = 1.0;
        let mut heavy = light.clone();
        heavy.tuning.head_mass = 4.0;
        for tool in [&mut light, &mut heavy] {
            assert!(tool.try_grab(Vec2::new(400.0, 300.0), 1, &mut host));
            // Yank the pivot far up; only the tether clamp should catch up fully
            tool.drag_to(Vec2::new(400.0, 100.0), 1);
            tool.step(&mut host, 1.0 / 60.0);
        }
        let light_gap = light.head.pos.distance(light.pivot);
        let heavy_gap = heavy.head.pos.distance(heavy.pivot);
        assert!(heavy_gap >= light_gap);
        assert!(heavy_gap <= heavy.max_length() + 1e-3);
    }

    #[test]
    fn test_drag_ignores_other_pointers() {
        let (mut tool, _host) = held_hammer(Vec2::new(400.0, 100.0));
        tool.drag_to(Vec2::new(10.0, 10.0), 2);
        assert_eq!(tool.pivot, Vec2::new(400.0, 100.0));
        tool.drag_to(Vec2::new(10.0, 10.0), 1);
        assert_eq!(tool.pivot, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_release_without_upgrade_drops() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        let outcome = tool.release(Vec2::new(400.0, 100.0), 1, &mut host);
        assert_eq!(outcome, ReleaseOutcome::Dropped);
        assert_eq!(tool.mode, ToolMode::Free);
        assert!(!host.locked);
    }

    #[test]
    fn test_release_over_stow_puts_away() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        host.zones.stow = Some(Rect::new(350.0, 50.0, 100.0, 100.0));
        let outcome = tool.release(Vec2::new(400.0, 100.0), 1, &mut host);
        assert_eq!(outcome, ReleaseOutcome::Stowed);
        assert!(host.events.contains(&ForgeEvent::PutAway { tool: ToolKind::Hammer }));
    }

    #[test]
    fn test_spin_throw_orbits_flying_pivot() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        host.inputs.spin_throw_level = 2;
        tool.set_head_velocity(Vec2::new(300.0, -200.0));

        let outcome = tool.release(Vec2::new(400.0, 100.0), 1, &mut host);
        assert_eq!(outcome, ReleaseOutcome::Thrown);
        assert_eq!(tool.mode, ToolMode::SpinningThrow);
        let expected = tool.spin.base_spin + tool.spin.spin_per_level;
        assert!((tool.angular_velocity - expected).abs() < 1e-4);
        let radius = tool.orbit_radius;
        assert!(radius < tool.base_length());

        for _ in 0..10 {
            tool.step(&mut host, 1.0 / 60.0);
            assert_eq!(tool.mode, ToolMode::SpinningThrow);
            assert!((tool.head.pos.distance(tool.pivot) - radius).abs() < 1e-2);
        }
    }

    #[test]
    fn test_spin_direction_follows_horizontal_velocity() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        host.inputs.spin_throw_level = 1;
        tool.set_head_velocity(Vec2::new(-50.0, 0.0));
        tool.release(Vec2::new(400.0, 100.0), 1, &mut host);
        assert!((tool.angular_velocity + tool.spin.base_spin).abs() < 1e-4);
    }

    #[test]
    fn test_power_swing_spin_is_inherited() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        host.inputs.spin_throw_level = 1;
        tool.swing_spin = 25.0;
        tool.release(Vec2::new(400.0, 100.0), 1, &mut host);
        assert_eq!(tool.angular_velocity, 25.0);
    }

    #[test]
    fn test_spin_decays_into_free_flight_without_snap() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        host.inputs.spin_throw_level = 1;
        tool.release(Vec2::new(400.0, 100.0), 1, &mut host);
        tool.angular_velocity = tool.spin.end_threshold + 0.01;
        let orientation_before = tool.orientation();

        tool.spin.spin_friction = 0.9;
        tool.step(&mut host, 1.0 / 60.0);
        assert_eq!(tool.mode, ToolMode::Free);
        // Shaft keeps pointing the same way across the regime change
        let drift = normalize_angle(tool.orientation() - orientation_before).abs();
        assert!(drift < 0.2, "drift {drift}");
    }

    #[test]
    fn test_fast_spin_refuses_grab_except_bottom_zone() {
        let tuning = Tuning::default();
        let mut host = TestHost::new();
        let mut tool = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(400.0, 300.0));
        tool.angular_velocity = 30.0;
        assert!(!tool.try_grab(Vec2::new(400.0, 300.0), 1, &mut host));
        assert_eq!(tool.mode, ToolMode::Free);

        let mut low = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(400.0, 750.0));
        low.angular_velocity = 30.0;
        assert!(low.try_grab(Vec2::new(400.0, 750.0), 1, &mut host));
    }

    #[test]
    fn test_dropped_tool_settles_on_floor() {
        let tuning = Tuning::default();
        let mut host = TestHost::new();
        host.zones.anvil = None;
        let mut tool = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(200.0, 200.0));
        tool.head.vel = Vec2::new(120.0, 0.0);
        for _ in 0..600 {
            tool.step(&mut host, 1.0 / 60.0);
        }
        let floor = host.zones.bounds.unwrap().bottom() - tool.tuning.head_radius;
        assert!((tool.head.pos.y - floor).abs() < 1e-3);
        assert_eq!(tool.head.vel.y, 0.0);
        assert!(tool.head.vel.x.abs() < 1.0);
    }

    #[test]
    fn test_head_over_lit_hearth_banks_heat() {
        let tuning = Tuning::default();
        let mut host = TestHost::new();
        host.hearth.feed(10);
        host.inputs.max_heat_level = 2;
        let mut tool = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(60.0, 782.0));
        for _ in 0..160 {
            tool.step(&mut host, 0.02);
        }
        assert_eq!(tool.heat.level, 2);
        assert!(
            host.events
                .iter()
                .any(|e| matches!(e, ForgeEvent::HeatLevelUp { level: 2, .. }))
        );
    }

    #[test]
    fn test_collide_bounds_loses_energy() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut pos = Vec2::new(50.0, 99.0);
        let mut vel = Vec2::new(10.0, 500.0);
        let response = WallResponse {
            restitution: 0.5,
            tangential_damping: 0.5,
            stop_threshold: 1.0,
        };
        let impact = collide_bounds(&mut pos, &mut vel, bounds, 5.0, response);
        assert_eq!(impact, 500.0);
        assert_eq!(pos.y, 95.0);
        assert_eq!(vel.y, -250.0);
        assert_eq!(vel.x, 5.0);
    }

    #[test]
    fn test_rebound_lock_lets_the_head_fly_free_of_the_pivot() {
        let (mut swinging, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        swinging.head.pos = Vec2::new(420.0, 200.0);
        swinging.set_head_velocity(Vec2::new(40.0, -300.0));
        swinging.mode = ToolMode::TetheredSwing;
        let mut rebounding = swinging.clone();
        rebounding.mode = ToolMode::Held;
        rebounding.rebound_lock = 0.08;

        for _ in 0..3 {
            swinging.step(&mut host, 1.0 / 60.0);
            rebounding.step(&mut host, 1.0 / 60.0);
        }
        assert_eq!(rebounding.mode, ToolMode::Held);
        assert!(rebounding.rebound_lock > 0.0);
        assert!(swinging.head.pos.distance(rebounding.head.pos) > 1.0);
        assert!(rebounding.head.pos.distance(rebounding.pivot) <= rebounding.max_length() + 1e-3);
    }

    #[test]
    fn test_cooldowns_count_down_by_dt() {
        let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
        tool.strike_cooldown = 0.05;
        tool.rebound_lock = 0.03;
        tool.regrab_cooldown = 0.1;
        tool.step(&mut host, 0.02);
        assert!((tool.strike_cooldown - 0.03).abs() < 1e-6);
        assert!((tool.rebound_lock - 0.01).abs() < 1e-6);
        assert!((tool.regrab_cooldown - 0.08).abs() < 1e-6);
        tool.step(&mut host, 0.02);
        assert_eq!(tool.rebound_lock, 0.0);
    }

    proptest! {
        #[test]
        fn prop_tether_never_exceeds_max_length(
            moves in prop::collection::vec((0.0f32..800.0, 0.0f32..400.0, 0.001f32..0.2), 1..60)
        ) {
            let (mut tool, mut host) = held_hammer(Vec2::new(400.0, 100.0));
            for (x, y, dt) in moves {
                tool.drag_to(Vec2::new(x, y), 1);
                tool.step(&mut host, dt);
                if tool.is_held() {
                    let dist = tool.head.pos.distance(tool.pivot);
                    prop_assert!(dist <= tool.max_length() + 1e-2, "dist {}", dist);
                }
                prop_assert!(tool.length >= 0.0 && tool.length <= tool.max_length());
            }
        }

        #[test]
        fn prop_exactly_one_mode_and_cooldowns_non_negative(
            actions in prop::collection::vec((0u8..4, 0.0f32..800.0, 0.0f32..800.0, 0.0f32..0.1), 1..80)
        ) {
            let tuning = Tuning::default();
            let mut host = TestHost::new();
            host.inputs.spin_throw_level = 1;
            let mut tool = Tool::new(ToolKind::Hammer, &tuning, Vec2::new(400.0, 400.0));
            for (action, x, y, dt) in actions {
                let p = Vec2::new(x, y);
                match action {
                    0 => { tool.try_grab(p, 1, &mut host); }
                    1 => tool.drag_to(p, 1),
                    2 => { tool.release(p, 1, &mut host); }
                    _ => {}
                }
                let before = (tool.strike_cooldown, tool.rebound_lock, tool.regrab_cooldown);
                tool.step(&mut host, dt);
                let step = crate::clamp_dt(dt);
                prop_assert!(tool.is_held() != tool.is_free());
                for (b, a) in [before.0, before.1, before.2]
                    .into_iter()
                    .zip([tool.strike_cooldown, tool.rebound_lock, tool.regrab_cooldown])
                {
                    prop_assert!(a >= 0.0);
                    // Either counted down by dt or re-armed by an impact this tick
                    prop_assert!((a - (b - step).max(0.0)).abs() < 1e-5 || a > (b - step).max(0.0));
                }
            }
        }
    }
}
