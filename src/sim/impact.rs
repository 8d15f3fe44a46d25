//! Impact detection and production
//!
//! A strike counts when the head drops through a thin band on top of the
//! tool's strike zone fast enough, after having left the band since the last
//! strike. The response depends on the regime: a held tool bounces (or tears
//! free above the rip speed), a spinning throw passes over and keeps spinning,
//! and a plain free-flying tool bounces with restitution.

use glam::Vec2;

use super::events::{ForgeEvent, SoundCue, clank_word};
use super::geom::Rect;
use super::tool::{Tool, ToolHost, ToolKind, ToolMode};
use crate::consts::{MAX_STRIKE_POWER, POWER_SPEED_SCALE};
use crate::safe_direction;

/// How a counted impact was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// Held tool bounced off; production fired
    Bounce,
    /// Held tool tore free; no production
    Rip,
    /// Spinning throw passed over the zone and kept spinning
    SpinPass,
    /// Free-flying tool bounced off the zone
    FreeBounce,
}

/// A qualifying impact
#[derive(Debug, Clone, Copy)]
pub struct Strike {
    /// Contact point on the zone surface
    pub point: Vec2,
    /// Downward speed at contact (px/s)
    pub speed: f32,
    pub velocity: Vec2,
}

/// Power scalar for a strike of downward `speed`
#[inline]
pub fn strike_power(speed: f32, impact_threshold: f32) -> f32 {
    (speed / (impact_threshold * POWER_SPEED_SCALE).max(f32::EPSILON)).min(MAX_STRIKE_POWER)
}

/// Test the head against a strike zone
pub fn detect_strike(tool: &Tool, zone: Rect) -> Option<Strike> {
    let t = &tool.tuning;
    if tool.strike_cooldown > 0.0 || tool.rebound_lock > 0.0 {
        return None;
    }
    // Orbiting heads are gated by the pass cooldown alone
    if !tool.exit_armed && tool.mode != ToolMode::SpinningThrow {
        return None;
    }
    let head = &tool.head;
    if !zone.spans_x(head.pos.x, t.head_radius * 0.5) {
        return None;
    }

    let line = zone.top() - t.head_radius;
    let in_band = (head.pos.y - line).abs() <= t.strike_band;
    let tunneled = head.prev.y < line - t.strike_band && head.pos.y > line + t.strike_band;
    if !in_band && !tunneled {
        return None;
    }
    if head.vel.y <= t.impact_threshold {
        return None;
    }

    Some(Strike {
        point: Vec2::new(head.pos.x, zone.top()),
        speed: head.vel.y,
        velocity: head.vel,
    })
}

/// Apply the response for a detected strike and fire production
pub fn resolve_strike(tool: &mut Tool, zone: Rect, strike: Strike, host: &mut dyn ToolHost) -> StrikeOutcome {
    let power = strike_power(strike.speed, tool.tuning.impact_threshold);
    let line = zone.top() - tool.tuning.head_radius;

    let outcome = match tool.mode {
        ToolMode::Held | ToolMode::TetheredSwing => {
            if strike.speed > tool.rip_threshold(host.inputs()) {
                rip(tool, line, strike, host);
                return StrikeOutcome::Rip;
            }
            bounce_held(tool, line, strike);
            StrikeOutcome::Bounce
        }
        ToolMode::SpinningThrow if tool.angular_velocity.abs() >= tool.spin.retention_threshold => {
            spin_pass(tool, zone);
            StrikeOutcome::SpinPass
        }
        ToolMode::SpinningThrow => {
            tool.end_spin();
            bounce_free(tool, line, strike);
            StrikeOutcome::FreeBounce
        }
        ToolMode::Free => {
            bounce_free(tool, line, strike);
            StrikeOutcome::FreeBounce
        }
    };

    tool.strike_cooldown = if outcome == StrikeOutcome::SpinPass {
        tool.spin.pass_cooldown
    } else {
        tool.tuning.strike_cooldown
    };
    tool.exit_armed = false;
    let multiplier = tool.heat.consume();

    log::debug!(
        "{} strike at ({:.0}, {:.0}) speed {:.0} power {:.2} x{} ({:?})",
        tool.kind.as_str(),
        strike.point.x,
        strike.point.y,
        strike.speed,
        power,
        multiplier,
        outcome
    );

    host.emit(production_event(
        tool.kind,
        strike.point,
        power,
        strike.velocity.x,
        multiplier,
        tool.tuning.yield_per_strike,
    ));
    host.emit(ForgeEvent::Sparks {
        x: strike.point.x,
        y: strike.point.y,
        count: 4 + (power * 8.0) as u32 + 2 * multiplier.saturating_sub(1).min(10),
    });
    host.emit(ForgeEvent::Clank {
        x: strike.point.x,
        y: strike.point.y,
        word: clank_word(power),
    });
    host.emit(ForgeEvent::Sound(tool.kind.strike_sound()));
    outcome
}

/// The event a counted strike produces for each tool
pub fn production_event(
    kind: ToolKind,
    point: Vec2,
    power: f32,
    head_vx: f32,
    multiplier: u32,
    yield_per_strike: f32,
) -> ForgeEvent {
    let amount = ((yield_per_strike * power).ceil().max(1.0) as u32) * multiplier;
    match kind {
        ToolKind::Hammer => ForgeEvent::LetterForged {
            x: point.x,
            y: point.y,
            power,
            head_vx,
            multiplier,
        },
        ToolKind::Pestle => ForgeEvent::InkGround {
            x: point.x,
            y: point.y,
            amount,
        },
        ToolKind::Shovel => ForgeEvent::FuelScooped {
            x: point.x,
            y: point.y,
            amount,
        },
    }
}

fn bounce_held(tool: &mut Tool, line: f32, strike: Strike) {
    let t = &tool.tuning;
    let out = Vec2::new(
        strike.velocity.x * t.tangential_damping,
        -strike.speed * t.bounce_factor / t.head_mass,
    );
    tool.rebound_lock = t.rebound_lock;
    tool.head.pos.y = line - 1.0;
    tool.set_head_velocity(out);
    tool.mode = ToolMode::Held;
}

fn rip(tool: &mut Tool, line: f32, strike: Strike, host: &mut dyn ToolHost) {
    let t = &tool.tuning;
    let (away, _) = safe_direction(-strike.velocity);
    let out = away * (strike.speed * t.rip_boost / t.head_mass.sqrt()) + Vec2::new(0.0, -t.rip_upward_bias);
    let tumble = out.x / t.base_length;
    tool.regrab_cooldown = t.regrab_cooldown;
    tool.exit_armed = false;
    tool.head.pos.y = line - 1.0;
    tool.set_head_velocity(out);
    tool.enter_free(tumble);

    host.lock_input(false);
    host.emit(ForgeEvent::Ripped {
        tool: tool.kind,
        speed: strike.speed,
    });
    host.emit(ForgeEvent::Sound(SoundCue::Rip));
    log::info!(
        "{} ripped free at {:.0} px/s (threshold {:.0})",
        tool.kind.as_str(),
        strike.speed,
        tool.rip_threshold(host.inputs())
    );
}

fn spin_pass(tool: &mut Tool, zone: Rect) {
    lift_orbit(tool, zone);
    let t = &tool.tuning;
    let pop = tool.pivot_vel.y.abs() * t.restitution / t.head_mass;
    tool.pivot_vel.y = -pop.max(t.impact_threshold * 0.25);
    tool.angular_velocity *= tool.spin.pass_spin_loss;
}

fn bounce_free(tool: &mut Tool, line: f32, strike: Strike) {
    let t = &tool.tuning;
    let out = Vec2::new(
        strike.velocity.x * t.tangential_damping,
        -strike.speed * t.restitution / t.head_mass,
    );
    tool.head.pos.y = line;
    tool.set_head_velocity(out);
}

/// Push a spinning throw up so the orbiting head rests on the zone top.
/// Returns false when the head is clear of the zone or the pivot is below it.
fn lift_orbit(tool: &mut Tool, zone: Rect) -> bool {
    if !zone.spans_x(tool.head.pos.x, 0.0) || tool.pivot.y > zone.bottom() {
        return false;
    }
    let depth = tool.head.pos.y - (zone.top() - tool.tuning.head_radius);
    if depth <= 0.0 {
        return false;
    }
    tool.pivot.y -= depth;
    tool.head.pos.y -= depth;
    true
}

/// Non-counting contact of a spinning throw: the zone is solid, the pivot rebounds
fn settle_orbit(tool: &mut Tool, zone: Rect) {
    if !lift_orbit(tool, zone) || tool.pivot_vel.y <= 0.0 {
        return;
    }
    let t = &tool.tuning;
    tool.pivot_vel.y = -tool.pivot_vel.y * t.restitution / t.head_mass;
    tool.pivot_vel.x *= t.tangential_damping;
    tool.angular_velocity *= tool.spin.pass_spin_loss;
}

/// Non-counting contact: the zone top is solid when approached from above
fn settle_on_surface(tool: &mut Tool, zone: Rect) {
    if tool.mode == ToolMode::SpinningThrow {
        settle_orbit(tool, zone);
        return;
    }
    if !zone.spans_x(tool.head.pos.x, 0.0) {
        return;
    }
    let line = zone.top() - tool.tuning.head_radius;
    let head = tool.head;
    if head.pos.y <= line || head.pos.y > zone.bottom() || head.prev.y > line + tool.tuning.strike_band {
        return;
    }
    let response = tool.wall_response();
    let mut vel = head.vel;
    if vel.y > 0.0 {
        vel.y = -vel.y * response.restitution;
        if vel.y.abs() < response.stop_threshold {
            vel.y = 0.0;
        }
        vel.x *= response.tangential_damping;
    }
    tool.head.pos.y = line;
    tool.set_head_velocity(vel);
}

/// Strike-zone pass for one tick: count, or rest on the surface, then re-arm
pub(crate) fn resolve_strike_zone(tool: &mut Tool, host: &mut dyn ToolHost) {
    let Some(zone) = host.zones().get(tool.kind.strike_zone()) else {
        return;
    };
    match detect_strike(tool, zone) {
        Some(strike) => {
            resolve_strike(tool, zone, strike, host);
        }
        None => settle_on_surface(tool, zone),
    }

    let line = zone.top() - tool.tuning.head_radius;
    let clear_above = tool.head.pos.y < line - tool.tuning.strike_band;
    if clear_above || !zone.spans_x(tool.head.pos.x, tool.tuning.head_radius * 0.5) {
        tool.exit_armed = true;
    }
}

/// A heated head touching the mold presses a word
pub(crate) fn resolve_mold(tool: &mut Tool, host: &mut dyn ToolHost) {
    if !tool.heat.is_heated() || tool.strike_cooldown > 0.0 {
        return;
    }
    let Some(mold) = host.zones().mold else {
        return;
    };
    if !mold.overlaps_circle(tool.head.pos, tool.tuning.head_radius) {
        return;
    }

    let multiplier = tool.heat.consume();
    tool.strike_cooldown = tool.tuning.strike_cooldown;
    log::debug!("{} pressed the mold x{}", tool.kind.as_str(), multiplier);

    host.emit(ForgeEvent::ForgeTriggered { multiplier });
    host.emit(ForgeEvent::Sparks {
        x: tool.head.pos.x,
        y: tool.head.pos.y,
        count: 6 + 2 * multiplier.min(10),
    });
    host.emit(ForgeEvent::Sound(SoundCue::MoldPress));
}
