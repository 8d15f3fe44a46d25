//! Data-driven game balance
//!
//! Every threshold the tool engine reads lives here so it can be rebalanced
//! from JSON without touching the simulation. Missing fields fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};

use crate::sim::ToolKind;

/// Per-tool physics and impact constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolTuning {
    /// Rest tether distance between pivot and head (px)
    pub base_length: f32,
    /// Hard ceiling for the tether distance (px)
    pub max_length: f32,
    /// Extra tether length per px/s of head speed while swinging
    pub stretch_per_speed: f32,
    /// Head collision radius (px)
    pub head_radius: f32,
    /// Grab distance from the handle segment (px)
    pub grab_radius: f32,
    /// Mass of the head, >= 1
    pub head_mass: f32,
    /// Gravity (px/s², positive is down)
    pub gravity: f32,
    /// Per-60Hz-frame velocity retention while tethered
    pub air_friction: f32,
    /// Per-60Hz-frame velocity retention in free flight
    pub free_drag: f32,
    /// Downward speed a strike must exceed to count (px/s)
    pub impact_threshold: f32,
    /// Height of the strike band above and below the zone top (px)
    pub strike_band: f32,
    /// Bounce factor for a normal held strike
    pub bounce_factor: f32,
    /// Horizontal velocity retention on bounce
    pub tangential_damping: f32,
    /// Wall/floor restitution in free flight, before mass
    pub restitution: f32,
    /// Free-flight speeds below this are zeroed on contact (px/s)
    pub stop_threshold: f32,
    /// Base speed a strike must exceed to tear the tool free (px/s)
    pub rip_speed: f32,
    /// Outgoing speed factor when ripping
    pub rip_boost: f32,
    /// Upward kick added when ripping (px/s)
    pub rip_upward_bias: f32,
    /// Seconds between counted strikes
    pub strike_cooldown: f32,
    /// Seconds the head is pinned after a bounce
    pub rebound_lock: f32,
    /// Seconds before a ripped tool may be grabbed again
    pub regrab_cooldown: f32,
    /// Maximum head speed (px/s)
    pub max_speed: f32,
    /// Seconds of hearth proximity per heat level
    pub heating_required: f32,
    /// Base amount produced per strike for tools that yield a quantity
    pub yield_per_strike: f32,
}

impl Default for ToolTuning {
    fn default() -> Self {
        Self::for_kind(ToolKind::Hammer)
    }
}

impl ToolTuning {
    /// Shipped balance for each tool
    pub fn for_kind(kind: ToolKind) -> Self {
        let hammer = Self {
            base_length: 120.0,
            max_length: 150.0,
            stretch_per_speed: 0.004,
            head_radius: 18.0,
            grab_radius: 36.0,
            head_mass: 1.6,
            gravity: 2200.0,
            air_friction: 0.985,
            free_drag: 0.995,
            impact_threshold: 900.0,
            strike_band: 14.0,
            bounce_factor: 0.45,
            tangential_damping: 0.6,
            restitution: 0.55,
            stop_threshold: 40.0,
            rip_speed: 3400.0,
            rip_boost: 0.7,
            rip_upward_bias: 600.0,
            strike_cooldown: 0.12,
            rebound_lock: 0.08,
            regrab_cooldown: 0.25,
            max_speed: 6000.0,
            heating_required: 1.5,
            yield_per_strike: 1.0,
        };
        match kind {
            ToolKind::Hammer => hammer,
            ToolKind::Pestle => Self {
                base_length: 90.0,
                max_length: 110.0,
                head_radius: 14.0,
                head_mass: 1.2,
                impact_threshold: 700.0,
                bounce_factor: 0.3,
                rip_speed: 4200.0,
                heating_required: 2.0,
                yield_per_strike: 2.0,
                ..hammer
            },
            ToolKind::Shovel => Self {
                base_length: 140.0,
                max_length: 170.0,
                head_radius: 22.0,
                head_mass: 2.0,
                impact_threshold: 600.0,
                bounce_factor: 0.25,
                rip_speed: 3800.0,
                heating_required: 2.5,
                yield_per_strike: 5.0,
                ..hammer
            },
        }
    }

    /// Clamp values that would destabilize the integrators
    pub fn sanitize(&mut self) {
        self.head_mass = self.head_mass.max(1.0);
        self.base_length = self.base_length.max(1.0);
        self.max_length = self.max_length.max(self.base_length);
        self.head_radius = self.head_radius.max(1.0);
        self.air_friction = self.air_friction.clamp(0.0, 1.0);
        self.free_drag = self.free_drag.clamp(0.0, 1.0);
        self.restitution = self.restitution.clamp(0.0, 0.99);
        self.tangential_damping = self.tangential_damping.clamp(0.0, 1.0);
        self.impact_threshold = self.impact_threshold.max(1.0);
        self.heating_required = self.heating_required.max(0.01);
        self.max_speed = self.max_speed.max(self.impact_threshold);
        self.strike_cooldown = self.strike_cooldown.max(0.0);
        self.rebound_lock = self.rebound_lock.max(0.0);
        self.regrab_cooldown = self.regrab_cooldown.max(0.0);
    }
}

/// Spinning throw and power swing constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTuning {
    /// Fraction of the shaft, measured from the head, where the flying pivot sits
    pub rebase_fraction: f32,
    /// Spin at throw level 1 (rad/s)
    pub base_spin: f32,
    /// Extra spin per throw level above 1 (rad/s)
    pub spin_per_level: f32,
    /// Linear velocity kept by the flying pivot on release
    pub throw_velocity_scale: f32,
    /// Per-60Hz-frame spin retention while throwing
    pub spin_friction: f32,
    /// Spin retention in plain free flight
    pub free_spin_friction: f32,
    /// Below this the throw ends and the tool tumbles in plain free flight (rad/s)
    pub end_threshold: f32,
    /// Above this anvil passes keep the tool spinning (rad/s)
    pub retention_threshold: f32,
    /// Spin kept after each anvil pass
    pub pass_spin_loss: f32,
    /// Cooldown between spinning anvil passes (s)
    pub pass_cooldown: f32,
    /// Grabs are refused above this spin outside the bottom zone (rad/s)
    pub max_grab_spin: f32,
    /// Below this, free-flight tumbling eases upright (rad/s)
    pub settle_threshold: f32,
    /// Ease-out rate of the upright settle (1/s)
    pub settle_rate: f32,
    /// Swing spin must exceed this to be inherited on throw (rad/s)
    pub inherit_threshold: f32,
    /// Swing spin gained per power swing level, as a fraction of orientation rate
    pub power_swing_gain: f32,
    /// Absolute spin ceiling (rad/s)
    pub max_spin: f32,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            rebase_fraction: 0.35,
            base_spin: 14.0,
            spin_per_level: 3.0,
            throw_velocity_scale: 0.9,
            spin_friction: 0.998,
            free_spin_friction: 0.96,
            end_threshold: 2.5,
            retention_threshold: 6.0,
            pass_spin_loss: 0.85,
            pass_cooldown: 0.06,
            max_grab_spin: 9.0,
            settle_threshold: 1.5,
            settle_rate: 8.0,
            inherit_threshold: 10.0,
            power_swing_gain: 0.25,
            max_spin: 40.0,
        }
    }
}

/// Hearth and heat-charge constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatTuning {
    /// Seconds a freshly fed hearth stays lit
    pub max_heat_time: f32,
    /// Cumulative fuel needed for each hearth level (level = count reached)
    pub fuel_thresholds: Vec<u32>,
    /// Hearth level ceiling before any upgrade
    pub base_hearth_max: u32,
}

impl Default for HeatTuning {
    fn default() -> Self {
        Self {
            max_heat_time: 30.0,
            fuel_thresholds: vec![0, 10, 40, 120, 300, 800],
            base_hearth_max: 3,
        }
    }
}

/// Ballistic letter/chip constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    /// Upward launch speed at zero power (px/s)
    pub launch_base: f32,
    /// Extra launch speed per unit power (px/s)
    pub launch_scale: f32,
    /// Share of the tool's horizontal velocity the letter inherits
    pub inherit_vx: f32,
    /// Horizontal speed per px of distance to the target (1/s)
    pub target_pull: f32,
    /// Random horizontal spread (px/s)
    pub spread: f32,
    /// Gravity for flying entities (px/s²)
    pub gravity: f32,
    /// Per-60Hz-frame horizontal velocity retention
    pub drag: f32,
    /// Random spin range (rad/s)
    pub max_angular_vel: f32,
    /// Seconds between staggered letter spawns
    pub stagger: f32,
    /// Concurrent flying letters
    pub max_letters: usize,
    /// Concurrent flying word chips
    pub max_chips: usize,
    /// Entities older than this land where they are (s)
    pub max_lifetime: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            launch_base: 420.0,
            launch_scale: 380.0,
            inherit_vx: 0.15,
            target_pull: 1.1,
            spread: 60.0,
            gravity: 1400.0,
            drag: 0.99,
            max_angular_vel: 9.0,
            stagger: 0.05,
            max_letters: 120,
            max_chips: 24,
            max_lifetime: 6.0,
        }
    }
}

/// Layout query constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTuning {
    /// Seconds a layout snapshot stays valid
    pub cache_ttl: f32,
    /// Height of the catch-assist strip at the bottom of the bounds (px)
    pub bottom_zone: f32,
}

impl Default for ZoneTuning {
    fn default() -> Self {
        Self {
            cache_ttl: 0.15,
            bottom_zone: 90.0,
        }
    }
}

/// All balance tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub hammer: ToolTuning,
    pub pestle: ToolTuning,
    pub shovel: ToolTuning,
    pub spin: SpinTuning,
    pub heat: HeatTuning,
    pub flight: FlightTuning,
    pub zones: ZoneTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            hammer: ToolTuning::for_kind(ToolKind::Hammer),
            pestle: ToolTuning::for_kind(ToolKind::Pestle),
            shovel: ToolTuning::for_kind(ToolKind::Shovel),
            spin: SpinTuning::default(),
            heat: HeatTuning::default(),
            flight: FlightTuning::default(),
            zones: ZoneTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a balance file; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Constants for one tool
    pub fn tool(&self, kind: ToolKind) -> &ToolTuning {
        match kind {
            ToolKind::Hammer => &self.hammer,
            ToolKind::Pestle => &self.pestle,
            ToolKind::Shovel => &self.shovel,
        }
    }

    pub fn sanitize(&mut self) {
        self.hammer.sanitize();
        self.pestle.sanitize();
        self.shovel.sanitize();
        self.spin.rebase_fraction = self.spin.rebase_fraction.clamp(0.05, 1.0);
        self.spin.spin_friction = self.spin.spin_friction.clamp(0.0, 1.0);
        self.spin.free_spin_friction = self.spin.free_spin_friction.clamp(0.0, 1.0);
        self.spin.max_spin = self.spin.max_spin.max(self.spin.base_spin);
        self.heat.max_heat_time = self.heat.max_heat_time.max(0.0);
        self.heat.fuel_thresholds.sort_unstable();
        self.flight.drag = self.flight.drag.clamp(0.0, 1.0);
        self.flight.gravity = self.flight.gravity.max(1.0);
        self.zones.cache_ttl = self.zones.cache_ttl.max(0.0);
    }
}
