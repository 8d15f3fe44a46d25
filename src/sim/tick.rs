//! Per-frame forge tick
//!
//! Owns every piece of simulation state and advances it in a fixed order:
//! pointer input, active tool, production, deferred spawns, flying entities,
//! hearth.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::economy::{Economy, EconomyInputs, UpgradeKind};
use super::events::{EventQueue, ForgeEvent, LetterTile, SoundCue, WordChip};
use super::flight::{FlightPool, launch};
use super::geom::{LayoutSource, Rect, ZoneCache, Zones};
use super::heat::{HeatSource, Hearth};
use super::schedule::Scheduler;
use super::tool::{Tool, ToolHost, ToolKind};
use crate::clamp_dt;
use crate::consts::HEBREW_LETTERS;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Cosmetic events allowed per tick before a settings override
const DEFAULT_COSMETIC_BUDGET: usize = 24;

/// Pointer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// One pointer event in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    pub pointer_id: i32,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32, pointer_id: i32) -> Self {
        Self { kind, x, y, pointer_id }
    }

    fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events since the last tick, oldest first
    pub pointer: Vec<PointerEvent>,
    /// Layout changed (window resize); re-measure zones now
    pub resized: bool,
}

/// A tool and whether it is put away
#[derive(Debug, Clone)]
pub struct ToolSlot {
    pub tool: Tool,
    pub stowed: bool,
}

/// Deferred entity spawn
#[derive(Debug, Clone)]
enum Spawn {
    Letter {
        origin: Vec2,
        power: f32,
        head_vx: f32,
        tile: LetterTile,
    },
    Chip {
        origin: Vec2,
        chip: WordChip,
    },
}

/// Complete forge state
pub struct Forge {
    pub tuning: Tuning,
    /// One slot per [`ToolKind`], in `ToolKind::ALL` order
    pub tools: Vec<ToolSlot>,
    pub active: Option<ToolKind>,
    pub hearth: Hearth,
    pub economy: Economy,
    pub letters: FlightPool<LetterTile>,
    pub chips: FlightPool<WordChip>,
    /// Simulation clock (s)
    pub time: f64,
    spawns: Scheduler<Spawn>,
    zone_cache: ZoneCache,
    layout: Box<dyn LayoutSource>,
    events: EventQueue,
    rng: Pcg32,
    input_locked: bool,
}

impl Forge {
    /// A forge with the hammer active and all tools resting on the floor
    pub fn new(mut tuning: Tuning, layout: Box<dyn LayoutSource>, seed: u64) -> Self {
        tuning.sanitize();
        let mut zone_cache = ZoneCache::new(tuning.zones.cache_ttl);
        let zones = zone_cache.get(0.0, layout.as_ref()).clone();
        let tools = ToolKind::ALL
            .iter()
            .map(|&kind| ToolSlot {
                tool: Tool::new(kind, &tuning, rest_position(&zones, &tuning, kind)),
                stowed: false,
            })
            .collect();

        Self {
            tools,
            active: Some(ToolKind::Hammer),
            hearth: Hearth::new(&tuning.heat),
            economy: Economy::default(),
            letters: FlightPool::new(tuning.flight.max_letters),
            chips: FlightPool::new(tuning.flight.max_chips),
            time: 0.0,
            spawns: Scheduler::new(),
            zone_cache,
            layout,
            events: EventQueue::new(DEFAULT_COSMETIC_BUDGET),
            rng: Pcg32::seed_from_u64(seed),
            input_locked: false,
            tuning,
        }
    }

    /// Apply quality caps
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.events.set_cosmetic_budget(settings.cosmetic_budget());
        self.letters
            .set_capacity(self.tuning.flight.max_letters.min(settings.max_flying_letters()));
    }

    pub fn tool(&self, kind: ToolKind) -> &Tool {
        &self.tools[slot_index(kind)].tool
    }

    pub fn tool_mut(&mut self, kind: ToolKind) -> &mut Tool {
        &mut self.tools[slot_index(kind)].tool
    }

    pub fn is_stowed(&self, kind: ToolKind) -> bool {
        self.tools[slot_index(kind)].stowed
    }

    /// Current zone snapshot (may be up to the cache TTL old)
    pub fn zones(&self) -> &Zones {
        self.zone_cache.snapshot()
    }

    /// Letters and chips waiting for their staggered launch
    pub fn queued_spawns(&self) -> usize {
        self.spawns.len()
    }

    /// Take everything emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<ForgeEvent> {
        self.events.drain()
    }

    /// Make `kind` the active tool, taking it out of storage if needed
    pub fn select_tool(&mut self, kind: ToolKind) {
        if self.active == Some(kind) && !self.is_stowed(kind) {
            return;
        }
        if let Some(prev) = self.active {
            let prev_tool = self.tool_mut(prev);
            if prev_tool.is_held() {
                prev_tool.enter_free(0.0);
                self.set_input_lock(false);
            }
        }

        let idx = slot_index(kind);
        if self.tools[idx].stowed {
            let rest = rest_position(self.zone_cache.snapshot(), &self.tuning, kind);
            self.tools[idx] = ToolSlot {
                tool: Tool::new(kind, &self.tuning, rest),
                stowed: false,
            };
        }
        self.active = Some(kind);
        self.events.push(ForgeEvent::ToolSwitched { tool: kind });
        log::info!("Switched to {}", kind.as_str());
    }

    /// Shovel letters from the economy into the hearth by hand
    pub fn feed_hearth(&mut self, letters: u64) -> u64 {
        let taken = self.economy.take_letters(letters);
        self.feed_taken(taken);
        taken
    }

    /// Spend ink on an upgrade
    pub fn buy(&mut self, kind: UpgradeKind) -> bool {
        let bought = self.economy.buy(kind);
        if bought && kind == UpgradeKind::HeatCap {
            self.hearth
                .set_max_level(self.tuning.heat.base_hearth_max + self.economy.upgrades.heat_cap_level);
        }
        bought
    }

    fn feed_taken(&mut self, taken: u64) {
        if taken == 0 {
            return;
        }
        let amount = u32::try_from(taken).unwrap_or(u32::MAX);
        let level = self.hearth.feed(amount);
        self.events.push(ForgeEvent::HearthFed { amount, level });
    }

    fn set_input_lock(&mut self, locked: bool) {
        if self.input_locked != locked {
            self.input_locked = locked;
            self.events.push(ForgeEvent::InputLock(locked));
        }
    }
}

#[inline]
fn slot_index(kind: ToolKind) -> usize {
    kind as usize
}

/// Where a tool lies when first placed: on the floor, spread left to right
fn rest_position(zones: &Zones, tuning: &Tuning, kind: ToolKind) -> Vec2 {
    let Some(bounds) = zones.bounds else {
        return Vec2::ZERO;
    };
    let share = match kind {
        ToolKind::Hammer => 0.5,
        ToolKind::Pestle => 0.3,
        ToolKind::Shovel => 0.7,
    };
    Vec2::new(
        bounds.left() + bounds.w * share,
        bounds.bottom() - tuning.tool(kind).head_radius,
    )
}

/// Landing point inside `zone`, or straight below `origin` when the zone is missing
fn landing_target(zone: Option<Rect>, bounds: Option<Rect>, origin: Vec2, rng: &mut Pcg32) -> Vec2 {
    match zone {
        Some(r) => {
            let half = r.w * 0.4;
            let dx = if half > 0.0 { rng.random_range(-half..half) } else { 0.0 };
            Vec2::new(r.center().x + dx, r.center().y)
        }
        None => {
            let floor = bounds.map_or(origin.y + 200.0, |b| b.bottom());
            Vec2::new(origin.x, floor)
        }
    }
}

/// The active tool's view of the forge for one call
struct ForgeHost<'a> {
    zones: &'a Zones,
    hearth: &'a Hearth,
    inputs: &'a EconomyInputs,
    others: [&'a [ToolSlot]; 2],
    locked: &'a mut bool,
    events: &'a mut EventQueue,
}

impl ToolHost for ForgeHost<'_> {
    fn zones(&self) -> &Zones {
        self.zones
    }

    fn heat_source(&self) -> Option<&dyn HeatSource> {
        Some(self.hearth)
    }

    fn inputs(&self) -> &EconomyInputs {
        self.inputs
    }

    fn lock_input(&mut self, locked: bool) {
        if *self.locked != locked {
            *self.locked = locked;
            self.events.push(ForgeEvent::InputLock(locked));
        }
    }

    fn other_tool_near(&self, point: Vec2) -> bool {
        self.others
            .iter()
            .flat_map(|s| s.iter())
            .any(|slot| !slot.stowed && slot.tool.hit_test(point))
    }

    fn emit(&mut self, event: ForgeEvent) {
        self.events.push(event);
    }
}

/// Run `f` against the active tool with a host borrowing the rest of the forge
fn with_active<R>(
    forge: &mut Forge,
    zones: &Zones,
    inputs: &EconomyInputs,
    f: impl FnOnce(&mut Tool, &mut ForgeHost<'_>) -> R,
) -> Option<R> {
    let kind = forge.active?;
    let (before, rest) = forge.tools.split_at_mut(slot_index(kind));
    let (slot, after) = rest.split_first_mut()?;
    if slot.stowed {
        return None;
    }
    let mut host = ForgeHost {
        zones,
        hearth: &forge.hearth,
        inputs,
        others: [&*before, &*after],
        locked: &mut forge.input_locked,
        events: &mut forge.events,
    };
    Some(f(&mut slot.tool, &mut host))
}

/// Advance the forge by one frame
pub fn tick(forge: &mut Forge, input: &TickInput, dt: f32) {
    let dt = clamp_dt(dt);
    forge.time += dt as f64;

    if input.resized {
        forge.zone_cache.invalidate();
    }
    let zones = forge.zone_cache.get(forge.time, forge.layout.as_ref()).clone();
    let inputs = forge.economy.inputs();

    let first_new = forge.events.len();
    for event in &input.pointer {
        handle_pointer(forge, &zones, &inputs, event);
    }
    with_active(forge, &zones, &inputs, |tool, host| tool.step(host, dt));
    let produced: Vec<ForgeEvent> = forge.events.iter().skip(first_new).cloned().collect();
    for event in &produced {
        handle_production(forge, &zones, &inputs, event);
    }

    for spawn in forge.spawns.drain_due(forge.time) {
        fire_spawn(forge, &zones, spawn);
    }

    for landing in forge.letters.step(dt, &forge.tuning.flight) {
        forge.economy.add_letters(1);
        forge.events.push(ForgeEvent::LetterLanded {
            payload: landing.payload,
            x: landing.pos.x,
            y: landing.pos.y,
        });
        forge.events.sound(SoundCue::LetterLand);
    }
    for landing in forge.chips.step(dt, &forge.tuning.flight) {
        forge.economy.add_word(&landing.payload.word);
        forge.events.push(ForgeEvent::ChipLanded {
            payload: landing.payload,
            x: landing.pos.x,
            y: landing.pos.y,
        });
        forge.events.sound(SoundCue::ChipLand);
    }

    forge.hearth.tick(dt);
}

fn handle_pointer(forge: &mut Forge, zones: &Zones, inputs: &EconomyInputs, event: &PointerEvent) {
    let point = event.pos();
    let id = event.pointer_id;
    match event.kind {
        PointerKind::Down => {
            let grabbed = with_active(forge, zones, inputs, |tool, host| tool.try_grab(point, id, host));
            if grabbed == Some(true) {
                return;
            }
            if forge
                .active
                .is_some_and(|k| forge.tool(k).is_held() && !forge.is_stowed(k))
            {
                return;
            }
            // Pointer over a resting inactive tool picks it up instead
            let switch_to = ToolKind::ALL.into_iter().find(|&k| {
                Some(k) != forge.active && !forge.is_stowed(k) && forge.tool(k).hit_test(point)
            });
            if let Some(kind) = switch_to {
                forge.select_tool(kind);
                with_active(forge, zones, inputs, |tool, host| tool.try_grab(point, id, host));
            }
        }
        PointerKind::Move => {
            with_active(forge, zones, inputs, |tool, _| tool.drag_to(point, id));
        }
        PointerKind::Up => {
            with_active(forge, zones, inputs, |tool, host| tool.release(point, id, host));
        }
    }
}

fn handle_production(forge: &mut Forge, zones: &Zones, inputs: &EconomyInputs, event: &ForgeEvent) {
    match *event {
        ForgeEvent::LetterForged {
            x,
            y,
            power,
            head_vx,
            multiplier,
        } => {
            let count = inputs.letters_per_click.saturating_mul(multiplier);
            let origin = Vec2::new(x, y);
            for i in 0..count {
                let glyph = HEBREW_LETTERS[forge.rng.random_range(0..HEBREW_LETTERS.len())];
                let at = forge.time + i as f64 * forge.tuning.flight.stagger as f64;
                forge.spawns.schedule(
                    at,
                    Spawn::Letter {
                        origin,
                        power,
                        head_vx,
                        tile: LetterTile { glyph },
                    },
                );
            }
        }
        ForgeEvent::ForgeTriggered { multiplier } => {
            let Some(forged) = forge.economy.forge_word(multiplier) else {
                log::debug!("Mold pressed with no complete word");
                return;
            };
            let origin = zones
                .mold
                .map(|r| r.center())
                .or_else(|| forge.active.map(|k| forge.tool(k).head.pos))
                .unwrap_or(Vec2::ZERO);
            for i in 0..forged.copies {
                let at = forge.time + i as f64 * forge.tuning.flight.stagger as f64;
                let chip = WordChip {
                    word: forged.word.clone(),
                };
                forge.spawns.schedule(at, Spawn::Chip { origin, chip });
            }
            log::info!("Forged '{}' x{}", forged.word, forged.copies);
            forge.events.push(ForgeEvent::WordForged {
                word: forged.word,
                copies: forged.copies,
            });
        }
        ForgeEvent::InkGround { amount, .. } => forge.economy.add_ink(amount as u64),
        ForgeEvent::FuelScooped { amount, .. } => {
            let taken = forge.economy.take_letters(amount as u64);
            forge.feed_taken(taken);
        }
        ForgeEvent::PutAway { tool } => {
            forge.tools[slot_index(tool)].stowed = true;
            if forge.active == Some(tool) {
                forge.active = None;
            }
        }
        _ => {}
    }
}

fn fire_spawn(forge: &mut Forge, zones: &Zones, spawn: Spawn) {
    let flight = &forge.tuning.flight;
    match spawn {
        Spawn::Letter {
            origin,
            power,
            head_vx,
            tile,
        } => {
            let target = landing_target(zones.letter_pool, zones.bounds, origin, &mut forge.rng);
            let entity = launch(origin, target, power, head_vx, tile, flight, &mut forge.rng);
            if !forge.letters.spawn(entity) {
                log::debug!("Letter pool full, dropping spawn");
            }
        }
        Spawn::Chip { origin, chip } => {
            let target = landing_target(zones.verse, zones.bounds, origin, &mut forge.rng);
            let entity = launch(origin, target, 1.0, 0.0, chip, flight, &mut forge.rng);
            if !forge.chips.spawn(entity) {
                log::debug!("Chip pool full, dropping spawn");
            }
        }
    }
}
