//! Outbound notifications
//!
//! The simulation never calls into the page. Everything the host needs to
//! react to (counters, sounds, sparks) is pushed as a typed event and drained
//! after each tick.

use serde::{Deserialize, Serialize};

use super::tool::ToolKind;

/// Sound cues for the audio sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Hammer meets anvil
    AnvilClank,
    /// Pestle grinds in the mortar
    MortarGrind,
    /// Shovel scoops letters
    ShovelScoop,
    /// Tool torn out of the grip
    Rip,
    /// Tool launched into a spinning throw
    Whoosh,
    /// Free-flying tool hits a wall or floor
    Thud,
    /// Heat level banked
    HeatUp,
    /// Word pressed in the mold
    MoldPress,
    /// Letter reached the pool
    LetterLand,
    /// Word chip reached the verse
    ChipLand,
    /// Tool caught or picked up
    Grab,
}

/// Payload carried by a flying letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterTile {
    pub glyph: char,
}

/// Payload carried by a flying word chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordChip {
    pub word: String,
}

/// Everything the simulation reports to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForgeEvent {
    /// A hammer strike counted on the anvil
    LetterForged {
        x: f32,
        y: f32,
        power: f32,
        head_vx: f32,
        multiplier: u32,
    },
    /// A flying letter reached the pool
    LetterLanded { payload: LetterTile, x: f32, y: f32 },
    /// A heated hammer pressed the mold
    ForgeTriggered { multiplier: u32 },
    /// A mold press produced a word
    WordForged { word: String, copies: u32 },
    /// A flying word chip reached the verse area
    ChipLanded { payload: WordChip, x: f32, y: f32 },
    /// A pestle strike counted in the mortar
    InkGround { x: f32, y: f32, amount: u32 },
    /// A shovel strike scooped letters from the pool
    FuelScooped { x: f32, y: f32, amount: u32 },
    /// Letters went into the hearth
    HearthFed { amount: u32, level: u32 },
    /// The active tool was released over the stow zone
    PutAway { tool: ToolKind },
    /// The active tool changed
    ToolSwitched { tool: ToolKind },
    /// The tool tore free of the grip
    Ripped { tool: ToolKind, speed: f32 },
    /// The tool's heat level rose
    HeatLevelUp { tool: ToolKind, level: u32 },
    /// Host should (un)lock page scrolling while a tool is dragged
    InputLock(bool),
    /// Spark burst at an impact point
    Sparks { x: f32, y: f32, count: u32 },
    /// Onomatopoeia floating from an impact point
    Clank { x: f32, y: f32, word: &'static str },
    Sound(SoundCue),
}

impl ForgeEvent {
    /// Cosmetic events that may be dropped under load
    pub fn is_cosmetic(&self) -> bool {
        matches!(self, ForgeEvent::Sparks { .. } | ForgeEvent::Clank { .. })
    }
}

/// Event sink with a per-tick budget for cosmetic spawns
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<ForgeEvent>,
    cosmetic_budget: usize,
    cosmetic_used: usize,
}

impl EventQueue {
    pub fn new(cosmetic_budget: usize) -> Self {
        Self {
            events: Vec::with_capacity(32),
            cosmetic_budget,
            cosmetic_used: 0,
        }
    }

    /// Push an event; cosmetic events over budget are silently dropped
    pub fn push(&mut self, event: ForgeEvent) {
        if event.is_cosmetic() {
            if self.cosmetic_used >= self.cosmetic_budget {
                return;
            }
            self.cosmetic_used += 1;
        }
        self.events.push(event);
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.push(ForgeEvent::Sound(cue));
    }

    pub fn set_cosmetic_budget(&mut self, budget: usize) {
        self.cosmetic_budget = budget;
    }

    /// Take everything queued since the last drain and reset the budget
    pub fn drain(&mut self) -> Vec<ForgeEvent> {
        self.cosmetic_used = 0;
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForgeEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Onomatopoeia for an impact of the given power
pub fn clank_word(power: f32) -> &'static str {
    if power >= 1.3 {
        "KRAANG!"
    } else if power >= 0.9 {
        "CLANG!"
    } else if power >= 0.5 {
        "clank"
    } else {
        "tink"
    }
}
