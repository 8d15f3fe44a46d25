//! Letters, ink, words and upgrades
//!
//! The only state the tool engine reads is [`EconomyInputs`]; everything else
//! is mutated at the production boundary in the tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rip speed added per grip level (px/s)
pub const GRIP_BONUS_PER_LEVEL: f32 = 400.0;

/// Highest purchasable heat cap level
pub const MAX_HEAT_CAP_LEVEL: u32 = 5;

/// Economy values the tool engine reads each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyInputs {
    pub letters_per_click: u32,
    /// Added to each tool's base rip speed
    pub rip_speed_bonus: f32,
    /// Player cap on tool heat levels
    pub max_heat_level: u32,
    pub spin_throw_level: u32,
    pub power_swing_level: u32,
}

impl Default for EconomyInputs {
    fn default() -> Self {
        Upgrades::default().inputs()
    }
}

/// Purchasable upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    SpinThrow,
    PowerSwing,
    Grip,
    HeatCap,
    LettersPerClick,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::SpinThrow,
        UpgradeKind::PowerSwing,
        UpgradeKind::Grip,
        UpgradeKind::HeatCap,
        UpgradeKind::LettersPerClick,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::SpinThrow => "spin-throw",
            UpgradeKind::PowerSwing => "power-swing",
            UpgradeKind::Grip => "grip",
            UpgradeKind::HeatCap => "heat-cap",
            UpgradeKind::LettersPerClick => "letters-per-click",
        }
    }

    /// Ink price of the first level; doubles every level
    fn base_cost(&self) -> u64 {
        match self {
            UpgradeKind::SpinThrow => 40,
            UpgradeKind::PowerSwing => 60,
            UpgradeKind::Grip => 25,
            UpgradeKind::HeatCap => 30,
            UpgradeKind::LettersPerClick => 20,
        }
    }

    pub fn cost(&self, level: u32) -> u64 {
        self.base_cost().saturating_mul(1u64 << level.min(32))
    }
}

/// Upgrade levels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub spin_throw_level: u32,
    pub power_swing_level: u32,
    pub grip_level: u32,
    pub heat_cap_level: u32,
    pub letters_per_click_level: u32,
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::SpinThrow => self.spin_throw_level,
            UpgradeKind::PowerSwing => self.power_swing_level,
            UpgradeKind::Grip => self.grip_level,
            UpgradeKind::HeatCap => self.heat_cap_level,
            UpgradeKind::LettersPerClick => self.letters_per_click_level,
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::SpinThrow => &mut self.spin_throw_level,
            UpgradeKind::PowerSwing => &mut self.power_swing_level,
            UpgradeKind::Grip => &mut self.grip_level,
            UpgradeKind::HeatCap => &mut self.heat_cap_level,
            UpgradeKind::LettersPerClick => &mut self.letters_per_click_level,
        }
    }

    pub fn inputs(&self) -> EconomyInputs {
        EconomyInputs {
            letters_per_click: 1 + self.letters_per_click_level,
            rip_speed_bonus: self.grip_level as f32 * GRIP_BONUS_PER_LEVEL,
            max_heat_level: 1 + self.heat_cap_level,
            spin_throw_level: self.spin_throw_level,
            power_swing_level: self.power_swing_level,
        }
    }
}

/// A mold: a row of letter slots that presses into a word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mold {
    slots: Vec<Option<char>>,
}

impl Mold {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len.max(1)],
        }
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    fn word(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

/// A pressed word and how many chips it mints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgedWord {
    pub word: String,
    pub copies: u32,
}

/// The target verse, one word per slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    target: Vec<String>,
    placed: Vec<Option<String>>,
}

impl Verse {
    pub fn new<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        let target: Vec<String> = words.into_iter().map(Into::into).collect();
        let placed = vec![None; target.len()];
        Self { target, placed }
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn target(&self, slot: usize) -> Option<&str> {
        self.target.get(slot).map(String::as_str)
    }

    pub fn placed(&self, slot: usize) -> Option<&str> {
        self.placed.get(slot).and_then(|p| p.as_deref())
    }

    pub fn is_complete(&self) -> bool {
        !self.target.is_empty() && self.placed.iter().all(Option::is_some)
    }
}

/// Player economy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    pub letters: u64,
    pub ink: u64,
    /// Word inventory (word -> copies)
    pub words: BTreeMap<String, u32>,
    pub molds: Vec<Mold>,
    pub verse: Verse,
    pub upgrades: Upgrades,
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(Verse::new(["בראשית", "ברא", "אלהים"]), &[3])
    }
}

impl Economy {
    pub fn new(verse: Verse, mold_sizes: &[usize]) -> Self {
        Self {
            letters: 0,
            ink: 0,
            words: BTreeMap::new(),
            molds: mold_sizes.iter().map(|&n| Mold::new(n)).collect(),
            verse,
            upgrades: Upgrades::default(),
        }
    }

    pub fn inputs(&self) -> EconomyInputs {
        self.upgrades.inputs()
    }

    pub fn add_letters(&mut self, n: u64) {
        self.letters = self.letters.saturating_add(n);
    }

    /// Take up to `n` letters; returns how many were taken
    pub fn take_letters(&mut self, n: u64) -> u64 {
        let taken = n.min(self.letters);
        self.letters -= taken;
        taken
    }

    pub fn add_ink(&mut self, n: u64) {
        self.ink = self.ink.saturating_add(n);
    }

    pub fn add_word(&mut self, word: &str) {
        *self.words.entry(word.to_string()).or_insert(0) += 1;
    }

    pub fn word_count(&self, word: &str) -> u32 {
        self.words.get(word).copied().unwrap_or(0)
    }

    /// Put a glyph in an empty mold slot, spending one letter
    pub fn fill_mold(&mut self, mold: usize, slot: usize, glyph: char) -> bool {
        if self.letters == 0 {
            return false;
        }
        let Some(cell) = self.molds.get_mut(mold).and_then(|m| m.slots.get_mut(slot)) else {
            return false;
        };
        if cell.is_some() {
            return false;
        }
        *cell = Some(glyph);
        self.letters -= 1;
        true
    }

    /// Press the first complete mold. The word itself is credited when its
    /// chips land.
    pub fn forge_word(&mut self, multiplier: u32) -> Option<ForgedWord> {
        let mold = self.molds.iter_mut().find(|m| m.is_complete())?;
        let word = mold.word();
        mold.clear();
        Some(ForgedWord {
            word,
            copies: multiplier.max(1),
        })
    }

    /// Move one copy of `word` from the inventory into a verse slot.
    /// Only the slot's own word is accepted.
    pub fn place_word(&mut self, slot: usize, word: &str) -> bool {
        if self.verse.target(slot) != Some(word) || self.verse.placed(slot).is_some() {
            return false;
        }
        let Some(count) = self.words.get_mut(word).filter(|c| **c > 0) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.words.remove(word);
        }
        self.verse.placed[slot] = Some(word.to_string());
        if self.verse.is_complete() {
            log::info!("Verse complete");
        }
        true
    }

    /// Spend ink on the next level of `kind`
    pub fn buy(&mut self, kind: UpgradeKind) -> bool {
        let level = self.upgrades.level(kind);
        if kind == UpgradeKind::HeatCap && level >= MAX_HEAT_CAP_LEVEL {
            return false;
        }
        let cost = kind.cost(level);
        if self.ink < cost {
            return false;
        }
        self.ink -= cost;
        *self.upgrades.level_mut(kind) += 1;
        log::info!("Bought {:?} level {} for {} ink", kind, level + 1, cost);
        true
    }
}
