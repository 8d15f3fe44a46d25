//! Deterministic simulation module
//!
//! All forge logic lives here. This module must stay platform-free:
//! - `dt` is clamped before integration
//! - Seeded RNG only
//! - Zones come from a [`LayoutSource`], never from the page directly
//! - Everything the page reacts to leaves as a [`ForgeEvent`]

pub mod economy;
pub mod events;
pub mod flight;
pub mod geom;
pub mod heat;
pub mod impact;
pub mod schedule;
#[cfg(test)]
pub(crate) mod testkit;
pub mod tick;
pub mod tool;

pub use economy::{Economy, EconomyInputs, ForgedWord, Mold, UpgradeKind, Upgrades, Verse};
pub use events::{EventQueue, ForgeEvent, LetterTile, SoundCue, WordChip, clank_word};
pub use flight::{FlightPool, FlyingEntity, Landing, launch, launch_velocity};
pub use geom::{LayoutSource, Rect, StaticLayout, ZoneCache, ZoneId, Zones};
pub use heat::{HeatCharge, HeatSource, Hearth};
pub use impact::{Strike, StrikeOutcome, detect_strike, resolve_strike, strike_power};
pub use schedule::Scheduler;
pub use tick::{Forge, PointerEvent, PointerKind, TickInput, ToolSlot, tick};
pub use tool::{Head, ReleaseOutcome, Tool, ToolHost, ToolKind, ToolMode};
