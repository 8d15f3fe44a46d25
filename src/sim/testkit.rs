//! Shared fixtures for simulation tests

use glam::Vec2;

use super::economy::EconomyInputs;
use super::events::ForgeEvent;
use super::geom::{Rect, Zones};
use super::heat::{HeatSource, Hearth};
use super::tool::ToolHost;
use crate::tuning::HeatTuning;

/// 800x800 playfield with the anvil lower right, clear of x=400 above y=300
pub(crate) fn test_zones() -> Zones {
    Zones {
        bounds: Some(Rect::new(0.0, 0.0, 800.0, 800.0)),
        anvil: Some(Rect::new(450.0, 600.0, 200.0, 100.0)),
        mortar: Some(Rect::new(50.0, 400.0, 100.0, 60.0)),
        hearth: Some(Rect::new(0.0, 650.0, 120.0, 150.0)),
        mold: Some(Rect::new(700.0, 50.0, 80.0, 80.0)),
        stow: None,
        letter_pool: Some(Rect::new(150.0, 700.0, 200.0, 100.0)),
        verse: Some(Rect::new(300.0, 40.0, 300.0, 60.0)),
    }
}

/// Records everything a tool does to its host
pub(crate) struct TestHost {
    pub zones: Zones,
    pub hearth: Hearth,
    pub inputs: EconomyInputs,
    pub locked: bool,
    pub other_tool_at: Option<Vec2>,
    pub events: Vec<ForgeEvent>,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            zones: test_zones(),
            hearth: Hearth::new(&HeatTuning::default()),
            inputs: EconomyInputs::default(),
            locked: false,
            other_tool_at: None,
            events: Vec::new(),
        }
    }
}

impl ToolHost for TestHost {
    fn zones(&self) -> &Zones {
        &self.zones
    }

    fn heat_source(&self) -> Option<&dyn HeatSource> {
        Some(&self.hearth)
    }

    fn inputs(&self) -> &EconomyInputs {
        &self.inputs
    }

    fn lock_input(&mut self, locked: bool) {
        self.locked = locked;
    }

    fn other_tool_near(&self, point: Vec2) -> bool {
        self.other_tool_at.is_some_and(|p| p.distance(point) < 30.0)
    }

    fn emit(&mut self, event: ForgeEvent) {
        self.events.push(event);
    }
}

pub(crate) fn count_forged(host: &TestHost) -> usize {
    host.events
        .iter()
        .filter(|e| matches!(e, ForgeEvent::LetterForged { .. }))
        .count()
}
