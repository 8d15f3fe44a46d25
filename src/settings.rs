//! Player settings and preferences
//!
//! Quality presets cap how many cosmetic events and flying letters the forge
//! produces per frame; everything else is volume and accessibility.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Concurrent flying letters for this preset
    pub fn max_flying_letters(&self) -> usize {
        match self {
            QualityPreset::Low => 30,
            QualityPreset::Medium => 80,
            QualityPreset::High => 120,
        }
    }

    /// Sparks and clank words per tick
    pub fn cosmetic_budget(&self) -> usize {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => 12,
            QualityPreset::High => 32,
        }
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Spark bursts on strikes
    pub sparks: bool,
    /// Floating clank words on strikes
    pub clank_words: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no sparks, fewer flying letters)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            sparks: true,
            clank_words: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse saved preferences; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Cosmetic events per tick (0 when every effect is off)
    pub fn cosmetic_budget(&self) -> usize {
        if (!self.sparks && !self.clank_words) || self.reduced_motion {
            0
        } else {
            self.quality.cosmetic_budget()
        }
    }

    /// Effective flying letter cap (respects reduced_motion)
    pub fn max_flying_letters(&self) -> usize {
        let cap = self.quality.max_flying_letters();
        if self.reduced_motion { cap / 4 } else { cap }
    }
}
