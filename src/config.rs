//! Conductor configuration
//!
//! One immutable value describes the three size classes. It is handed to
//! [`crate::Conductor::new`] and kept so that a reset rebuilds identical
//! groups.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::SizeClass;

/// Per-sequence playback parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceOptions {
    /// Global steps per sequence cell (1 = advance every step)
    pub step_rate: u32,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self { step_rate: 1 }
    }
}

/// Per-group admission and eviction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupOptions {
    /// Density applied to every sequence when it is committed to a slot
    pub fixed_density: f32,
    /// Steps a sequence may live before it is marked for eviction (None = forever)
    pub max_age: Option<u32>,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            fixed_density: 1.0,
            max_age: None,
        }
    }
}

/// One size class: slot pool shape plus the polypeptide length that selects it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Number of slots (and output channels)
    pub capacity: usize,
    /// Steps per cycle; downbeats fall on multiples of this
    pub size: u32,
    /// Polypeptides strictly longer than this qualify for the class
    pub length_threshold: usize,
    #[serde(default)]
    pub sequence: SequenceOptions,
    #[serde(default)]
    pub group: GroupOptions,
}

impl GroupConfig {
    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity { group: name });
        }
        if self.size == 0 {
            return Err(ConfigError::ZeroSize { group: name });
        }
        if self.sequence.step_rate == 0 {
            return Err(ConfigError::ZeroStepRate { group: name });
        }
        if !(0.0..=1.0).contains(&self.group.fixed_density) {
            return Err(ConfigError::DensityOutOfRange(self.group.fixed_density));
        }
        Ok(())
    }
}

/// Full conductor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorConfig {
    pub small: GroupConfig,
    pub medium: GroupConfig,
    pub large: GroupConfig,
    /// Channel number of the first small-group slot
    pub first_channel: u32,
    /// Characters pulled from the source per refill
    pub chunk_size: usize,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            small: GroupConfig {
                capacity: 4,
                size: 16,
                length_threshold: 90,
                sequence: SequenceOptions::default(),
                group: GroupOptions::default(),
            },
            medium: GroupConfig {
                capacity: 2,
                size: 32,
                length_threshold: 120,
                sequence: SequenceOptions { step_rate: 2 },
                group: GroupOptions::default(),
            },
            large: GroupConfig {
                capacity: 1,
                size: 16,
                length_threshold: 150,
                sequence: SequenceOptions { step_rate: 32 },
                group: GroupOptions::default(),
            },
            first_channel: 1,
            chunk_size: 1000,
        }
    }
}

impl ConductorConfig {
    pub fn group(&self, class: SizeClass) -> &GroupConfig {
        match class {
            SizeClass::Small => &self.small,
            SizeClass::Medium => &self.medium,
            SizeClass::Large => &self.large,
        }
    }

    /// Check slot counts, cycle lengths and threshold ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.small.validate("small")?;
        self.medium.validate("medium")?;
        self.large.validate("large")?;

        let (small, medium, large) = (
            self.small.length_threshold,
            self.medium.length_threshold,
            self.large.length_threshold,
        );
        if !(small < medium && medium < large) {
            return Err(ConfigError::UnorderedThresholds {
                small,
                medium,
                large,
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        self.last_channel()?;
        Ok(())
    }

    /// One past the channel of the last large-group slot
    fn last_channel(&self) -> Result<u32, ConfigError> {
        let overflow = |channels| ConfigError::ChannelOverflow {
            first_channel: self.first_channel,
            channels,
        };
        let channels = SizeClass::ALL
            .iter()
            .try_fold(0usize, |sum, &class| sum.checked_add(self.group(class).capacity))
            .ok_or_else(|| overflow(usize::MAX))?;
        u32::try_from(channels)
            .ok()
            .and_then(|n| self.first_channel.checked_add(n))
            .ok_or_else(|| overflow(channels))
    }

    /// Parse and validate a TOML document; omitted tables keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML, every default spelled out
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
