use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::role::StoryRole;
use super::TARGET_SOURCE;

/// Quality weight given to sources the registry does not know
pub const UNREGISTERED_QUALITY_WEIGHT: f64 = 0.5;

/// What the registry knows about one source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProfile {
    pub quality_tier: u8,
    #[serde(alias = "baseStoryRole")]
    pub role: StoryRole,
}

impl SourceProfile {
    pub fn new(quality_tier: u8, role: StoryRole) -> Self {
        SourceProfile { quality_tier, role }
    }

    /// Tier 1 is the most trusted
    pub fn quality_weight(&self) -> f64 {
        match self.quality_tier {
            0 | 1 => 1.0,
            2 => 0.75,
            3 => 0.5,
            _ => 0.25,
        }
    }
}

/// Read-only lookup of source roles and quality tiers.
///
/// Injected into selection and curation so that callers decide where the
/// metadata lives.
pub trait SourceRegistry: Send + Sync {
    fn lookup(&self, source_id: &str) -> Option<SourceProfile>;

    fn quality_weight(&self, source_id: &str) -> f64 {
        self.lookup(source_id)
            .map(|profile| profile.quality_weight())
            .unwrap_or(UNREGISTERED_QUALITY_WEIGHT)
    }
}

/// In-memory registry backed by a map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticSourceRegistry {
    profiles: HashMap<String, SourceProfile>,
}

impl StaticSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_id: &str, profile: SourceProfile) {
        self.profiles.insert(source_id.to_string(), profile);
    }

    pub fn with(mut self, source_id: &str, profile: SourceProfile) -> Self {
        self.insert(source_id, profile);
        self
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Loads `{ "<sourceId>": { "qualityTier": 1, "role": "reporting" } }`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source registry {}", path.display()))?;
        let profiles: HashMap<String, SourceProfile> = serde_json::from_str(&data)
            .with_context(|| format!("Invalid source registry {}", path.display()))?;

        info!(target: TARGET_SOURCE, "Loaded {} source profiles from {}", profiles.len(), path.display());
        Ok(StaticSourceRegistry { profiles })
    }
}

impl SourceRegistry for StaticSourceRegistry {
    fn lookup(&self, source_id: &str) -> Option<SourceProfile> {
        self.profiles.get(source_id).copied()
    }
}
