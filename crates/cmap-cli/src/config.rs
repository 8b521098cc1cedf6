//! Layout configuration file.
//!
//! ```toml
//! [layout]
//! strategy = "force"
//!
//! [force]
//! link_distance = 140.0
//! repulsion = 2000.0
//! center = { x = 400.0, y = 300.0 }
//! iterations = 500
//! seed = 7
//!
//! [build]
//! synthesize_missing_talks = false
//! ```
//!
//! Every table and key is optional. Command-line flags win over the file.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use cmap_core::{BuildPolicy, ForceConfig, LayoutStrategy};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    #[default]
    Grouped,
    Force,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub layout: LayoutSection,
    pub force: ForceConfig,
    pub build: BuildSection,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSection {
    pub strategy: StrategyName,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Create "Untitled talk" nodes for talk ids nothing else defines.
    pub synthesize_missing_talks: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            synthesize_missing_talks: BuildPolicy::default().synthesize_missing_talks,
        }
    }
}

/// Flag values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub strategy: Option<StrategyName>,
    pub seed: Option<u64>,
    pub iterations: Option<usize>,
}

impl FileConfig {
    /// Read the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn strategy(&self, overrides: &Overrides) -> LayoutStrategy {
        match overrides.strategy.unwrap_or(self.layout.strategy) {
            StrategyName::Grouped => LayoutStrategy::Grouped,
            StrategyName::Force => {
                let mut force = self.force.clone();
                if let Some(seed) = overrides.seed {
                    force.seed = seed;
                }
                if let Some(iterations) = overrides.iterations {
                    force.iterations = iterations;
                }
                LayoutStrategy::Force(force)
            }
        }
    }

    pub fn build_policy(&self) -> BuildPolicy {
        BuildPolicy {
            synthesize_missing_talks: self.build.synthesize_missing_talks,
        }
    }
}
