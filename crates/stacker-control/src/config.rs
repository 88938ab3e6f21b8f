// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration of the stack engine and its service.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use stacker_core::{CachePolicy, StoreFlags};
use std::path::Path;
use std::time::Duration;

/// Configuration for the stack engine.
///
/// Every interval is expressed in simulation ticks. Missing fields in a
/// configuration file take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackerConfig {
    /// Simulation ticks per second. Converts tick intervals into wall time
    /// for the background workers.
    pub tick_rate: u32,
    /// Ticks between two sweeps.
    pub sweep_interval_ticks: u64,
    /// Ticks between two persistence passes.
    pub save_interval_ticks: u64,
    /// Delay before checking that a freshly created record's object exists.
    pub existence_check_delay_ticks: u64,
    /// Delay before creating the display of a freshly created container.
    pub display_delay_ticks: u64,
    /// Which kinds are written to the durable store.
    pub store: StoreFlags,
    /// Which objects enter the live cache.
    pub policy: CachePolicy,
}

impl Default for StackerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            sweep_interval_ticks: 100,
            save_interval_ticks: 6000,
            existence_check_delay_ticks: 10,
            display_delay_ticks: 2,
            store: StoreFlags::default(),
            policy: CachePolicy::default(),
        }
    }
}

impl StackerConfig {
    /// Reads a configuration from a RON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = ron::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration, falling back to defaults if the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No config at {}, using defaults.", path.display());
            Ok(Self::default())
        }
    }

    /// Writes the configuration as pretty RON.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        let text = ron::ser::to_string_pretty(self, pretty_config)
            .context("failed to encode config")?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write config file {}", path.display()))
    }

    /// Rejects values the workers cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.tick_rate > 0, "tick_rate must be positive");
        anyhow::ensure!(
            self.sweep_interval_ticks > 0,
            "sweep_interval_ticks must be positive"
        );
        anyhow::ensure!(
            self.save_interval_ticks > 0,
            "save_interval_ticks must be positive"
        );
        Ok(())
    }

    /// Converts a tick count into wall time at the configured tick rate.
    pub fn ticks_to_duration(&self, ticks: u64) -> Duration {
        Duration::from_millis(ticks.saturating_mul(1000) / u64::from(self.tick_rate.max(1)))
    }

    /// Wall time between two sweeps.
    pub fn sweep_interval(&self) -> Duration {
        self.ticks_to_duration(self.sweep_interval_ticks)
    }

    /// Wall time between two persistence passes.
    pub fn save_interval(&self) -> Duration {
        self.ticks_to_duration(self.save_interval_ticks)
    }
}
