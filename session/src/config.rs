use std::{fs, path::Path};

use ant_raid_core::{DifficultyTuning, DAILY_ENERGY};
use ant_raid_world::Config as WorldConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for a raid session, loadable from TOML.
///
/// Every field is optional in the document; missing fields take the
/// defaults below.
///
/// ```toml
/// buff_grant_chance = 0.25
/// rng_seed = 42
/// daily_energy = 3
///
/// [difficulty]
/// initial_advance_ms = 1500.0
/// escalation_factor = 0.95
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Difficulty curve.
    pub difficulty: DifficultyTuning,
    /// Probability that a boss victory grants the hunter buff.
    pub buff_grant_chance: f64,
    /// Seed shared by the spawner and the reward rolls.
    pub rng_seed: u64,
    /// Energy granted at the start of each UTC day.
    pub daily_energy: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            difficulty: world.difficulty,
            buff_grant_chance: world.buff_grant_chance,
            rng_seed: world.rng_seed,
            daily_energy: DAILY_ENERGY,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse session config toml contents")?;
        config
            .difficulty
            .validate()
            .context("difficulty table is unusable")?;
        if !(0.0..=1.0).contains(&config.buff_grant_chance) {
            anyhow::bail!(
                "buff_grant_chance must lie in [0, 1], got {}",
                config.buff_grant_chance
            );
        }
        Ok(config)
    }

    /// Reads and parses the configuration document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid session config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SessionConfig::from_toml_str("").expect("parse");
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = SessionConfig::from_toml_str(
            "rng_seed = 7\n[difficulty]\nmin_advance_ms = 400.0\n",
        )
        .expect("parse");

        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.difficulty.min_advance_ms, 400.0);
        assert_eq!(
            config.difficulty.initial_advance_ms,
            DifficultyTuning::default().initial_advance_ms
        );
        assert_eq!(config.daily_energy, DAILY_ENERGY);
    }

    #[test]
    fn rejects_out_of_range_buff_chance() {
        assert!(SessionConfig::from_toml_str("buff_grant_chance = 1.5").is_err());
        assert!(SessionConfig::from_toml_str("buff_grant_chance = nan").is_err());
    }

    #[test]
    fn defaults_match_world_defaults() {
        let config = SessionConfig::default();
        let world = WorldConfig::default();
        assert_eq!(config.rng_seed, world.rng_seed);
        assert_eq!(config.buff_grant_chance, world.buff_grant_chance);
        assert_eq!(config.difficulty, world.difficulty);
    }

    #[test]
    fn rejects_unusable_difficulty_tables() {
        let documents = [
            "[difficulty]\ninitial_spawn_interval_ms = 1e30\n",
            "[difficulty]\ninitial_advance_ms = inf\n",
            "[difficulty]\nmin_advance_ms = nan\n",
            "[difficulty]\nmin_spawn_interval_ms = 0.0\n",
            "[difficulty]\nmin_advance_ms = 2000.0\n",
            "[difficulty]\nescalation_factor = 1.5\n",
            "[difficulty]\nescalation_factor = 0.0\n",
            "[difficulty]\nescalation_period_ms = 0\n",
            "[difficulty]\ninitial_concurrency = -1.0\n",
            "[difficulty]\nconcurrency_step = inf\n",
            "[difficulty]\nmax_concurrency = 1e9\n",
        ];
        for document in documents {
            let error = SessionConfig::from_toml_str(document).expect_err(document);
            assert!(
                format!("{error:#}").contains("invalid difficulty tuning"),
                "{document}: {error:#}"
            );
        }
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("raid.toml");
        fs::write(&path, "daily_energy = 5").expect("write");

        let config = SessionConfig::load(&path).expect("load");
        assert_eq!(config.daily_energy, 5);
        assert!(SessionConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
