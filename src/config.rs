//! Difficulty profiles: typed, validated at load, opaque to the simulation beyond their fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

use crate::asset::{get_asset_text, DIFFICULTY_TABLE};
use crate::constants::GRID_WIDTH;
use crate::entity::player::SpeedCurve;
use crate::error::{ConfigError, GameResult};

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// What happens when the head walks off a side edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallPolicy {
    /// Reappear on the opposite edge, same row.
    Teleport,
    /// Drop one row and stay pinned to the edge.
    PushDown,
    GameOver,
}

/// Relative odds of each collection-phase spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWeights {
    pub soul: u32,
    pub grime: u32,
    pub tar: u32,
}

impl SpawnWeights {
    pub fn total(&self) -> u32 {
        self.soul + self.grime + self.tar
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub initial_speed_ms: u64,
    pub speed_decrease_per_follower_ms: u64,
    pub min_speed_ms: u64,
    /// Added to every enemy's base speed. Negative values make enemies faster.
    pub enemy_speed_offset_ms: i64,
    pub spawn_interval_ms: u64,
    pub spawn_weights: SpawnWeights,
    /// Followers needed before the leader appears.
    pub leader_threshold: usize,
    pub pursuer_count: usize,
    /// Spawns at the start of a run that can never roll a Tar-Soul.
    pub grace_spawns: u32,
    pub max_tar_souls: usize,
    pub pursuer_respawn_cooldown_ms: u64,
    /// Whether graves can turn back into pursuers.
    pub marker_respawn: bool,
    pub pushback_distance: i32,
    pub wall_policy: WallPolicy,
}

impl DifficultyProfile {
    pub fn speed_curve(&self) -> SpeedCurve {
        SpeedCurve {
            initial_ms: self.initial_speed_ms,
            decrease_per_follower_ms: self.speed_decrease_per_follower_ms,
            min_ms: self.min_speed_ms,
        }
    }

    /// Rejects profiles the simulation cannot run sensibly.
    pub fn validate(&self, difficulty: Difficulty) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProfile {
            difficulty,
            reason: reason.to_string(),
        };

        if self.min_speed_ms == 0 {
            return Err(invalid("min_speed_ms must be positive"));
        }
        if self.min_speed_ms > self.initial_speed_ms {
            return Err(invalid("min_speed_ms exceeds initial_speed_ms"));
        }
        if self.spawn_interval_ms == 0 {
            return Err(invalid("spawn_interval_ms must be positive"));
        }
        if self.spawn_weights.total() == 0 {
            return Err(invalid("spawn weights must not all be zero"));
        }
        if self.spawn_weights.soul == 0 && self.spawn_weights.grime == 0 && self.grace_spawns > 0 {
            return Err(invalid("grace spawns need a non-tar spawn to pick from"));
        }
        if self.leader_threshold == 0 {
            return Err(invalid("leader_threshold must be at least 1"));
        }
        if self.pursuer_count == 0 || self.pursuer_count as i32 >= GRID_WIDTH / 2 {
            return Err(invalid("pursuer_count must leave room between pursuers"));
        }
        if self.pushback_distance < 1 {
            return Err(invalid("pushback_distance must be at least 1"));
        }
        Ok(())
    }
}

/// Every profile, keyed by difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyTable {
    profiles: BTreeMap<Difficulty, DifficultyProfile>,
}

impl DifficultyTable {
    /// Parses and validates a table. Every difficulty must be present.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let profiles: BTreeMap<Difficulty, DifficultyProfile> = serde_json::from_str(text)?;

        for difficulty in <Difficulty as strum::IntoEnumIterator>::iter() {
            let profile = profiles.get(&difficulty).ok_or(ConfigError::MissingProfile(difficulty))?;
            profile.validate(difficulty)?;
        }

        debug!(count = profiles.len(), "Loaded difficulty table");
        Ok(Self { profiles })
    }

    /// The table bundled with the binary.
    pub fn embedded() -> GameResult<Self> {
        let text = get_asset_text(DIFFICULTY_TABLE)?;
        Ok(Self::from_json(&text)?)
    }

    pub fn get(&self, difficulty: Difficulty) -> &DifficultyProfile {
        // Construction guarantees every difficulty is present.
        &self.profiles[&difficulty]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, &DifficultyProfile)> {
        self.profiles.iter().map(|(d, p)| (*d, p))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_difficulty_names() {
        assert_eq!(Difficulty::from_str("hard").ok(), Some(Difficulty::Hard));
        assert_eq!(Difficulty::Easy.to_string(), "easy");
        assert!(Difficulty::from_str("nightmare").is_err());
    }

    #[test]
    fn test_embedded_table_is_valid() {
        let table = DifficultyTable::embedded().expect("embedded table should load");
        assert_eq!(table.get(Difficulty::Easy).wall_policy, WallPolicy::Teleport);
        assert_eq!(table.get(Difficulty::Normal).wall_policy, WallPolicy::PushDown);
        assert_eq!(table.get(Difficulty::Hard).wall_policy, WallPolicy::GameOver);
    }
}
