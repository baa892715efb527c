#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Profile persistence for Ant Nest Raid players.
//!
//! A profile is stored together with the wall-clock second it was saved at so
//! that time-based state (the hunter buff, skill cooldowns, the daily energy
//! allowance) keeps moving while the player is away.

mod files;

use std::{collections::HashMap, fmt, sync::Mutex, time::Duration};

use ant_raid_core::{ProfileState, SkillCooldown};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use files::JsonFileProfileStore;

const SECONDS_PER_DAY: u64 = 86_400;
const MAX_USER_ID_LEN: usize = 64;

/// Errors surfaced by profile stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The user id cannot be used as a storage key.
    #[error("invalid user id {0:?}: expected 1-64 ASCII letters, digits, '-' or '_'")]
    InvalidUserId(String),
    /// Reading or writing the backing file failed.
    #[error("profile storage i/o failed for {path}")]
    Io {
        /// File the operation targeted.
        path: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The stored document could not be encoded or decoded.
    #[error("profile document is malformed")]
    Codec(#[from] serde_json::Error),
    /// Another thread panicked while holding the store lock.
    #[error("profile store lock poisoned")]
    Poisoned,
}

/// Identifier of an authenticated player, restricted to a filename-safe alphabet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Validates and wraps the provided identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, StoreError> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= MAX_USER_ID_LEN
            && value
                .bytes()
                .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_');
        if valid {
            Ok(Self(value))
        } else {
            Err(StoreError::InvalidUserId(value))
        }
    }

    /// Borrowed view of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted document: the profile plus the wall-clock context it was saved in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    /// Persisted player state.
    pub profile: ProfileState,
    /// Unix seconds at which the profile was written.
    pub saved_at_unix: u64,
    /// UTC day number whose energy allowance `profile.energy` belongs to.
    pub energy_day: u64,
}

impl StoredProfile {
    /// Captures `profile` as saved at `now_unix`.
    #[must_use]
    pub fn capture(profile: ProfileState, now_unix: u64) -> Self {
        Self {
            profile,
            saved_at_unix: now_unix,
            energy_day: now_unix / SECONDS_PER_DAY,
        }
    }

    /// Produces the profile as it should look at `now_unix`.
    ///
    /// Elapsed wall-clock time is taken off the buff and the skill cooldowns.
    /// Crossing into a later UTC day tops energy back up to `daily_energy`.
    #[must_use]
    pub fn restore(self, now_unix: u64, daily_energy: u32) -> ProfileState {
        let elapsed = now_unix.saturating_sub(self.saved_at_unix);
        let mut profile = self.profile;

        let elapsed_secs = u32::try_from(elapsed).unwrap_or(u32::MAX);
        profile.buff.remaining_secs = profile.buff.remaining_secs.saturating_sub(elapsed_secs);

        let elapsed = Duration::from_secs(elapsed);
        profile.skill_cooldowns = profile
            .skill_cooldowns
            .into_iter()
            .filter_map(|cooldown| {
                let remaining = cooldown.remaining.saturating_sub(elapsed);
                (!remaining.is_zero()).then_some(SkillCooldown {
                    skill: cooldown.skill,
                    remaining,
                })
            })
            .collect();

        if now_unix / SECONDS_PER_DAY > self.energy_day {
            profile.energy = profile.energy.max(daily_energy);
        }

        profile
    }
}

/// Storage backend for player profiles.
pub trait ProfileStore {
    /// Loads the stored profile for `user`, if one exists.
    fn load_profile(&self, user: &UserId) -> Result<Option<StoredProfile>, StoreError>;

    /// Replaces the stored profile for `user`.
    fn save_profile(&self, user: &UserId, profile: &StoredProfile) -> Result<(), StoreError>;
}

impl<T: ProfileStore + ?Sized> ProfileStore for &T {
    fn load_profile(&self, user: &UserId) -> Result<Option<StoredProfile>, StoreError> {
        (**self).load_profile(user)
    }

    fn save_profile(&self, user: &UserId, profile: &StoredProfile) -> Result<(), StoreError> {
        (**self).save_profile(user, profile)
    }
}

/// In-memory store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<UserId, StoredProfile>>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a stored profile.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.profiles.lock().map_err(|_| StoreError::Poisoned)?.len())
    }

    /// Reports whether no profile has been saved yet.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load_profile(&self, user: &UserId) -> Result<Option<StoredProfile>, StoreError> {
        let profiles = self.profiles.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(profiles.get(user).cloned())
    }

    fn save_profile(&self, user: &UserId, profile: &StoredProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().map_err(|_| StoreError::Poisoned)?;
        let _ = profiles.insert(user.clone(), profile.clone());
        Ok(())
    }
}
