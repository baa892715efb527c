#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for Ant Nest Raid.
//!
//! [`GameSession`] owns the world and the pure systems, feeds them time and
//! player input, forwards audio cues and snapshots to its collaborators, and
//! keeps the player's profile in the store up to date.

mod config;

use std::{
    collections::VecDeque,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use ant_raid_core::{
    AudioCue, Command, EndReason, Event, PlayerInput, ProfileState, SessionPhase,
    SessionSnapshot, StartRejection, NO_ENERGY_NOTICE, PROGRESS_QUANTUM,
};
use ant_raid_persistence::{ProfileStore, StoredProfile, UserId};
use ant_raid_system_difficulty::Difficulty;
use ant_raid_system_movement::Movement;
use ant_raid_system_spawning::{Config as SpawningConfig, Spawning};
use ant_raid_system_targeting::Targeting;
use ant_raid_world::{self as world, query, Config as WorldConfig, World};
use thiserror::Error;

pub use config::SessionConfig;

const WORLD_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Errors returned to callers of [`GameSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The daily energy allowance is spent.
    #[error("{}", NO_ENERGY_NOTICE)]
    NoEnergy,
}

/// Already-authenticated player the session runs for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Storage key of the player.
    pub user_id: UserId,
    /// Name shown to the player.
    pub display_name: String,
}

/// Receives audio cues as they happen.
pub trait AudioSink {
    /// Plays the provided cue.
    fn play(&mut self, cue: AudioCue);
}

/// Audio sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Receives the session snapshot once per [`GameSession::advance`].
pub trait Presenter {
    /// Renders the provided snapshot.
    fn present(&mut self, snapshot: &SessionSnapshot);
}

/// Presenter that ignores snapshots.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _snapshot: &SessionSnapshot) {}
}

/// Wall-clock source used to stamp saved profiles.
pub trait Clock {
    /// Current time in Unix seconds.
    fn now_unix(&self) -> u64;
}

/// Clock backed by the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Drives one player's raids from profile load to the final save.
#[derive(Debug)]
pub struct GameSession<S, A, P, C = SystemClock>
where
    S: ProfileStore,
    A: AudioSink,
    P: Presenter,
    C: Clock,
{
    identity: Identity,
    store: S,
    audio: A,
    presenter: P,
    clock: C,
    world: World,
    spawning: Spawning,
    difficulty: Difficulty,
    movement: Movement,
    targeting: Targeting,
    pending_inputs: VecDeque<PlayerInput>,
    save_pending: bool,
}

impl<S, A, P, C> GameSession<S, A, P, C>
where
    S: ProfileStore,
    A: AudioSink,
    P: Presenter,
    C: Clock,
{
    /// Creates a session and restores the player's stored profile.
    ///
    /// A profile that cannot be loaded is logged and replaced by defaults.
    pub fn new(
        identity: Identity,
        store: S,
        audio: A,
        presenter: P,
        config: SessionConfig,
        clock: C,
    ) -> Self {
        let mut world = World::with_config(WorldConfig {
            difficulty: config.difficulty,
            buff_grant_chance: config.buff_grant_chance,
            rng_seed: config.rng_seed ^ WORLD_SEED_SALT,
        });

        let profile = match store.load_profile(&identity.user_id) {
            Ok(Some(stored)) => stored.restore(clock.now_unix(), config.daily_energy),
            Ok(None) => ProfileState {
                energy: config.daily_energy,
                ..ProfileState::default()
            },
            Err(error) => {
                tracing::warn!(
                    user = %identity.user_id,
                    "failed to load profile, using defaults: {error}"
                );
                ProfileState {
                    energy: config.daily_energy,
                    ..ProfileState::default()
                }
            }
        };

        let mut events = Vec::new();
        world::apply(&mut world, Command::RestoreProfile { profile }, &mut events);

        tracing::info!(
            user = %identity.user_id,
            name = %identity.display_name,
            energy = query::energy(&world),
            "session ready"
        );

        Self {
            identity,
            store,
            audio,
            presenter,
            clock,
            world,
            spawning: Spawning::new(SpawningConfig::new(config.rng_seed)),
            difficulty: Difficulty::new(config.difficulty.escalation_period()),
            movement: Movement::default(),
            targeting: Targeting::new(),
            pending_inputs: VecDeque::new(),
            save_pending: false,
        }
    }

    /// Starts a raid, tearing down any raid already in progress.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if query::phase(&self.world).is_active() {
            self.end(EndReason::Teardown);
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::StartSession, &mut events);
        if events.iter().any(|event| {
            matches!(
                event,
                Event::SessionRejected {
                    reason: StartRejection::NoEnergy
                }
            )
        }) {
            tracing::info!(user = %self.identity.user_id, "raid rejected: no energy");
            return Err(SessionError::NoEnergy);
        }

        self.pending_inputs.clear();
        self.dispatch(events);
        tracing::info!(
            user = %self.identity.user_id,
            energy = query::energy(&self.world),
            "raid started"
        );
        self.save();
        Ok(())
    }

    /// Queues input to be resolved at the start of the next [`advance`](Self::advance).
    pub fn queue_input(&mut self, input: PlayerInput) {
        self.pending_inputs.push_back(input);
    }

    /// Advances the session by `dt`.
    ///
    /// Queued input is resolved first, each against a fresh view of the
    /// field, then time moves forward and the systems react. Time moves in
    /// steps of at most one [`PROGRESS_QUANTUM`], so a long frame plays out
    /// the same as the equivalent run of short ones.
    pub fn advance(&mut self, dt: Duration) {
        while let Some(input) = self.pending_inputs.pop_front() {
            let enemies = query::enemy_view(&self.world);
            let mut commands = Vec::new();
            self.targeting
                .handle(input, query::phase(&self.world), &enemies, &mut commands);
            self.execute(commands);
        }

        let mut remaining = dt;
        while !remaining.is_zero() {
            let step = remaining.min(PROGRESS_QUANTUM);
            remaining -= step;
            let mut events = Vec::new();
            world::apply(&mut self.world, Command::Tick { dt: step }, &mut events);
            self.dispatch(events);
        }

        if self.save_pending {
            self.save();
        }

        let snapshot = query::snapshot(&self.world);
        self.presenter.present(&snapshot);
    }

    /// Ends the current raid at the player's request.
    pub fn surrender(&mut self) {
        self.end(EndReason::Surrender);
    }

    /// Ends any raid in progress and flushes the profile.
    pub fn teardown(&mut self) {
        self.end(EndReason::Teardown);
    }

    /// Captures the picture handed to presentation.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        query::snapshot(&self.world)
    }

    /// Persisted subset of the session state.
    #[must_use]
    pub fn profile(&self) -> ProfileState {
        query::profile(&self.world)
    }

    /// Current phase of the raid.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        query::phase(&self.world)
    }

    /// Player the session runs for.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn end(&mut self, reason: EndReason) {
        self.pending_inputs.clear();
        if query::phase(&self.world) != SessionPhase::Idle {
            let mut events = Vec::new();
            world::apply(&mut self.world, Command::EndSession { reason }, &mut events);
            self.dispatch(events);
            tracing::info!(
                user = %self.identity.user_id,
                ?reason,
                score = query::score(&self.world),
                high_score = query::high_score(&self.world),
                "raid ended"
            );
        }
        self.save();
    }

    fn execute(&mut self, commands: Vec<Command>) {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.dispatch(events);
    }

    /// Routes events to audio and the systems until no system has anything left to say.
    fn dispatch(&mut self, initial: Vec<Event>) {
        let mut events = initial;
        while !events.is_empty() {
            self.observe(&events);

            let phase = query::phase(&self.world);
            let difficulty = query::difficulty(&self.world);
            let mut commands = Vec::new();
            self.movement.handle(&events, difficulty, &mut commands);
            self.difficulty.handle(&events, phase, &mut commands);
            self.spawning.handle(&events, phase, difficulty, &mut commands);

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            if let Some(cue) = AudioCue::for_event(event) {
                self.audio.play(cue);
            }

            match event {
                Event::BossEncounterStarted { wave, hit_points } => {
                    tracing::debug!(wave, hit_points, "boss encounter started");
                }
                Event::BossDefeated {
                    wave,
                    currency,
                    score,
                } => {
                    tracing::debug!(wave, currency, score, "boss defeated");
                    self.save_pending = true;
                }
                Event::BuffActivated { remaining_secs } => {
                    tracing::debug!(remaining_secs, "hunter buff granted");
                }
                Event::BuffExpired => tracing::debug!("hunter buff expired"),
                Event::GameOver {
                    score,
                    high_score,
                    new_high_score,
                } => {
                    tracing::info!(
                        user = %self.identity.user_id,
                        score,
                        high_score,
                        new_high_score,
                        "game over"
                    );
                    self.save_pending = true;
                }
                _ => {}
            }
        }
    }

    fn save(&mut self) {
        self.save_pending = false;
        let stored = StoredProfile::capture(query::profile(&self.world), self.clock.now_unix());
        if let Err(error) = self.store.save_profile(&self.identity.user_id, &stored) {
            tracing::warn!(user = %self.identity.user_id, "failed to save profile: {error}");
        }
    }
}

impl<S, A, P, C> Drop for GameSession<S, A, P, C>
where
    S: ProfileStore,
    A: AudioSink,
    P: Presenter,
    C: Clock,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
