#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ant Nest Raid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum health a defender can hold.
pub const MAX_HEALTH: u32 = 100;

/// Number of live enemies (and each multiple thereof) that summons a boss.
pub const BOSS_THRESHOLD: usize = 10;

/// Fixed quantum used by the progress simulator to advance enemies.
pub const PROGRESS_QUANTUM: Duration = Duration::from_millis(100);

/// Full duration of the hunter buff once granted.
pub const HUNTER_BUFF_SECS: u32 = 24 * 60 * 60;

/// Energy granted at the start of every day.
pub const DAILY_ENERGY: u32 = 3;

/// Notice shown to players who try to raid without energy.
pub const NO_ENERGY_NOTICE: &str =
    "No energy left! Wait for daily reset or purchase more energy.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads the persisted portion of a player's progress into the world.
    RestoreProfile {
        /// Profile fields captured by the persistence collaborator.
        profile: ProfileState,
    },
    /// Requests that a new raid begins, spending one unit of energy.
    StartSession,
    /// Requests that the running raid stops.
    EndSession {
        /// Why the raid is being stopped.
        reason: EndReason,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Speeds up the approach and spawn cadence by one escalation step.
    EscalateDifficulty,
    /// Requests that a new enemy enters the field.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// Edge the enemy approaches from.
        direction: Direction,
    },
    /// Moves every live enemy closer to the nest.
    AdvanceEnemies {
        /// Normalised progress added to each live enemy.
        delta: f32,
    },
    /// Strikes a specific enemy in the provided direction.
    StrikeEnemy {
        /// Identifier of the enemy being struck.
        enemy: EnemyId,
        /// Direction the player struck toward.
        direction: Direction,
    },
    /// Deals one blow to the active boss.
    AttackBoss,
    /// Activates a player skill.
    UseSkill {
        /// Skill to activate.
        skill: SkillId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a raid started.
    SessionStarted {
        /// Energy left after paying for the raid.
        energy: u32,
    },
    /// Reports that a raid could not start.
    SessionRejected {
        /// Specific reason the start request failed.
        reason: StartRejection,
    },
    /// Announces a transition of the session state machine.
    PhaseChanged {
        /// Phase that was active before the transition.
        from: SessionPhase,
        /// Phase that is active after the transition.
        to: SessionPhase,
    },
    /// Reports the difficulty parameters after an escalation step.
    DifficultyEscalated {
        /// Difficulty parameters now in effect.
        difficulty: DifficultySnapshot,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Kind of the new enemy.
        kind: EnemyKind,
        /// Edge the enemy approaches from.
        direction: Direction,
    },
    /// Confirms that a strike connected with an enemy.
    EnemyHit {
        /// Identifier of the enemy that was hit.
        enemy: EnemyId,
        /// Score gained from the hit.
        points: u64,
        /// Currency gained from the hit.
        currency: u64,
        /// Whether the hit removed the enemy's last hit point.
        killed: bool,
    },
    /// Reports that a strike was aimed in the wrong direction.
    StrikeMissed {
        /// Identifier of the enemy the strike was aimed at.
        enemy: EnemyId,
    },
    /// Reports that an enemy reached the nest.
    EnemyEscaped {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
        /// Health removed from the defender.
        damage: u32,
        /// Health left after applying the damage.
        health: u32,
    },
    /// Confirms that a skill was activated.
    SkillUsed {
        /// Skill that was activated.
        skill: SkillId,
        /// Number of live enemies the skill removed.
        cleared: u32,
    },
    /// Reports that a skill activation was refused because it is cooling down.
    SkillRejected {
        /// Skill that was requested.
        skill: SkillId,
        /// Remaining cooldown before the skill may be used again.
        ready_in: Duration,
    },
    /// Reports that a skill finished its cooldown.
    SkillReady {
        /// Skill that became ready.
        skill: SkillId,
    },
    /// Announces that a boss appeared.
    BossEncounterStarted {
        /// Wave the boss belongs to.
        wave: u32,
        /// Hit points the boss starts with.
        hit_points: u32,
    },
    /// Confirms that the boss took damage.
    BossDamaged {
        /// Damage dealt by the blow.
        damage: u32,
        /// Hit points the boss has left.
        remaining: u32,
    },
    /// Announces that the boss was defeated.
    BossDefeated {
        /// Wave the defeated boss belonged to.
        wave: u32,
        /// Currency granted for the victory.
        currency: u64,
        /// Score granted for the victory.
        score: u64,
    },
    /// Announces that the hunter buff became active.
    BuffActivated {
        /// Seconds the buff lasts.
        remaining_secs: u32,
    },
    /// Announces that the hunter buff ran out.
    BuffExpired,
    /// Announces that a power-up or debuff became active.
    PowerUpActivated {
        /// Modifier that was activated.
        power_up: PowerUp,
        /// Time the modifier stays active.
        duration: Duration,
    },
    /// Announces that a power-up or debuff ran out.
    PowerUpExpired {
        /// Modifier that expired.
        power_up: PowerUp,
    },
    /// Announces that the defender ran out of health.
    GameOver {
        /// Final score of the raid.
        score: u64,
        /// Best score after accounting for this raid.
        high_score: u64,
        /// Whether this raid set a new best score.
        new_high_score: bool,
    },
    /// Confirms that a raid was stopped.
    SessionEnded {
        /// Why the raid stopped.
        reason: EndReason,
        /// Score reached in the raid.
        score: u64,
    },
}

/// Phases of the raid state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No raid is in progress.
    #[default]
    Idle,
    /// Enemies spawn and advance toward the nest.
    Running,
    /// A boss is present; spawning and advancing are suspended.
    BossEncounter,
    /// The defender ran out of health; input is ignored.
    GameOver,
}

impl SessionPhase {
    /// Reports whether the state machine permits moving to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::GameOver, Self::Running)
                | (Self::Running, Self::BossEncounter)
                | (Self::BossEncounter, Self::Running)
                | (Self::Running, Self::GameOver)
                | (Self::Running, Self::Idle)
                | (Self::BossEncounter, Self::Idle)
                | (Self::GameOver, Self::Idle)
        )
    }

    /// Validates a transition and returns the resulting phase.
    pub fn transition(self, next: SessionPhase) -> Result<SessionPhase, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Reports whether a raid is in progress and accepting input.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::BossEncounter)
    }
}

/// Error returned when the raid state machine refuses a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("illegal session transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    /// Phase the transition started from.
    pub from: SessionPhase,
    /// Phase the transition attempted to reach.
    pub to: SessionPhase,
}

/// Reasons a raid may fail to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartRejection {
    /// The player has no energy left for today.
    NoEnergy,
}

/// Reasons a raid may stop before the defender falls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The player gave up.
    Surrender,
    /// The hosting component was torn down.
    Teardown,
}

/// Cardinal directions enemies approach from and players strike toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Approaching from the top edge.
    Up,
    /// Approaching from the bottom edge.
    Down,
    /// Approaching from the left edge.
    Left,
    /// Approaching from the right edge.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Resolves a swipe vector to its dominant axis.
    ///
    /// Screen coordinates are used, so a positive `dy` points down. When both
    /// axes have equal magnitude the vertical axis wins. A swipe without any
    /// displacement resolves to `None`.
    #[must_use]
    pub fn from_swipe(dx: f32, dy: f32) -> Option<Direction> {
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return None;
        }

        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Some(Self::Right)
            } else {
                Some(Self::Left)
            }
        } else if dy > 0.0 {
            Some(Self::Down)
        } else {
            Some(Self::Up)
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of ants that raid the nest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Common worker ant.
    Basic,
    /// Soldier ant that bites harder when it reaches the nest.
    Elite,
    /// Fragile but valuable ant.
    Rare,
    /// Armoured ant that takes three hits.
    Tough,
    /// Heavy ant that takes four hits.
    Brute,
}

impl EnemyKind {
    /// Every kind paired with its spawn weight, in sampling order.
    pub const SPAWN_TABLE: [(EnemyKind, f64); 5] = [
        (Self::Basic, 0.35),
        (Self::Elite, 0.35),
        (Self::Rare, 0.15),
        (Self::Tough, 0.10),
        (Self::Brute, 0.05),
    ];

    /// Selects a kind by walking the cumulative spawn weights.
    ///
    /// `roll` is a uniform sample in `0.0..1.0`. Values beyond the cumulative
    /// total fall back to the first kind.
    #[must_use]
    pub fn from_roll(roll: f64) -> EnemyKind {
        let mut cumulative = 0.0;
        for (kind, weight) in Self::SPAWN_TABLE {
            cumulative += weight;
            if roll <= cumulative {
                return kind;
            }
        }
        Self::SPAWN_TABLE[0].0
    }

    /// Score awarded for each hit on this kind before modifiers.
    #[must_use]
    pub const fn base_points(self) -> u64 {
        match self {
            Self::Basic => 10,
            Self::Elite => 25,
            Self::Rare => 50,
            Self::Tough => 75,
            Self::Brute => 100,
        }
    }

    /// Hits required to kill this kind.
    #[must_use]
    pub const fn hit_points(self) -> u32 {
        match self {
            Self::Basic | Self::Rare => 1,
            Self::Elite => 2,
            Self::Tough => 3,
            Self::Brute => 4,
        }
    }

    /// Health removed from the defender when this kind reaches the nest.
    #[must_use]
    pub const fn escape_damage(self) -> u32 {
        match self {
            Self::Elite => 15,
            _ => 10,
        }
    }
}

/// Player abilities gated by a cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillId {
    /// Slash that kills every ant on the field.
    ShadowSlash,
}

impl SkillId {
    /// Every skill in a stable order.
    pub const ALL: [SkillId; 1] = [Self::ShadowSlash];

    /// Display name of the skill.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ShadowSlash => "Slash",
        }
    }

    /// Time that must pass between activations.
    #[must_use]
    pub const fn cooldown(self) -> Duration {
        match self {
            Self::ShadowSlash => Duration::from_secs(15),
        }
    }
}

/// Short-lived modifiers granted after boss victories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerUp {
    /// Doubles currency earned from hits.
    DoubleElixir,
    /// Debuff that is tracked but has no mechanical effect.
    SmokeScreen,
}

impl PowerUp {
    /// Pool the post-boss effect is drawn from.
    pub const ALL: [PowerUp; 2] = [Self::DoubleElixir, Self::SmokeScreen];

    /// Time the modifier stays active once granted.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::DoubleElixir => Duration::from_secs(10),
            Self::SmokeScreen => Duration::from_secs(5),
        }
    }

    /// Reports whether the modifier benefits the player.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::DoubleElixir)
    }
}

/// Score and currency produced by a single hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitReward {
    /// Score added, rounded up to a whole point.
    pub points: u64,
    /// Currency added.
    pub currency: u64,
}

impl HitReward {
    /// Computes the reward for hitting an enemy worth `base_points`.
    ///
    /// The hunter buff scales points by 1.5; currency is one tenth of the
    /// unrounded points, rounded up, and doubled by [`PowerUp::DoubleElixir`].
    #[must_use]
    pub const fn compute(base_points: u64, buff_active: bool, double_elixir: bool) -> Self {
        let (points, currency) = if buff_active {
            let tripled = base_points * 3;
            ((tripled + 1) / 2, (tripled + 19) / 20)
        } else {
            (base_points, (base_points + 9) / 10)
        };
        let multiplier = if double_elixir { 2 } else { 1 };
        Self {
            points,
            currency: currency * multiplier,
        }
    }
}

/// Hit points of the boss summoned during `wave`.
#[must_use]
pub const fn boss_hit_points(wave: u32) -> u32 {
    100 + wave * 20
}

/// Currency granted for defeating the boss of `wave`.
#[must_use]
pub const fn boss_currency_reward(wave: u32) -> u64 {
    50 + wave as u64 * 25
}

/// Score granted for defeating the boss of `wave`.
#[must_use]
pub const fn boss_score_reward(wave: u32) -> u64 {
    500 + wave as u64 * 100
}

/// Damage dealt to the boss by one blow.
#[must_use]
pub const fn boss_blow_damage(buff_active: bool) -> u32 {
    if buff_active {
        12
    } else {
        10
    }
}

/// Discrete audio cues emitted to the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A strike connected.
    Hit,
    /// A strike missed or an ant reached the nest.
    Miss,
    /// A boss appeared.
    Boss,
    /// A boss was defeated.
    Victory,
    /// The defender fell.
    GameOver,
    /// A skill was activated.
    Skill,
    /// A power-up or debuff was granted.
    PowerUp,
}

impl AudioCue {
    /// Maps a world event to the cue it should trigger, if any.
    #[must_use]
    pub fn for_event(event: &Event) -> Option<AudioCue> {
        match event {
            Event::EnemyHit { .. } => Some(Self::Hit),
            Event::StrikeMissed { .. } | Event::EnemyEscaped { .. } => Some(Self::Miss),
            Event::BossEncounterStarted { .. } => Some(Self::Boss),
            Event::BossDefeated { .. } => Some(Self::Victory),
            Event::GameOver { .. } => Some(Self::GameOver),
            Event::SkillUsed { .. } => Some(Self::Skill),
            Event::PowerUpActivated { .. } => Some(Self::PowerUp),
            _ => None,
        }
    }

    /// Stable name of the cue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Boss => "boss",
            Self::Victory => "victory",
            Self::GameOver => "gameOver",
            Self::Skill => "skill",
            Self::PowerUp => "powerUp",
        }
    }
}

/// Discrete actions delivered by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerInput {
    /// Arrow key or on-screen directional button.
    Direction(Direction),
    /// Touch swipe measured from the centre of the play area.
    Swipe {
        /// Horizontal displacement; positive is right.
        dx: f32,
        /// Vertical displacement; positive is down.
        dy: f32,
    },
    /// Tap on a specific enemy, striking toward `direction`.
    Tap {
        /// Enemy that was tapped.
        enemy: EnemyId,
        /// Direction the tap struck toward.
        direction: Direction,
    },
    /// Dedicated boss attack button.
    BossAttack,
    /// Skill hotkey.
    Skill(SkillId),
}

/// Tuning knobs for the difficulty curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Milliseconds an enemy needs to cross the field at the start of a raid.
    pub initial_advance_ms: f64,
    /// Fastest crossing time the curve may reach.
    pub min_advance_ms: f64,
    /// Milliseconds between spawn waves at the start of a raid.
    pub initial_spawn_interval_ms: f64,
    /// Shortest spawn interval the curve may reach.
    pub min_spawn_interval_ms: f64,
    /// Multiplier applied to both durations on every escalation.
    pub escalation_factor: f64,
    /// Milliseconds of play between escalations.
    pub escalation_period_ms: u64,
    /// Expected number of enemies per spawn wave at the start of a raid.
    pub initial_concurrency: f32,
    /// Amount the concurrency grows on every escalation.
    pub concurrency_step: f32,
    /// Ceiling for the concurrency.
    pub max_concurrency: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            initial_advance_ms: 1_500.0,
            min_advance_ms: 500.0,
            initial_spawn_interval_ms: 800.0,
            min_spawn_interval_ms: 300.0,
            escalation_factor: 0.95,
            escalation_period_ms: 10_000,
            initial_concurrency: 1.0,
            concurrency_step: 0.05,
            max_concurrency: 3.0,
        }
    }
}

impl DifficultyTuning {
    /// Difficulty parameters in effect when a raid starts.
    #[must_use]
    pub fn initial(&self) -> DifficultySnapshot {
        DifficultySnapshot {
            advance_ms: self.initial_advance_ms,
            spawn_interval_ms: self.initial_spawn_interval_ms,
            concurrency: self.initial_concurrency,
        }
    }

    /// Applies one escalation step to `current`.
    #[must_use]
    pub fn escalate(&self, current: DifficultySnapshot) -> DifficultySnapshot {
        DifficultySnapshot {
            advance_ms: (current.advance_ms * self.escalation_factor).max(self.min_advance_ms),
            spawn_interval_ms: (current.spawn_interval_ms * self.escalation_factor)
                .max(self.min_spawn_interval_ms),
            concurrency: (current.concurrency + self.concurrency_step).min(self.max_concurrency),
        }
    }

    /// Time between escalations.
    #[must_use]
    pub const fn escalation_period(&self) -> Duration {
        Duration::from_millis(self.escalation_period_ms)
    }

    /// Checks that every knob is finite and the curve can only get harder.
    pub fn validate(&self) -> Result<(), InvalidTuning> {
        check_duration_pair(
            ("initial_advance_ms", self.initial_advance_ms),
            ("min_advance_ms", self.min_advance_ms),
        )?;
        check_duration_pair(
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
        )?;

        let factor = self.escalation_factor;
        if !factor.is_finite() || factor <= 0.0 || factor > 1.0 {
            return Err(InvalidTuning::new(
                "escalation_factor",
                format!("must lie in (0, 1], got {factor}"),
            ));
        }
        if self.escalation_period_ms == 0 {
            return Err(InvalidTuning::new("escalation_period_ms", "must be positive"));
        }

        for (field, value) in [
            ("initial_concurrency", self.initial_concurrency),
            ("concurrency_step", self.concurrency_step),
            ("max_concurrency", self.max_concurrency),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidTuning::new(
                    field,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }
        if self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(InvalidTuning::new(
                "max_concurrency",
                format!("must not exceed {MAX_CONCURRENCY_LIMIT}"),
            ));
        }
        if self.initial_concurrency > self.max_concurrency {
            return Err(InvalidTuning::new(
                "initial_concurrency",
                "must not exceed max_concurrency",
            ));
        }
        Ok(())
    }
}

/// Longest crossing time or spawn interval a tuning may ask for: one hour.
pub const MAX_TUNING_MS: f64 = 3_600_000.0;

/// Largest batch size a tuning may ask for.
pub const MAX_CONCURRENCY_LIMIT: f32 = 64.0;

fn check_duration_pair(
    (initial_field, initial): (&'static str, f64),
    (min_field, min): (&'static str, f64),
) -> Result<(), InvalidTuning> {
    if !initial.is_finite() || initial <= 0.0 || initial > MAX_TUNING_MS {
        return Err(InvalidTuning::new(
            initial_field,
            format!("must lie in (0, {MAX_TUNING_MS}], got {initial}"),
        ));
    }
    if !min.is_finite() || min <= 0.0 || min > initial {
        return Err(InvalidTuning::new(
            min_field,
            format!("must lie in (0, {initial}], got {min}"),
        ));
    }
    Ok(())
}

/// Error returned when a difficulty tuning cannot drive a raid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid difficulty tuning `{field}`: {reason}")]
pub struct InvalidTuning {
    /// Offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl InvalidTuning {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Difficulty parameters currently in effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultySnapshot {
    /// Milliseconds an enemy needs to cross the field.
    pub advance_ms: f64,
    /// Milliseconds between spawn waves.
    pub spawn_interval_ms: f64,
    /// Expected number of enemies per spawn wave.
    pub concurrency: f32,
}

impl DifficultySnapshot {
    /// Time between spawn waves.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        if self.spawn_interval_ms.is_nan() || self.spawn_interval_ms <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.spawn_interval_ms / 1_000.0).unwrap_or(Duration::MAX)
    }

    /// Normalised progress an enemy covers during one [`PROGRESS_QUANTUM`].
    #[must_use]
    pub fn progress_per_quantum(&self) -> f32 {
        if self.advance_ms <= 0.0 {
            return 1.0;
        }
        (1_000.0 / self.advance_ms * PROGRESS_QUANTUM.as_secs_f64()) as f32
    }
}

/// Hit and miss counters for the current raid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accuracy {
    /// Strikes that connected.
    pub hits: u32,
    /// Wrong-direction strikes plus ants that reached the nest.
    pub misses: u32,
}

impl Accuracy {
    /// Share of hits among all recorded outcomes, in percent.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0;
        }
        ((f64::from(self.hits) / f64::from(total)) * 100.0).round() as u32
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Edge the enemy approaches from.
    pub direction: Direction,
    /// Normalised distance travelled toward the nest.
    pub progress: f32,
    /// Hits the enemy can still absorb.
    pub hit_points: u32,
}

/// Read-only snapshot describing every live enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of the active boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossSnapshot {
    /// Hit points the boss has left.
    pub hit_points: u32,
    /// Hit points the boss started with.
    pub max_hit_points: u32,
}

/// Read-only readiness of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillSnapshot {
    /// Skill being described.
    pub skill: SkillId,
    /// Remaining cooldown; zero when the skill is ready.
    pub ready_in: Duration,
}

impl SkillSnapshot {
    /// Reports whether the skill may be activated.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_in.is_zero()
    }
}

/// Read-only state of an active power-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUpSnapshot {
    /// Modifier being described.
    pub power_up: PowerUp,
    /// Time left before it expires.
    pub remaining: Duration,
}

/// Complete read-only picture handed to the presentation collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Current state machine phase.
    pub phase: SessionPhase,
    /// Defender health.
    pub health: u32,
    /// Score of the current raid.
    pub score: u64,
    /// Best score ever recorded.
    pub high_score: u64,
    /// Current wave.
    pub wave: u32,
    /// Currency balance.
    pub currency: u64,
    /// Energy left for today.
    pub energy: u32,
    /// Hit and miss counters.
    pub accuracy: Accuracy,
    /// Live enemies in spawn order.
    pub enemies: Vec<EnemySnapshot>,
    /// Active boss, if any.
    pub boss: Option<BossSnapshot>,
    /// Seconds of hunter buff left; zero when inactive.
    pub buff_remaining_secs: u32,
    /// Active power-ups and debuffs.
    pub power_ups: Vec<PowerUpSnapshot>,
    /// Readiness of every skill.
    pub skills: Vec<SkillSnapshot>,
    /// Difficulty parameters in effect.
    pub difficulty: DifficultySnapshot,
}

/// Hunter buff state carried between raids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffState {
    /// Seconds of buff left; zero when inactive.
    pub remaining_secs: u32,
}

impl BuffState {
    /// Reports whether the buff is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.remaining_secs > 0
    }
}

/// Remaining cooldown of a skill carried between raids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCooldown {
    /// Skill being described.
    pub skill: SkillId,
    /// Time left before the skill is ready.
    pub remaining: Duration,
}

/// Portion of the session state owned by the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileState {
    /// Defender health.
    pub health: u32,
    /// Currency balance.
    pub currency: u64,
    /// Energy left for today.
    pub energy: u32,
    /// Best score ever recorded.
    pub high_score: u64,
    /// Hunter buff state.
    pub buff: BuffState,
    /// Skills still cooling down.
    pub skill_cooldowns: Vec<SkillCooldown>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            currency: 0,
            energy: DAILY_ENERGY,
            high_score: 0,
            buff: BuffState::default(),
            skill_cooldowns: Vec::new(),
        }
    }
}
