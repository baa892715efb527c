#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative raid state management for Ant Nest Raid.
//!
//! Every mutation flows through [`apply`], which runs each command to
//! completion before the next one is considered. Timers that the game needs
//! (skill cooldowns, power-up expiry, the hunter buff countdown) are stored as
//! deadlines on the session clock and swept whenever a `Tick` arrives.

use std::time::Duration;

use ant_raid_core::{
    boss_blow_damage, boss_currency_reward, boss_hit_points, boss_score_reward, Accuracy,
    Command, DifficultySnapshot, DifficultyTuning, Direction, EndReason, EnemyId, EnemyKind,
    Event, HitReward, PowerUp, ProfileState, SessionPhase, SkillId, StartRejection,
    BOSS_THRESHOLD, HUNTER_BUFF_SECS, MAX_HEALTH,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BUFF_STEP: Duration = Duration::from_secs(1);
const DEFAULT_RNG_SEED: u64 = 0x5eed_a27b_0c4f_1d93;
const DEFAULT_BUFF_GRANT_CHANCE: f64 = 0.25;

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Difficulty curve applied to every raid.
    pub difficulty: DifficultyTuning,
    /// Probability that a boss victory grants the hunter buff.
    pub buff_grant_chance: f64,
    /// Seed for the rolls made by the world (buff grants, power-up picks).
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DifficultyTuning::default(),
            buff_grant_chance: DEFAULT_BUFF_GRANT_CHANCE,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

/// Represents the authoritative Ant Nest Raid session state.
#[derive(Debug)]
pub struct World {
    config: Config,
    phase: SessionPhase,
    clock: Duration,
    health: u32,
    score: u64,
    high_score: u64,
    wave: u32,
    currency: u64,
    energy: u32,
    accuracy: Accuracy,
    difficulty: DifficultySnapshot,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    boss: Option<Boss>,
    buff: HunterBuff,
    skills: Vec<Skill>,
    power_ups: Vec<ActivePowerUp>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new world using the supplied configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let profile = ProfileState::default();
        Self {
            phase: SessionPhase::Idle,
            clock: Duration::ZERO,
            health: profile.health,
            score: 0,
            high_score: profile.high_score,
            wave: 1,
            currency: profile.currency,
            energy: profile.energy,
            accuracy: Accuracy::default(),
            difficulty: config.difficulty.initial(),
            enemies: Vec::new(),
            next_enemy_id: 0,
            boss: None,
            buff: HunterBuff::default(),
            skills: SkillId::ALL.iter().map(|&id| Skill::ready(id)).collect(),
            power_ups: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
        }
    }

    fn transition(&mut self, next: SessionPhase, out_events: &mut Vec<Event>) -> bool {
        match self.phase.transition(next) {
            Ok(phase) => {
                out_events.push(Event::PhaseChanged {
                    from: self.phase,
                    to: phase,
                });
                self.phase = phase;
                true
            }
            Err(_) => false,
        }
    }

    fn restore_profile(&mut self, profile: ProfileState) {
        if self.phase.is_active() {
            return;
        }

        self.health = profile.health.min(MAX_HEALTH);
        self.currency = profile.currency;
        self.energy = profile.energy;
        self.high_score = profile.high_score;
        self.buff = HunterBuff {
            remaining_secs: profile.buff.remaining_secs.min(HUNTER_BUFF_SECS),
            carry: Duration::ZERO,
        };
        let clock = self.clock;
        for skill in &mut self.skills {
            let id = skill.id;
            skill.ready_at = profile
                .skill_cooldowns
                .iter()
                .find(|cooldown| cooldown.skill == id && !cooldown.remaining.is_zero())
                .map(|cooldown| clock + cooldown.remaining.min(id.cooldown()));
        }
    }

    fn start_session(&mut self, out_events: &mut Vec<Event>) {
        if self.phase.is_active() {
            return;
        }

        if self.energy == 0 {
            out_events.push(Event::SessionRejected {
                reason: StartRejection::NoEnergy,
            });
            return;
        }

        self.energy -= 1;
        self.health = MAX_HEALTH;
        self.score = 0;
        self.wave = 1;
        self.accuracy = Accuracy::default();
        self.difficulty = self.config.difficulty.initial();
        self.enemies.clear();
        self.boss = None;
        self.power_ups.clear();

        if self.transition(SessionPhase::Running, out_events) {
            out_events.push(Event::SessionStarted {
                energy: self.energy,
            });
        }
    }

    fn end_session(&mut self, reason: EndReason, out_events: &mut Vec<Event>) {
        if self.phase == SessionPhase::Idle {
            return;
        }

        let _ = self.record_high_score();
        self.enemies.clear();
        self.boss = None;
        self.power_ups.clear();
        if self.transition(SessionPhase::Idle, out_events) {
            out_events.push(Event::SessionEnded {
                reason,
                score: self.score,
            });
        }
    }

    fn record_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let clock = self.clock;
        for skill in &mut self.skills {
            if skill.ready_at.is_some_and(|ready_at| clock >= ready_at) {
                skill.ready_at = None;
                out_events.push(Event::SkillReady { skill: skill.id });
            }
        }

        let mut index = 0;
        while index < self.power_ups.len() {
            if self.power_ups[index].expires_at <= clock {
                let expired = self.power_ups.remove(index);
                out_events.push(Event::PowerUpExpired {
                    power_up: expired.power_up,
                });
            } else {
                index += 1;
            }
        }

        if self.buff.advance(dt) {
            out_events.push(Event::BuffExpired);
        }
    }

    fn escalate_difficulty(&mut self, out_events: &mut Vec<Event>) {
        if !self.phase.is_active() {
            return;
        }

        self.difficulty = self.config.difficulty.escalate(self.difficulty);
        out_events.push(Event::DifficultyEscalated {
            difficulty: self.difficulty,
        });
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, direction: Direction, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::Running {
            return;
        }

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        self.enemies.push(Enemy::spawn(id, kind, direction));
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            direction,
        });

        let alive = self.enemies.iter().filter(|enemy| enemy.alive).count();
        if alive > 0 && alive % BOSS_THRESHOLD == 0 {
            self.begin_boss_encounter(out_events);
        }
    }

    fn begin_boss_encounter(&mut self, out_events: &mut Vec<Event>) {
        if !self.transition(SessionPhase::BossEncounter, out_events) {
            return;
        }

        self.enemies.clear();
        let hit_points = boss_hit_points(self.wave);
        self.boss = Some(Boss {
            hit_points,
            max_hit_points: hit_points,
        });
        out_events.push(Event::BossEncounterStarted {
            wave: self.wave,
            hit_points,
        });
    }

    fn advance_enemies(&mut self, delta: f32, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::Running || !delta.is_finite() || delta <= 0.0 {
            return;
        }

        for index in 0..self.enemies.len() {
            let enemy = &mut self.enemies[index];
            if !enemy.alive {
                continue;
            }

            enemy.progress += delta;
            if enemy.progress < 1.0 {
                continue;
            }

            enemy.alive = false;
            let id = enemy.id;
            let damage = enemy.kind.escape_damage();
            self.health = self.health.saturating_sub(damage);
            self.accuracy.misses += 1;
            out_events.push(Event::EnemyEscaped {
                enemy: id,
                damage,
                health: self.health,
            });

            if self.health == 0 {
                self.enter_game_over(out_events);
                break;
            }
        }

        self.prune_dead();
    }

    fn enter_game_over(&mut self, out_events: &mut Vec<Event>) {
        if !self.transition(SessionPhase::GameOver, out_events) {
            return;
        }

        let new_high_score = self.record_high_score();
        out_events.push(Event::GameOver {
            score: self.score,
            high_score: self.high_score,
            new_high_score,
        });
    }

    fn strike_enemy(&mut self, id: EnemyId, direction: Direction, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::Running {
            return;
        }

        let buff_active = self.buff.is_active();
        let double_elixir = self.power_up_active(PowerUp::DoubleElixir);
        let Some(enemy) = self
            .enemies
            .iter_mut()
            .find(|enemy| enemy.id == id && enemy.alive)
        else {
            return;
        };

        if enemy.direction != direction {
            self.accuracy.misses += 1;
            out_events.push(Event::StrikeMissed { enemy: id });
            return;
        }

        let reward = HitReward::compute(enemy.kind.base_points(), buff_active, double_elixir);
        enemy.hit_points = enemy.hit_points.saturating_sub(1);
        let killed = enemy.hit_points == 0;
        if killed {
            enemy.alive = false;
        }

        self.accuracy.hits += 1;
        self.score = self.score.saturating_add(reward.points);
        self.currency = self.currency.saturating_add(reward.currency);
        out_events.push(Event::EnemyHit {
            enemy: id,
            points: reward.points,
            currency: reward.currency,
            killed,
        });

        self.prune_dead();
    }

    fn attack_boss(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::BossEncounter {
            return;
        }

        let damage = boss_blow_damage(self.buff.is_active());
        let Some(boss) = self.boss.as_mut() else {
            return;
        };

        boss.hit_points = boss.hit_points.saturating_sub(damage);
        let remaining = boss.hit_points;
        out_events.push(Event::BossDamaged { damage, remaining });

        if remaining == 0 {
            self.defeat_boss(out_events);
        }
    }

    fn defeat_boss(&mut self, out_events: &mut Vec<Event>) {
        let wave = self.wave;
        let currency = boss_currency_reward(wave);
        let score = boss_score_reward(wave);
        self.currency = self.currency.saturating_add(currency);
        self.score = self.score.saturating_add(score);
        out_events.push(Event::BossDefeated {
            wave,
            currency,
            score,
        });

        if self.rng.gen::<f64>() < self.config.buff_grant_chance {
            self.buff.activate();
            out_events.push(Event::BuffActivated {
                remaining_secs: self.buff.remaining_secs,
            });
        }

        self.wave = self.wave.saturating_add(1);
        self.boss = None;
        if !self.transition(SessionPhase::Running, out_events) {
            return;
        }

        let power_up = PowerUp::ALL[self.rng.gen_range(0..PowerUp::ALL.len())];
        self.activate_power_up(power_up, out_events);
    }

    fn activate_power_up(&mut self, power_up: PowerUp, out_events: &mut Vec<Event>) {
        let expires_at = self.clock + power_up.duration();
        match self
            .power_ups
            .iter_mut()
            .find(|active| active.power_up == power_up)
        {
            Some(active) => active.expires_at = expires_at,
            None => self.power_ups.push(ActivePowerUp {
                power_up,
                expires_at,
            }),
        }
        out_events.push(Event::PowerUpActivated {
            power_up,
            duration: power_up.duration(),
        });
    }

    fn use_skill(&mut self, id: SkillId, out_events: &mut Vec<Event>) {
        if !self.phase.is_active() {
            return;
        }

        let clock = self.clock;
        let Some(skill) = self.skills.iter_mut().find(|skill| skill.id == id) else {
            return;
        };

        let ready_in = skill.ready_in(clock);
        if !ready_in.is_zero() {
            out_events.push(Event::SkillRejected {
                skill: id,
                ready_in,
            });
            return;
        }

        skill.ready_at = Some(clock + id.cooldown());

        let mut cleared = 0;
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.alive) {
            enemy.alive = false;
            cleared += 1;
        }
        self.prune_dead();

        out_events.push(Event::SkillUsed { skill: id, cleared });
    }

    fn power_up_active(&self, power_up: PowerUp) -> bool {
        self.power_ups
            .iter()
            .any(|active| active.power_up == power_up && active.expires_at > self.clock)
    }

    fn prune_dead(&mut self) {
        self.enemies.retain(|enemy| enemy.alive);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RestoreProfile { profile } => world.restore_profile(profile),
        Command::StartSession => world.start_session(out_events),
        Command::EndSession { reason } => world.end_session(reason, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::EscalateDifficulty => world.escalate_difficulty(out_events),
        Command::SpawnEnemy { kind, direction } => world.spawn_enemy(kind, direction, out_events),
        Command::AdvanceEnemies { delta } => world.advance_enemies(delta, out_events),
        Command::StrikeEnemy { enemy, direction } => {
            world.strike_enemy(enemy, direction, out_events)
        }
        Command::AttackBoss => world.attack_boss(out_events),
        Command::UseSkill { skill } => world.use_skill(skill, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use ant_raid_core::{
        Accuracy, BossSnapshot, BuffState, DifficultySnapshot, EnemySnapshot, EnemyView,
        PowerUp, PowerUpSnapshot, ProfileState, SessionPhase, SessionSnapshot, SkillCooldown,
        SkillSnapshot,
    };

    use super::World;

    /// Current phase of the raid state machine.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Time elapsed on the session clock.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Difficulty parameters in effect.
    #[must_use]
    pub fn difficulty(world: &World) -> DifficultySnapshot {
        world.difficulty
    }

    /// Score of the current raid.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Best score recorded.
    #[must_use]
    pub fn high_score(world: &World) -> u64 {
        world.high_score
    }

    /// Defender health.
    #[must_use]
    pub fn health(world: &World) -> u32 {
        world.health
    }

    /// Current wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Currency balance.
    #[must_use]
    pub fn currency(world: &World) -> u64 {
        world.currency
    }

    /// Energy left for today.
    #[must_use]
    pub fn energy(world: &World) -> u32 {
        world.energy
    }

    /// Hit and miss counters for the current raid.
    #[must_use]
    pub fn accuracy(world: &World) -> Accuracy {
        world.accuracy
    }

    /// Seconds of hunter buff left.
    #[must_use]
    pub fn buff_remaining_secs(world: &World) -> u32 {
        world.buff.remaining_secs
    }

    /// Reports whether the provided power-up is active.
    #[must_use]
    pub fn power_up_active(world: &World, power_up: PowerUp) -> bool {
        world.power_up_active(power_up)
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.alive)
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    kind: enemy.kind,
                    direction: enemy.direction,
                    progress: enemy.progress,
                    hit_points: enemy.hit_points,
                })
                .collect(),
        )
    }

    /// Captures the active boss, if any.
    #[must_use]
    pub fn boss(world: &World) -> Option<BossSnapshot> {
        world.boss.map(|boss| BossSnapshot {
            hit_points: boss.hit_points,
            max_hit_points: boss.max_hit_points,
        })
    }

    /// Readiness of every skill.
    #[must_use]
    pub fn skills(world: &World) -> Vec<SkillSnapshot> {
        world
            .skills
            .iter()
            .map(|skill| SkillSnapshot {
                skill: skill.id,
                ready_in: skill.ready_in(world.clock),
            })
            .collect()
    }

    /// Captures the persisted subset of the session state.
    #[must_use]
    pub fn profile(world: &World) -> ProfileState {
        ProfileState {
            health: world.health,
            currency: world.currency,
            energy: world.energy,
            high_score: world.high_score.max(world.score),
            buff: BuffState {
                remaining_secs: world.buff.remaining_secs,
            },
            skill_cooldowns: world
                .skills
                .iter()
                .filter_map(|skill| {
                    let remaining = skill.ready_in(world.clock);
                    (!remaining.is_zero()).then_some(SkillCooldown {
                        skill: skill.id,
                        remaining,
                    })
                })
                .collect(),
        }
    }

    /// Captures the complete picture handed to presentation.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            phase: world.phase,
            health: world.health,
            score: world.score,
            high_score: world.high_score,
            wave: world.wave,
            currency: world.currency,
            energy: world.energy,
            accuracy: world.accuracy,
            enemies: enemy_view(world).into_vec(),
            boss: boss(world),
            buff_remaining_secs: world.buff.remaining_secs,
            power_ups: world
                .power_ups
                .iter()
                .filter(|active| active.expires_at > world.clock)
                .map(|active| PowerUpSnapshot {
                    power_up: active.power_up,
                    remaining: active.expires_at - world.clock,
                })
                .collect(),
            skills: skills(world),
            difficulty: world.difficulty,
        }
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    direction: Direction,
    progress: f32,
    hit_points: u32,
    alive: bool,
}

impl Enemy {
    fn spawn(id: EnemyId, kind: EnemyKind, direction: Direction) -> Self {
        Self {
            id,
            kind,
            direction,
            progress: 0.0,
            hit_points: kind.hit_points(),
            alive: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Boss {
    hit_points: u32,
    max_hit_points: u32,
}

#[derive(Clone, Copy, Debug)]
struct Skill {
    id: SkillId,
    ready_at: Option<Duration>,
}

impl Skill {
    fn ready(id: SkillId) -> Self {
        Self { id, ready_at: None }
    }

    fn ready_in(&self, clock: Duration) -> Duration {
        self.ready_at
            .map_or(Duration::ZERO, |ready_at| ready_at.saturating_sub(clock))
    }
}

#[derive(Clone, Copy, Debug)]
struct ActivePowerUp {
    power_up: PowerUp,
    expires_at: Duration,
}

#[derive(Clone, Copy, Debug, Default)]
struct HunterBuff {
    remaining_secs: u32,
    carry: Duration,
}

impl HunterBuff {
    fn is_active(&self) -> bool {
        self.remaining_secs > 0
    }

    fn activate(&mut self) {
        self.remaining_secs = HUNTER_BUFF_SECS;
        self.carry = Duration::ZERO;
    }

    /// Counts the buff down in whole seconds, reporting when it runs out.
    fn advance(&mut self, dt: Duration) -> bool {
        if !self.is_active() {
            self.carry = Duration::ZERO;
            return false;
        }

        self.carry = self.carry.saturating_add(dt);
        while self.carry >= BUFF_STEP && self.remaining_secs > 0 {
            self.carry -= BUFF_STEP;
            self.remaining_secs -= 1;
        }

        if self.remaining_secs == 0 {
            self.carry = Duration::ZERO;
            return true;
        }
        false
    }
}
