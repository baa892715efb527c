#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting ant spawn commands.

use std::time::Duration;

use ant_raid_core::{Command, DifficultySnapshot, Direction, EnemyKind, Event, SessionPhase};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits spawn commands while the raid is running.
#[derive(Debug)]
pub struct Spawning {
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the current difficulty to emit spawn commands.
    ///
    /// Each elapsed spawn interval produces `floor(concurrency)` ants plus one
    /// more with probability equal to the fractional part of the concurrency.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: SessionPhase,
        difficulty: DifficultySnapshot,
        out: &mut Vec<Command>,
    ) {
        if phase != SessionPhase::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        let spawn_interval = difficulty.spawn_interval();
        if spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= spawn_interval {
            self.accumulator -= spawn_interval;
            for _ in 0..self.resolve_batch(difficulty.concurrency) {
                let kind = self.roll_kind();
                let direction = self.roll_direction();
                out.push(Command::SpawnEnemy { kind, direction });
            }
        }
    }

    fn resolve_batch(&mut self, concurrency: f32) -> u32 {
        if !concurrency.is_finite() || concurrency <= 0.0 {
            return 0;
        }

        let whole = concurrency.floor();
        let fraction = f64::from(concurrency - whole);
        let extra = fraction > 0.0 && self.rng.gen::<f64>() < fraction;
        whole as u32 + u32::from(extra)
    }

    fn roll_kind(&mut self) -> EnemyKind {
        EnemyKind::from_roll(self.rng.gen::<f64>())
    }

    fn roll_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}
