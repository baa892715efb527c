#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that pushes ants toward the nest.
//!
//! Progress is advanced in fixed quanta so that the distance an ant covers
//! only depends on elapsed time and the advance speed in effect, never on how
//! the host happens to slice its frames.

use std::time::Duration;

use ant_raid_core::{Command, DifficultySnapshot, Event, SessionPhase, PROGRESS_QUANTUM};

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug)]
pub struct Movement {
    phase: SessionPhase,
    quantum: Duration,
    accumulator: Duration,
}

impl Movement {
    /// Creates a movement system that advances ants every `quantum`.
    #[must_use]
    pub fn new(quantum: Duration) -> Self {
        Self {
            phase: SessionPhase::Idle,
            quantum,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes world events and the current difficulty to emit movement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        difficulty: DifficultySnapshot,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::PhaseChanged { to, .. } => {
                    self.phase = *to;
                    self.accumulator = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }

        if self.phase != SessionPhase::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.quantum.is_zero() || elapsed.is_zero() {
            return;
        }

        let delta = difficulty.progress_per_quantum();
        self.accumulator = self.accumulator.saturating_add(elapsed);
        while self.accumulator >= self.quantum {
            self.accumulator -= self.quantum;
            out.push(Command::AdvanceEnemies { delta });
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(PROGRESS_QUANTUM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_time_until_a_raid_is_running() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        movement.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(1),
            }],
            ant_raid_core::DifficultyTuning::default().initial(),
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn zero_quantum_never_advances() {
        let mut movement = Movement::new(Duration::ZERO);
        movement.phase = SessionPhase::Running;
        let mut commands = Vec::new();
        movement.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(1),
            }],
            ant_raid_core::DifficultyTuning::default().initial(),
            &mut commands,
        );
        assert!(commands.is_empty());
    }
}
