#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that periodically requests a harder raid.

use std::time::Duration;

use ant_raid_core::{Command, Event, SessionPhase};

/// Emits one escalation command per elapsed period while a raid is active.
///
/// Boss encounters keep the clock running, so a long fight can leave the
/// raid noticeably harder once it resumes.
#[derive(Debug)]
pub struct Difficulty {
    period: Duration,
    accumulator: Duration,
}

impl Difficulty {
    /// Creates a difficulty system that escalates every `period`.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and emits escalation commands.
    pub fn handle(&mut self, events: &[Event], phase: SessionPhase, out: &mut Vec<Command>) {
        if !phase.is_active() {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.period.is_zero() {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            out.push(Command::EscalateDifficulty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(millis: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }
    }

    #[test]
    fn escalates_once_per_period() {
        let mut difficulty = Difficulty::new(Duration::from_secs(10));
        let mut out = Vec::new();
        difficulty.handle(&[tick(9_999)], SessionPhase::Running, &mut out);
        assert!(out.is_empty());

        difficulty.handle(&[tick(1)], SessionPhase::Running, &mut out);
        assert_eq!(out, vec![Command::EscalateDifficulty]);
    }

    #[test]
    fn keeps_counting_through_boss_encounters() {
        let mut difficulty = Difficulty::new(Duration::from_secs(10));
        let mut out = Vec::new();
        difficulty.handle(&[tick(6_000)], SessionPhase::Running, &mut out);
        difficulty.handle(&[tick(6_000)], SessionPhase::BossEncounter, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn game_over_resets_the_period() {
        let mut difficulty = Difficulty::new(Duration::from_secs(10));
        let mut out = Vec::new();
        difficulty.handle(&[tick(9_000)], SessionPhase::Running, &mut out);
        difficulty.handle(&[tick(9_000)], SessionPhase::GameOver, &mut out);
        difficulty.handle(&[tick(9_000)], SessionPhase::Running, &mut out);
        assert!(out.is_empty());
    }
}
