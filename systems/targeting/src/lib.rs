#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves player input into deterministic strike commands.

use ant_raid_core::{Command, Direction, EnemyId, EnemyView, PlayerInput, SessionPhase};

/// Input resolution system that reuses a scratch buffer between calls.
#[derive(Debug, Default)]
pub struct Targeting {
    candidates: Vec<Candidate>,
}

impl Targeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a single player input against the current enemy view.
    ///
    /// Directional input strikes the lane's most advanced ant while the raid
    /// is running. During an encounter every strike lands on the boss. Input
    /// that matches nothing produces no command.
    pub fn handle(
        &mut self,
        input: PlayerInput,
        phase: SessionPhase,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        match input {
            PlayerInput::Direction(direction) => {
                self.resolve_direction(direction, phase, enemies, out);
            }
            PlayerInput::Swipe { dx, dy } => {
                if let Some(direction) = Direction::from_swipe(dx, dy) {
                    self.resolve_direction(direction, phase, enemies, out);
                }
            }
            PlayerInput::Tap { enemy, direction } => match phase {
                SessionPhase::Running => out.push(Command::StrikeEnemy { enemy, direction }),
                SessionPhase::BossEncounter => out.push(Command::AttackBoss),
                SessionPhase::Idle | SessionPhase::GameOver => {}
            },
            PlayerInput::BossAttack => {
                if phase == SessionPhase::BossEncounter {
                    out.push(Command::AttackBoss);
                }
            }
            PlayerInput::Skill(skill) => {
                if phase.is_active() {
                    out.push(Command::UseSkill { skill });
                }
            }
        }
    }

    fn resolve_direction(
        &mut self,
        direction: Direction,
        phase: SessionPhase,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        match phase {
            SessionPhase::BossEncounter => out.push(Command::AttackBoss),
            SessionPhase::Running => {
                if let Some(enemy) = self.select(direction, enemies) {
                    out.push(Command::StrikeEnemy { enemy, direction });
                }
            }
            SessionPhase::Idle | SessionPhase::GameOver => {}
        }
    }

    fn select(&mut self, direction: Direction, enemies: &EnemyView) -> Option<EnemyId> {
        self.candidates.clear();
        self.candidates.extend(
            enemies
                .iter()
                .filter(|snapshot| snapshot.direction == direction)
                .map(|snapshot| Candidate {
                    id: snapshot.id,
                    progress: snapshot.progress,
                }),
        );

        let mut best: Option<Candidate> = None;
        for candidate in &self.candidates {
            match &mut best {
                Some(existing) => {
                    if candidate.precedes(existing) {
                        *existing = *candidate;
                    }
                }
                None => best = Some(*candidate),
            }
        }
        best.map(|candidate| candidate.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    progress: f32,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        self.id < other.id
    }
}
