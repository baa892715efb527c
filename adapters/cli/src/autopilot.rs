use std::time::Duration;

use ant_raid_core::{PlayerInput, SessionPhase, SessionSnapshot, SkillId};

/// Crowd size at which the autopilot reaches for its clearing skill.
const CROWD_THRESHOLD: usize = 4;

/// Scripted player that reacts to the field at a fixed cadence.
#[derive(Debug)]
pub(crate) struct Autopilot {
    reaction: Duration,
    waited: Duration,
}

impl Autopilot {
    pub(crate) fn new(reaction: Duration) -> Self {
        Self {
            reaction,
            waited: Duration::ZERO,
        }
    }

    /// Chooses the next input after `dt` has passed, if the bot is ready to act.
    pub(crate) fn next_input(
        &mut self,
        dt: Duration,
        snapshot: &SessionSnapshot,
    ) -> Option<PlayerInput> {
        self.waited = self.waited.saturating_add(dt);
        if self.waited < self.reaction {
            return None;
        }
        self.waited = Duration::ZERO;

        match snapshot.phase {
            SessionPhase::BossEncounter => Some(PlayerInput::BossAttack),
            SessionPhase::Running => {
                let slash_ready = snapshot
                    .skills
                    .iter()
                    .any(|skill| skill.skill == SkillId::ShadowSlash && skill.is_ready());
                if slash_ready && snapshot.enemies.len() >= CROWD_THRESHOLD {
                    return Some(PlayerInput::Skill(SkillId::ShadowSlash));
                }

                snapshot
                    .enemies
                    .iter()
                    .max_by(|a, b| a.progress.total_cmp(&b.progress))
                    .map(|lead| PlayerInput::Direction(lead.direction))
            }
            SessionPhase::Idle | SessionPhase::GameOver => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ant_raid_core::{
        Accuracy, BossSnapshot, DifficultyTuning, Direction, EnemyId, EnemyKind, EnemySnapshot,
        SkillSnapshot,
    };

    fn snapshot(phase: SessionPhase, enemies: Vec<EnemySnapshot>) -> SessionSnapshot {
        SessionSnapshot {
            phase,
            health: 100,
            score: 0,
            high_score: 0,
            wave: 1,
            currency: 0,
            energy: 2,
            accuracy: Accuracy::default(),
            enemies,
            boss: (phase == SessionPhase::BossEncounter).then_some(BossSnapshot {
                hit_points: 120,
                max_hit_points: 120,
            }),
            buff_remaining_secs: 0,
            power_ups: Vec::new(),
            skills: vec![SkillSnapshot {
                skill: SkillId::ShadowSlash,
                ready_in: Duration::ZERO,
            }],
            difficulty: DifficultyTuning::default().initial(),
        }
    }

    fn enemy(id: u32, direction: Direction, progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Basic,
            direction,
            progress,
            hit_points: 1,
        }
    }

    #[test]
    fn waits_for_its_reaction_time() {
        let mut bot = Autopilot::new(Duration::from_millis(200));
        let field = snapshot(SessionPhase::Running, vec![enemy(0, Direction::Up, 0.5)]);

        assert_eq!(bot.next_input(Duration::from_millis(100), &field), None);
        assert_eq!(
            bot.next_input(Duration::from_millis(100), &field),
            Some(PlayerInput::Direction(Direction::Up))
        );
        assert_eq!(bot.next_input(Duration::from_millis(100), &field), None);
    }

    #[test]
    fn strikes_the_lead_ant() {
        let mut bot = Autopilot::new(Duration::ZERO);
        let field = snapshot(
            SessionPhase::Running,
            vec![enemy(0, Direction::Up, 0.2), enemy(1, Direction::Left, 0.6)],
        );
        assert_eq!(
            bot.next_input(Duration::ZERO, &field),
            Some(PlayerInput::Direction(Direction::Left))
        );
    }

    #[test]
    fn slashes_crowds_and_fights_bosses() {
        let mut bot = Autopilot::new(Duration::ZERO);
        let crowd = (0..4).map(|id| enemy(id, Direction::Down, 0.1)).collect();
        assert_eq!(
            bot.next_input(Duration::ZERO, &snapshot(SessionPhase::Running, crowd)),
            Some(PlayerInput::Skill(SkillId::ShadowSlash))
        );
        assert_eq!(
            bot.next_input(
                Duration::ZERO,
                &snapshot(SessionPhase::BossEncounter, Vec::new())
            ),
            Some(PlayerInput::BossAttack)
        );
    }
}
