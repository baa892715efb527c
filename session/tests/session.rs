use std::{cell::RefCell, rc::Rc, time::Duration};

use ant_raid_core::{
    AudioCue, DifficultyTuning, PlayerInput, ProfileState, SessionPhase, SessionSnapshot, SkillId,
    NO_ENERGY_NOTICE,
};
use ant_raid_persistence::{MemoryProfileStore, ProfileStore, StoreError, StoredProfile, UserId};
use ant_raid_session::{
    AudioSink, Clock, GameSession, Identity, Presenter, SessionConfig, SessionError,
};

const DAY: u64 = 86_400;
const NOW: u64 = 20_000 * DAY + 3_600;

#[derive(Clone, Copy, Debug)]
struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, Default)]
struct RecordingAudio(Rc<RefCell<Vec<AudioCue>>>);

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.0.borrow_mut().push(cue);
    }
}

#[derive(Clone, Debug, Default)]
struct CountingPresenter(Rc<RefCell<Vec<SessionSnapshot>>>);

impl Presenter for CountingPresenter {
    fn present(&mut self, snapshot: &SessionSnapshot) {
        self.0.borrow_mut().push(snapshot.clone());
    }
}

struct FailingStore;

impl ProfileStore for FailingStore {
    fn load_profile(&self, _user: &UserId) -> Result<Option<StoredProfile>, StoreError> {
        Err(StoreError::Poisoned)
    }

    fn save_profile(&self, _user: &UserId, _profile: &StoredProfile) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
}

type TestSession<'a> =
    GameSession<&'a MemoryProfileStore, RecordingAudio, CountingPresenter, FixedClock>;

fn identity() -> Identity {
    Identity {
        user_id: UserId::new("tester").unwrap(),
        display_name: "Tester".to_owned(),
    }
}

fn steady_config() -> SessionConfig {
    SessionConfig {
        difficulty: DifficultyTuning {
            initial_advance_ms: 1_000.0,
            min_advance_ms: 1_000.0,
            initial_spawn_interval_ms: 1_000.0,
            min_spawn_interval_ms: 1_000.0,
            escalation_period_ms: 1_000_000,
            concurrency_step: 0.0,
            ..DifficultyTuning::default()
        },
        ..SessionConfig::default()
    }
}

fn session<'a>(
    store: &'a MemoryProfileStore,
    config: SessionConfig,
    now: u64,
) -> (TestSession<'a>, RecordingAudio, CountingPresenter) {
    let audio = RecordingAudio::default();
    let presenter = CountingPresenter::default();
    let session = GameSession::new(
        identity(),
        store,
        audio.clone(),
        presenter.clone(),
        config,
        FixedClock(now),
    );
    (session, audio, presenter)
}

fn stored(store: &MemoryProfileStore) -> StoredProfile {
    store
        .load_profile(&identity().user_id)
        .unwrap()
        .expect("profile saved")
}

fn seed_profile(store: &MemoryProfileStore, profile: ProfileState, saved_at: u64) {
    store
        .save_profile(&identity().user_id, &StoredProfile::capture(profile, saved_at))
        .unwrap();
}

#[test]
fn zero_energy_never_starts() {
    let store = MemoryProfileStore::new();
    seed_profile(
        &store,
        ProfileState {
            energy: 0,
            currency: 12,
            ..ProfileState::default()
        },
        NOW - 10,
    );
    let before = stored(&store);

    let (mut session, audio, _) = session(&store, SessionConfig::default(), NOW);
    let error = session.start().unwrap_err();

    assert_eq!(error, SessionError::NoEnergy);
    assert_eq!(error.to_string(), NO_ENERGY_NOTICE);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(session.profile().energy, 0);
    assert_eq!(stored(&store), before, "rejection must not save");
    assert!(audio.0.borrow().is_empty());
}

#[test]
fn new_utc_day_refills_energy_before_starting() {
    let store = MemoryProfileStore::new();
    seed_profile(
        &store,
        ProfileState {
            energy: 0,
            ..ProfileState::default()
        },
        NOW - DAY,
    );

    let (mut session, _, _) = session(&store, SessionConfig::default(), NOW);
    session.start().unwrap();

    assert_eq!(session.phase(), SessionPhase::Running);
    assert_eq!(stored(&store).profile.energy, 2);
}

#[test]
fn start_spends_energy_and_saves() {
    let store = MemoryProfileStore::new();
    let (mut session, _, _) = session(&store, SessionConfig::default(), NOW);
    session.start().unwrap();

    let saved = stored(&store);
    assert_eq!(saved.profile.energy, 2);
    assert_eq!(saved.saved_at_unix, NOW);
    assert_eq!(session.snapshot().health, 100);
}

#[test]
fn queued_input_resolves_before_the_tick() {
    let store = MemoryProfileStore::new();
    let (mut session, _, _) = session(&store, steady_config(), NOW);
    session.start().unwrap();

    session.advance(Duration::from_millis(1_000));
    assert_eq!(session.snapshot().enemies.len(), 1);
    session.advance(Duration::from_millis(900));

    session.queue_input(PlayerInput::Skill(SkillId::ShadowSlash));
    session.advance(Duration::from_millis(200));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.health, 100, "ant escaped before the skill landed");
    assert_eq!(snapshot.accuracy.misses, 0);
}

#[test]
fn one_long_frame_matches_many_short_frames() {
    let long_store = MemoryProfileStore::new();
    let (mut long, _, _) = session(&long_store, steady_config(), NOW);
    long.start().unwrap();
    long.advance(Duration::from_millis(1_900));

    let short_store = MemoryProfileStore::new();
    let (mut short, _, _) = session(&short_store, steady_config(), NOW);
    short.start().unwrap();
    for _ in 0..38 {
        short.advance(Duration::from_millis(50));
    }

    let snapshot = long.snapshot();
    assert_eq!(snapshot, short.snapshot());
    assert_eq!(snapshot.enemies.len(), 1);
    assert!(
        snapshot.enemies[0].progress > 0.85,
        "ant spawned mid-frame must keep moving, got {}",
        snapshot.enemies[0].progress
    );
}

#[test]
fn unanswered_ant_escapes_without_input() {
    let store = MemoryProfileStore::new();
    let (mut session, audio, _) = session(&store, steady_config(), NOW);
    session.start().unwrap();

    session.advance(Duration::from_millis(1_000));
    session.advance(Duration::from_millis(900));
    session.advance(Duration::from_millis(200));

    let snapshot = session.snapshot();
    assert!(snapshot.health < 100);
    assert_eq!(snapshot.accuracy.misses, 1);
    assert!(audio.0.borrow().contains(&AudioCue::Miss));
}

#[test]
fn game_over_happens_once_and_is_saved() {
    let store = MemoryProfileStore::new();
    let (mut session, audio, presenter) = session(&store, SessionConfig::default(), NOW);
    session.start().unwrap();

    for _ in 0..2_400 {
        session.advance(Duration::from_millis(50));
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::GameOver);
    assert_eq!(snapshot.health, 0);
    let game_overs = audio
        .0
        .borrow()
        .iter()
        .filter(|cue| **cue == AudioCue::GameOver)
        .count();
    assert_eq!(game_overs, 1);
    assert_eq!(presenter.0.borrow().len(), 2_400);

    let saved = stored(&store);
    assert_eq!(saved.profile.health, 0);
    assert_eq!(saved.profile.high_score, snapshot.high_score);
}

#[test]
fn teardown_round_trips_through_the_store() {
    let store = MemoryProfileStore::new();
    let (currency, score) = {
        let (mut session, _, _) = session(&store, steady_config(), NOW);
        session.start().unwrap();
        session.advance(Duration::from_millis(1_000));

        let enemy = session.snapshot().enemies[0];
        for _ in 0..enemy.hit_points {
            session.queue_input(PlayerInput::Tap {
                enemy: enemy.id,
                direction: enemy.direction,
            });
        }
        session.advance(Duration::from_millis(10));
        session.teardown();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.accuracy.hits, enemy.hit_points);
        (snapshot.currency, snapshot.score)
    };
    assert!(currency > 0);

    let saved = stored(&store);
    assert_eq!(saved.profile.currency, currency);
    assert_eq!(saved.profile.high_score, score);
    assert_eq!(saved.profile.energy, 2);

    let (restored, _, _) = session(&store, steady_config(), NOW + 60);
    assert_eq!(restored.profile().currency, currency);
    assert_eq!(restored.profile().high_score, score);
    assert_eq!(restored.profile().energy, 2);
}

#[test]
fn dropping_a_session_flushes_the_profile() {
    let store = MemoryProfileStore::new();
    {
        let (mut session, _, _) = session(&store, steady_config(), NOW);
        session.start().unwrap();
        session.advance(Duration::from_millis(1_000));
        session.queue_input(PlayerInput::Skill(SkillId::ShadowSlash));
        session.advance(Duration::from_millis(10));
    }

    let saved = stored(&store);
    assert_eq!(saved.profile.skill_cooldowns.len(), 1);
    assert!(saved.profile.skill_cooldowns[0].remaining <= SkillId::ShadowSlash.cooldown());
}

#[test]
fn restarting_tears_down_the_previous_raid() {
    let store = MemoryProfileStore::new();
    let (mut session, _, _) = session(&store, steady_config(), NOW);
    session.start().unwrap();
    session.advance(Duration::from_millis(1_000));
    assert_eq!(session.snapshot().enemies.len(), 1);

    session.start().unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Running);
    assert!(snapshot.enemies.is_empty());
    assert_eq!(snapshot.energy, 1);
}

#[test]
fn surrender_returns_to_idle() {
    let store = MemoryProfileStore::new();
    let (mut session, _, _) = session(&store, steady_config(), NOW);
    session.start().unwrap();
    session.surrender();

    assert_eq!(session.phase(), SessionPhase::Idle);
    session.advance(Duration::from_secs(5));
    assert!(session.snapshot().enemies.is_empty());
}

#[test]
fn store_failures_fall_back_to_defaults() {
    let audio = RecordingAudio::default();
    let presenter = CountingPresenter::default();
    let mut session: GameSession<_, _, _, FixedClock> = GameSession::new(
        identity(),
        FailingStore,
        audio,
        presenter,
        SessionConfig::default(),
        FixedClock(NOW),
    );

    session.start().unwrap();
    assert_eq!(session.profile().energy, 2);
    session.teardown();
    assert_eq!(session.phase(), SessionPhase::Idle);
}
