#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Ant Nest Raid headlessly.
//!
//! An autopilot stands in for the player so the full raid loop (spawning,
//! bosses, rewards, persistence) can be exercised from a terminal.

mod autopilot;

use std::{path::PathBuf, time::Duration};

use ant_raid_core::{AudioCue, SessionPhase, SessionSnapshot};
use ant_raid_persistence::{JsonFileProfileStore, UserId};
use ant_raid_session::{AudioSink, GameSession, Identity, Presenter, SessionConfig, SystemClock};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use self::autopilot::Autopilot;

const FRAME: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "ant-raid")]
#[command(about = "Plays an Ant Nest Raid with a scripted defender")]
struct Cli {
    /// Player whose profile is loaded and saved
    #[arg(long, default_value = "player")]
    user: String,
    /// Directory holding one JSON profile per player
    #[arg(long, default_value = "raid-data")]
    data_dir: PathBuf,
    /// TOML session configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Longest raid to simulate, in seconds
    #[arg(long, default_value_t = 60)]
    seconds: u64,
    /// Overrides the configured RNG seed
    #[arg(long)]
    seed: Option<u64>,
    /// Delay between autopilot actions, in milliseconds
    #[arg(long, default_value_t = 250)]
    reaction_ms: u64,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct RaidSummary {
    user: String,
    phase: String,
    score: u64,
    high_score: u64,
    wave: u32,
    health: u32,
    currency: u64,
    energy: u32,
    accuracy_percent: u32,
    buff_remaining_secs: u32,
}

impl RaidSummary {
    fn new(user: &UserId, snapshot: &SessionSnapshot) -> Self {
        Self {
            user: user.to_string(),
            phase: format!("{:?}", snapshot.phase),
            score: snapshot.score,
            high_score: snapshot.high_score,
            wave: snapshot.wave,
            health: snapshot.health,
            currency: snapshot.currency,
            energy: snapshot.energy,
            accuracy_percent: snapshot.accuracy.percentage(),
            buff_remaining_secs: snapshot.buff_remaining_secs,
        }
    }
}

#[derive(Debug, Default)]
struct TracingAudio;

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: AudioCue) {
        tracing::trace!(cue = cue.name(), "audio cue");
    }
}

/// Logs wave and health changes instead of drawing them.
#[derive(Debug, Default)]
struct LogPresenter {
    wave: u32,
    health: u32,
}

impl Presenter for LogPresenter {
    fn present(&mut self, snapshot: &SessionSnapshot) {
        if snapshot.wave != self.wave {
            self.wave = snapshot.wave;
            tracing::info!(wave = snapshot.wave, score = snapshot.score, "wave reached");
        }
        if snapshot.health != self.health {
            self.health = snapshot.health;
            tracing::debug!(health = snapshot.health, "health changed");
        }
    }
}

/// Entry point for the Ant Nest Raid command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }

    let user_id = UserId::new(cli.user.as_str()).context("invalid --user")?;
    let store = JsonFileProfileStore::open(&cli.data_dir)
        .with_context(|| format!("failed to open data dir {}", cli.data_dir.display()))?;
    let identity = Identity {
        user_id: user_id.clone(),
        display_name: cli.user.clone(),
    };

    let mut session = GameSession::new(
        identity,
        store,
        TracingAudio,
        LogPresenter::default(),
        config,
        SystemClock,
    );

    if let Err(error) = session.start() {
        println!("{error}");
        return Ok(());
    }

    let mut autopilot = Autopilot::new(Duration::from_millis(cli.reaction_ms));
    let frames = cli.seconds.saturating_mul(1_000) / FRAME.as_millis() as u64;
    for _ in 0..frames {
        if let Some(input) = autopilot.next_input(FRAME, &session.snapshot()) {
            session.queue_input(input);
        }
        session.advance(FRAME);
        if session.phase() == SessionPhase::GameOver {
            break;
        }
    }

    session.teardown();
    let summary = RaidSummary::new(&user_id, &session.snapshot());
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    } else {
        println!(
            "{} finished wave {} with {} points (best {}), {} elixirs, {}% accuracy, {} energy left",
            summary.user,
            summary.wave,
            summary.score,
            summary.high_score,
            summary.currency,
            summary.accuracy_percent,
            summary.energy,
        );
    }
    Ok(())
}
