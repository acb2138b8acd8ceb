use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use tar_souls::app::{App, TerminalAudio};
use tar_souls::audio::{AudioManager, Mute};
use tar_souls::config::{Difficulty, DifficultyTable};
use tar_souls::game::Game;
use tar_souls::platform::log_buffer;
use tar_souls::storage::FileStore;

/// Collect souls, rescue the leader and escort them home.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Difficulty profile to play.
    #[arg(short, long, env = "TAR_SOULS_DIFFICULTY", default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// Directory the best times are kept in.
    #[arg(long, env = "TAR_SOULS_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Fixed seed, for reproducible runs.
    #[arg(long, env = "TAR_SOULS_SEED")]
    seed: Option<u64>,

    /// Start with sound and music muted.
    #[arg(long)]
    mute: bool,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "tar_souls=debug")]
    log: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logs = log_buffer::install(&args.log)?;

    let table = DifficultyTable::embedded().context("loading difficulty table")?;
    let profile = table.get(args.difficulty).clone();
    info!(difficulty = %args.difficulty, data_dir = %args.data_dir.display(), seed = ?args.seed, "Starting");

    let mut audio = AudioManager::new(Box::new(TerminalAudio::new()));
    if args.mute {
        audio.set_mute(Mute::all());
    }

    let mut game = Game::new(args.difficulty, profile)
        .with_audio(audio)
        .with_store(Box::new(FileStore::new(&args.data_dir)));
    if let Some(seed) = args.seed {
        game = game.with_seed(seed);
    }

    let mut app = App::new(game, logs).context("taking over the terminal")?;
    app.run().context("running the game loop")?;
    Ok(())
}
