//! Galactic Game headless runner
//!
//! Ticks the simulation on its own thread while the main thread stands in
//! for the presentation side: it waits for redraw requests and pulls a
//! depth-ordered snapshot each time.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use galactic_game::consts::{GAME_NAME, GAME_VERSION};
use galactic_game::sim::input::keys;
use galactic_game::sim::kinds::PLAYER;
use galactic_game::sim::{
    ChannelPresenter, EntityRegistry, JsonLevelDir, Level, LevelSource, MemoryLevels, Scheduler, Session, World,
};
use galactic_game::{Game, Profiles, Settings, window_title};

/// Galactic Game simulation runner
#[derive(Parser)]
#[command(version, about = "Runs the Galactic Game simulation headless")]
struct Cli {
    /// Settings file; defaults are used when it is missing
    #[arg(long, value_name = "PATH", default_value = "settings.json")]
    settings: PathBuf,

    /// Directory of level<N>.json files (built-in demo level otherwise)
    #[arg(long, value_name = "DIR")]
    levels: Option<PathBuf>,

    /// Profile to record progress under
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Hold the move-right key for the whole run
    #[arg(long)]
    autoplay: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.settings);
    if let Some(dir) = cli.levels {
        settings.levels_dir = Some(dir);
    }
    if let Some(name) = cli.profile {
        settings.profile_name = name;
    }

    log::info!("{}", window_title());

    let (presenter, redraws) = ChannelPresenter::new();
    let world = Arc::new(
        World::new(EntityRegistry::with_default_kinds(), Box::new(presenter)).with_keyboard(settings.keyboard()),
    );

    let levels: Box<dyn LevelSource> = match settings.levels_dir.as_ref() {
        Some(dir) => Box::new(JsonLevelDir::new(dir)),
        None => Box::new(MemoryLevels::new(vec![Level::demo()])),
    };
    let profiles = Profiles::load(&settings.profiles_path).unwrap_or_else(|e| {
        log::error!("Could not read profiles, progress will not be saved: {}", e);
        Profiles::in_memory()
    });

    let session = Session::new(levels, profiles, settings.profile_name.clone());
    let mut game = Game::new(Arc::clone(&world), session);
    if let Err(e) = game.start(settings.start_level) {
        log::error!("Could not load level {}: {}", settings.start_level, e);
        std::process::exit(1);
    }

    let scheduler = Scheduler::new(settings.tick_rate);
    let handle = match scheduler.spawn(game) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Could not start the ticking thread: {}", e);
            std::process::exit(1);
        }
    };

    if cli.autoplay {
        log::info!("Autoplay: holding move right");
        world.key_pressed(keys::RIGHT);
    }

    let wait = scheduler.interval() * 4;
    while handle.is_running() && world.tick_count() < cli.ticks {
        match redraws.recv_timeout(wait) {
            Ok(()) => present(&world),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        for notice in world.take_notices() {
            log::warn!("{}", notice);
        }
    }

    let clean = handle.join();
    log::info!("Stopped after {} ticks", world.tick_count());
    if !clean {
        log::error!("{} {} shut down after a fault", GAME_NAME, GAME_VERSION);
        std::process::exit(1);
    }
}

fn present(world: &World) {
    if !world.draws_level() {
        log::trace!("Overlay {:?} hides the level", world.overlay_name());
        return;
    }
    let items = world.snapshot();
    log::trace!("Redraw: {} items", items.len());
    if world.tick_count() % 30 == 0 {
        if let Some(player) = items.iter().find(|item| item.kind == PLAYER) {
            log::debug!("Player at ({:.1}, {:.1})", player.pos.x, player.pos.y);
        }
    }
}
