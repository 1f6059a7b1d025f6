#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Simon memory game.

mod config;
mod scene;
mod shutdown;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use simon_core::APP_TITLE;
use simon_rendering::{Presentation, RenderingBackend, Scene, BACKGROUND};
use simon_rendering_macroquad::MacroquadBackend;
use simon_savefile::{SaveFile, SaveFormat};
use simon_session::{Config as SessionConfig, Session};
use tracing::{info, Level};

use crate::config::FileConfig;

/// Command-line arguments accepted by the `simon` binary.
#[derive(Debug, Parser)]
#[command(name = "simon")]
#[command(version, about = "Repeat the growing sequence of colored buttons", long_about = None)]
struct CliArgs {
    /// TOML file with input bindings and board settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where the best score is kept.
    #[arg(long, value_name = "PATH", default_value = "simon.sav")]
    save_file: PathBuf,

    /// Store the best score without the bit shift used by current saves.
    #[arg(long)]
    legacy_save_format: bool,

    /// Open a window instead of going fullscreen.
    #[arg(long)]
    windowed: bool,

    /// Master seed for the button sequences.
    #[arg(long)]
    seed: Option<u64>,

    /// Log frame timing once per second; raises the log level to at least info.
    #[arg(long)]
    show_fps: bool,

    /// Most verbose log level to print.
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,

    /// Render as fast as possible instead of waiting for vertical sync.
    #[arg(long)]
    no_vsync: bool,

    /// Ignore controllers and read the keyboard only.
    #[arg(long)]
    no_gamepads: bool,
}

fn setup_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .init();
}

/// Entry point for the Simon command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    let log_level = if args.show_fps {
        args.log_level.max(Level::INFO)
    } else {
        args.log_level
    };
    setup_logging(log_level);

    let file_config = FileConfig::load(args.config.as_deref())?;
    let format = if args.legacy_save_format {
        SaveFormat::Legacy
    } else {
        SaveFormat::Shifted
    };
    let save_file = SaveFile::new(&args.save_file, format);
    let best_score = save_file.load_or(0);

    let master_seed = args.seed.unwrap_or_else(rand::random);
    info!(master_seed, best_score, "starting");

    let mut session = Session::new(
        SessionConfig::new(file_config.input)
            .with_master_seed(master_seed)
            .with_best_score(best_score),
    );

    let mut scene = Scene::new(file_config.board.layout());
    scene.visuals = file_config.board.visuals();
    scene.best_score = best_score;

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .with_fullscreen(!args.windowed)
        .with_gamepads(!args.no_gamepads);

    let mut saved = false;
    backend.run(
        Presentation::new(APP_TITLE, BACKGROUND, scene),
        move |dt, raw, scene| {
            let report = session.step(dt, raw);
            scene::populate(scene, session.world(), dt);
            shutdown::finish_frame(
                report.exit_requested,
                &save_file,
                session.world(),
                &mut saved,
            )
        },
    )
}
