//! ChitraMap - headless occupancy grid playback
//!
//! ```bash
//! chitra-map info maps/office.gd
//! chitra-map --config configs/default.toml play logs/run1.cd --speed 8 --snapshot run1.ppm
//! chitra-map play logs/new_session.cd < records.txt       # live, records to the file
//! chitra-map connect 192.168.1.20 5600 --steps 500
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use clap::{Args, Parser, Subcommand};
use crossbeam_channel::{Receiver, unbounded};

use chitra_map::config::ViewerConfig;
use chitra_map::engine::UpdateEngine;
use chitra_map::error::{Error, Result};
use chitra_map::playback::{MapView, PlaybackSpeed, Player, ViewMode};
use chitra_map::source::{ChannelDevice, CommentedLines, LiveFeed};
use chitra_map::viewport::Viewport;

#[derive(Parser)]
#[command(name = "chitra-map")]
#[command(about = "Occupancy grid playback, inspection and export")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a data file, apply every reading and print grid statistics
    Info {
        /// `.gd`, `.cd` or `.sd` file
        file: PathBuf,
    },

    /// Play back a data file on a timer
    Play {
        /// `.gd` or `.cd` file; a missing `.cd` starts a live session fed from stdin
        file: PathBuf,

        #[command(flatten)]
        output: PlayArgs,
    },

    /// Play back from a remote view server
    Connect {
        /// Server host
        host: String,

        /// Server control port
        port: u16,

        /// Step reply timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        output: PlayArgs,
    },
}

#[derive(Args)]
struct PlayArgs {
    /// Stop after this many steps
    #[arg(long)]
    steps: Option<usize>,

    /// Speed index, 0 (slowest) to 10 (fastest); defaults to the config value
    #[arg(long)]
    speed: Option<usize>,

    /// Write the final view as a PPM image
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Save the final grid as `.gd`
    #[arg(long)]
    save: Option<PathBuf>,

    /// Save the readings in undo history as a `.cd` log
    #[arg(long)]
    record: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path),
        None => Ok(ViewerConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &ViewerConfig) -> Result<()> {
    match command {
        Command::Info { file } => {
            if !file.exists() {
                return Err(Error::SourceUnavailable(format!(
                    "{}: no such file",
                    file.display()
                )));
            }
            let mut view = open_view(config, |engine| engine.open_file(&file, None))?;
            view.build_all()?;
            print_summary(&view);
            Ok(())
        }
        Command::Play { file, output } => {
            let mut view = open_view(config, |engine| engine.open_file(&file, None))?;
            let mut feed = match view.mode() {
                ViewMode::Live => Some(LiveFeed::start(
                    view.engine().clone(),
                    Box::new(ChannelDevice::new(stdin_records())),
                )?),
                ViewMode::Static | ViewMode::Animated => None,
            };
            let result = play(&mut view, config, &output);
            if let Some(feed) = feed.as_mut() {
                feed.stop();
            }
            result
        }
        Command::Connect {
            host,
            port,
            timeout_ms,
            output,
        } => {
            let mut network = config.network.clone();
            network.host = host;
            network.control_port = port;
            if timeout_ms.is_some() {
                network.read_timeout_ms = timeout_ms;
            }
            let datagram = network.to_datagram_config();
            let mut view = open_view(config, |engine| engine.connect(&datagram))?;
            play(&mut view, config, &output)
        }
    }
}

fn open_view(
    config: &ViewerConfig,
    open: impl FnOnce(&mut UpdateEngine) -> Result<()>,
) -> Result<MapView> {
    let mut engine = UpdateEngine::from_config(config);
    open(&mut engine)?;
    let viewport = Viewport::from_config(&config.viewport, config.grid.size);
    Ok(MapView::new(engine.into_shared(), viewport))
}

fn play(view: &mut MapView, config: &ViewerConfig, args: &PlayArgs) -> Result<()> {
    let speed = PlaybackSpeed::new(args.speed.unwrap_or(config.playback.speed));
    let summary = Player::run(view, speed, args.steps)?;
    log::info!(
        "{} steps, {} repaints{}",
        summary.steps,
        summary.repaints,
        if summary.finished { "" } else { " (stopped early)" }
    );
    print_summary(view);

    if let Some(path) = &args.snapshot {
        view.snapshot().save_ppm(path)?;
    }
    if let Some(path) = &args.save {
        save_grid(view, path)?;
    }
    if let Some(path) = &args.record {
        view.engine().lock().save_log(path)?;
    }
    Ok(())
}

fn save_grid(view: &MapView, path: &Path) -> Result<()> {
    view.engine().lock().save(path)?;
    log::info!("Saved grid to {}", path.display());
    Ok(())
}

fn print_summary(view: &MapView) {
    let engine = view.engine().lock();
    let stats = engine.grid_stats();
    println!("Source:    {:?} ({:?})", engine.data_source(), engine.range_device());
    println!("Grid:      {0}x{0} cells", engine.grid_size());
    if let Some(region) = engine.dimension() {
        println!(
            "Region:    {}x{} at ({}, {})",
            region.width, region.height, region.x, region.y
        );
    }
    println!("Readings:  {} applied, {} undoable", view.applied(), engine.undo_depth());
    println!(
        "Cells:     {} known ({} free, {} occupied, {} path), {} unknown",
        stats.known(),
        stats.free,
        stats.occupied,
        stats.path,
        stats.unknown
    );
}

/// Read `.cd` style entries (pose line, fill line) from stdin.
fn stdin_records() -> Receiver<String> {
    let (tx, rx) = unbounded();
    let spawned = thread::Builder::new()
        .name("stdin-records".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            let mut lines = CommentedLines::new(stdin.lock());
            loop {
                let pose = match lines.next_content_line() {
                    Ok(Some(pose)) => pose,
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("stdin: {}", e);
                        break;
                    }
                };
                let fill = lines.next_line().ok().flatten().unwrap_or_default();
                if tx.send(format!("{}\n{}", pose, fill)).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        log::error!("Failed to spawn stdin reader: {}", e);
    }
    rx
}
