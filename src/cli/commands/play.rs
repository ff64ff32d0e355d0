//! `play`: runs the game on this host.
//!
//! The host has no sensors or buttons wired, so the board's pins idle and
//! the game is driven from the debug console (`s`, `r`, `1`..`9`). Displays
//! print to stdout and the indicators are mirrored over UDP broadcast.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::actuator::ActuatorBroadcaster;
use crate::cli::args::PlayArgs;
use crate::config::{ConfigLoader, DisplayLayout, GameConfig, loader::resolve_path};
use crate::display::{ConsoleDisplay, Scoreboard};
use crate::engine::{EngineSettings, GameEngine};
use crate::error::{GameError, PeripheralError};
use crate::input::InputArbiter;
use crate::observability::{EventEmitter, GameRecorder, init_metrics};
use crate::peripherals::{VirtualBoard, negotiate};
use crate::runtime::{GameLoop, LoopSettings, spawn_stdin_reader};
use crate::timer::MonotonicClock;
use crate::transport::{BroadcastLink, UdpBroadcastLink};

/// Runs the game until cancelled or `--exit-after` elapses.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the metrics exporter
/// or event file cannot be set up, or a timer cannot be configured. A radio
/// that fails to open only disables mirroring.
pub async fn run(args: &PlayArgs, cancel: CancellationToken) -> Result<(), GameError> {
    let config = load_config(args)?;
    init_metrics(args.metrics_port)?;

    let emitter = match &args.events_file {
        Some(path) => Some(Arc::new(EventEmitter::from_file(path)?)),
        None => None,
    };

    let clock = MonotonicClock::shared();
    let mut board = host_board(&config);
    let mut peripherals = negotiate(&config, &mut board);

    if config.radio.enabled && !args.no_radio {
        let radio = UdpBroadcastLink::open(config.radio.bind, config.radio.broadcast)
            .await
            .map(|link| Box::new(link) as Box<dyn BroadcastLink>)
            .map_err(|e| PeripheralError::unavailable("radio", e.to_string()));
        peripherals = peripherals.with_radio(radio);
    } else {
        info!("radio disabled; indicators are not mirrored");
    }

    let arbiter = InputArbiter::from_peripherals(&mut peripherals);
    let broadcaster = ActuatorBroadcaster::new(peripherals.radio.take());
    let settings = EngineSettings::from_config(&config, args.seed);
    let engine = GameEngine::new(&settings, clock.clone(), broadcaster)?;
    let scoreboard = Scoreboard::new(peripherals.displays);
    let recorder = GameRecorder::new(emitter, settings.targets);

    let game_loop = GameLoop::new(
        engine,
        arbiter,
        scoreboard,
        recorder,
        clock,
        LoopSettings::from_config(&config),
    )?;

    let (debug, reader) = if args.no_console {
        (None, None)
    } else {
        eprintln!(
            "debug console: s = start, r = reset, 1-{} = catch (press Enter to send)",
            settings.targets
        );
        let (rx, handle) = spawn_stdin_reader();
        (Some(rx), Some(handle))
    };

    let loop_cancel = cancel.child_token();
    if let Some(limit) = args.exit_after {
        let deadline = loop_cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            info!(after = %humantime::format_duration(limit), "run limit reached");
            deadline.cancel();
        });
    }

    let summary = game_loop.run(debug, loop_cancel).await;
    if let Some(handle) = reader {
        handle.abort();
    }

    info!(
        score = summary.final_score,
        state = %summary.final_state,
        "play finished"
    );
    Ok(())
}

/// Loads the configuration named on the command line, or the default file
/// if it exists, or the built-in defaults.
fn load_config(args: &PlayArgs) -> Result<Arc<GameConfig>, GameError> {
    let loader = ConfigLoader::with_defaults();
    let path = resolve_path(args.config.as_deref());

    if args.config.is_none() && !path.exists() {
        info!("no configuration file; using defaults");
        return Ok(Arc::new(GameConfig::default()));
    }

    let result = loader.load(&path)?;
    for warning in &result.warnings {
        warn!(file = %path.display(), "{warning}");
    }
    Ok(result.config)
}

/// The host stand-in for the game board: every display prints to stdout.
fn host_board(config: &GameConfig) -> VirtualBoard {
    let board = VirtualBoard::nano_esp32();
    match config.display.layout {
        DisplayLayout::Segment => board
            .with_display(
                config.display.time.clone(),
                Box::new(ConsoleDisplay::stdout("time")),
            )
            .with_display(
                config.display.score.clone(),
                Box::new(ConsoleDisplay::stdout("score")),
            ),
        DisplayLayout::Character => board.with_display(
            config.display.lcd.clone(),
            Box::new(ConsoleDisplay::stdout("lcd")),
        ),
    }
}
