//! Command-line interface for snaptile
//!
//! Plans rectangles, replays keyboard commands against an in-memory desktop
//! and manages the settings file.

use crate::config::{
    FileSettingsStore, GapChange, InMemorySettingsStore, Settings, SettingsStore,
};
use crate::host::{Compositor, InMemoryCompositor, InMemoryMonitor, InMemoryWindow};
use crate::models::{Direction, Rect, TilingStep, TilingSteps, WorkArea};
use crate::services::{
    compute_rect, gap_size_message, TileCommand, TilingController, Transition, TransitionTiming,
};
use crate::{Result, SnapTileError};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Frame interval used when simulating transitions
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Frames after which a simulated transition is considered stuck
const MAX_SIMULATED_FRAMES: u32 = 10_000;

const SIMULATED_WINDOW: u64 = 1;

/// snaptile command-line interface
#[derive(Parser)]
#[command(name = "snaptile")]
#[command(about = "Keyboard-driven window snapping with step cycling and animated transitions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct SnapTileCli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable JSON output for machine-readable results
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the rectangle for a single tiling step
    Plan(PlanArgs),

    /// Replay keyboard commands against a simulated desktop
    Simulate(SimulateArgs),

    /// Change the stored gap size
    Gap(GapCommands),

    /// Settings file management
    Config(ConfigCommands),
}

#[derive(Args)]
pub struct PlanArgs {
    /// Work area as "x,y,width,height"
    #[arg(long, default_value = "0,0,1920,1080")]
    pub work_area: Rect,

    /// Monitor geometry, defaults to the work area
    #[arg(long)]
    pub monitor: Option<Rect>,

    /// Direction such as "left", "top-right", "fill" or "center"
    #[arg(short, long)]
    pub direction: String,

    /// Gap size in percent
    #[arg(short, long, default_value_t = 0)]
    pub gap: u32,

    /// Step as "fraction" or "width;height"
    #[arg(short, long, default_value = "0.5")]
    pub step: String,

    /// Keep windows sharing an edge flush against each other
    #[arg(long)]
    pub no_inner_gaps: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Monitor geometry as "x,y,width,height"
    #[arg(long, default_value = "0,0,1920,1080")]
    pub monitor: Rect,

    /// Work area, defaults to the monitor geometry
    #[arg(long)]
    pub work_area: Option<Rect>,

    /// Initial frame of the simulated window
    #[arg(long, default_value = "100,100,800,600")]
    pub window: Rect,

    /// Start with the window maximized
    #[arg(long)]
    pub maximized: bool,

    /// Milliseconds between simulated key presses
    #[arg(long, default_value_t = 200)]
    pub interval_ms: u64,

    /// Keybinding names, e.g. "tile-window-to-left"
    #[arg(required = true)]
    pub commands: Vec<String>,
}

#[derive(Args)]
pub struct GapCommands {
    #[arg(value_enum)]
    pub action: GapAction,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GapAction {
    Increase,
    Decrease,
}

impl From<GapAction> for GapChange {
    fn from(action: GapAction) -> Self {
        match action {
            GapAction::Increase => GapChange::Increase,
            GapAction::Decrease => GapChange::Decrease,
        }
    }
}

#[derive(Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub action: ConfigActions,
}

#[derive(Subcommand)]
pub enum ConfigActions {
    /// Show the effective settings
    Show,

    /// Print the settings file location
    Path,

    /// Write a settings file with defaults if none exists
    Init,
}

/// Outcome of one simulated command
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedStep {
    pub command: String,
    pub frame: Rect,
    pub frames_rendered: u32,
}

/// Parse a direction given as "left", "top-right" or a full keybinding name
pub fn parse_direction(value: &str) -> Result<Direction> {
    let value = value.trim();
    let name = if value.starts_with("tile-window-to-") || value.starts_with("shortcut-") {
        value.to_string()
    } else {
        format!("tile-window-to-{}", value)
    };

    match name.parse::<TileCommand>()? {
        TileCommand::Tile(direction) => Ok(direction),
        other => Err(SnapTileError::ValidationError(format!(
            "{} is not a tiling direction",
            other
        ))
        .into()),
    }
}

fn parse_step(value: &str) -> Result<TilingStep> {
    let steps: TilingSteps = value
        .parse()
        .map_err(|err| {
            SnapTileError::ValidationError(format!("Invalid step '{}': {}", value, err))
        })?;
    Ok(steps.step(0))
}

/// CLI command executor
pub struct SnapTileCliExecutor {
    store: FileSettingsStore,
    json_output: bool,
}

impl SnapTileCliExecutor {
    pub fn new(store: FileSettingsStore, json_output: bool) -> Self {
        Self { store, json_output }
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Plan(args) => self.execute_plan(args),
            Commands::Simulate(args) => self.execute_simulate(args).await,
            Commands::Gap(cmd) => self.execute_gap(cmd.action.into()),
            Commands::Config(cmd) => self.execute_config(cmd.action),
        }
    }

    fn execute_plan(&self, args: PlanArgs) -> Result<()> {
        let direction = parse_direction(&args.direction)?;
        let step = parse_step(&args.step)?;
        let area = WorkArea::new(
            args.work_area,
            args.monitor.unwrap_or(args.work_area),
            args.gap,
        );

        let rect = crate::trace_performance!("plan", {
            compute_rect(&area, direction, step, direction.is_center(), !args.no_inner_gaps)
        });

        if self.json_output {
            let plan = serde_json::json!({
                "direction": direction.to_string(),
                "step": step,
                "work_area": area,
                "rect": rect,
            });
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!("{}", rect);
        }
        Ok(())
    }

    async fn execute_simulate(&self, args: SimulateArgs) -> Result<()> {
        let commands = args
            .commands
            .iter()
            .map(|name| name.parse::<TileCommand>())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let host = Arc::new(InMemoryCompositor::new_with(
            vec![InMemoryMonitor {
                geometry: args.monitor,
                work_area: args.work_area.unwrap_or(args.monitor),
            }],
            vec![InMemoryWindow::new(SIMULATED_WINDOW, args.window)],
        ));
        if args.maximized {
            host.maximize(SIMULATED_WINDOW)?;
        }

        // Gap changes during a simulation never touch the settings file
        let settings: Arc<dyn SettingsStore> =
            Arc::new(InMemorySettingsStore::new(self.store.load()));
        let controller = TilingController::new(
            host.clone(),
            host.clone(),
            settings,
            TransitionTiming::default(),
        );

        let start = Instant::now();
        let interval = Duration::from_millis(args.interval_ms);
        let mut clock = Duration::ZERO;
        let mut steps = Vec::with_capacity(commands.len());

        for (index, command) in commands.into_iter().enumerate() {
            let pressed_at = start + interval * index as u32;
            let transition = match command {
                TileCommand::Tile(direction) => controller.tile_at(direction, pressed_at).await?,
                other => controller.run(other).await?,
            };

            let frames_rendered = match transition {
                Some(Transition::Animating(handle)) => {
                    let mut frames = 0;
                    while !handle.is_finished() {
                        if frames >= MAX_SIMULATED_FRAMES {
                            handle.abort();
                            return Err(SnapTileError::CompositorError(format!(
                                "{} did not settle after {} frames",
                                command, frames
                            ))
                            .into());
                        }
                        clock += FRAME_INTERVAL;
                        host.tick(clock);
                        frames += 1;
                        tokio::task::yield_now().await;
                    }
                    let outcome = handle.await?;
                    debug!(%command, ?outcome, frames, "Simulated transition finished");
                    frames
                }
                Some(Transition::Immediate) | None => 0,
            };

            steps.push(SimulatedStep {
                command: command.to_string(),
                frame: host.frame_rect(SIMULATED_WINDOW)?,
                frames_rendered,
            });
        }

        controller.shutdown().await;

        if self.json_output {
            let notifications: Vec<String> = host
                .notifications()
                .into_iter()
                .map(|(_, body)| body)
                .collect();
            let report = serde_json::json!({
                "steps": steps,
                "notifications": notifications,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            for step in &steps {
                println!("{:<32} {}", step.command, step.frame);
            }
            for (_, body) in host.notifications() {
                println!("{}", body);
            }
        }
        Ok(())
    }

    fn execute_gap(&self, change: GapChange) -> Result<()> {
        let gap_size = self.store.load().stepped_gap_size(change);
        self.store.set_gap_size(gap_size)?;
        info!(gap_size, "Stored new gap size");

        if self.json_output {
            println!("{}", serde_json::json!({ "gap_size": gap_size }));
        } else {
            println!("{}", gap_size_message(gap_size));
        }
        Ok(())
    }

    fn execute_config(&self, action: ConfigActions) -> Result<()> {
        match action {
            ConfigActions::Show => {
                let settings: Settings = self.store.read()?;
                if self.json_output {
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                } else {
                    print!("{}", toml::to_string_pretty(&settings)?);
                }
            }
            ConfigActions::Path => {
                println!("{}", self.store.settings_path().display());
            }
            ConfigActions::Init => {
                let path = self.store.initialize()?;
                println!("Settings file ready at {}", path.display());
            }
        }
        Ok(())
    }
}

/// Run the CLI interface with already parsed arguments
pub async fn run_cli(cli: SnapTileCli) -> Result<()> {
    let store = match &cli.config {
        Some(path) => FileSettingsStore::at_path(path),
        None => FileSettingsStore::default(),
    };
    debug!(path = %store.settings_path().display(), "Using settings file");

    let executor = SnapTileCliExecutor::new(store, cli.json);

    if let Err(e) = executor.execute(cli.command).await {
        if cli.json {
            let error_json = serde_json::json!({
                "error": true,
                "message": e.to_string()
            });
            println!("{}", serde_json::to_string_pretty(&error_json)?);
        } else {
            error!("Command failed: {}", e);
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
