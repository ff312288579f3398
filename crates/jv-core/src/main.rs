use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use jv_core::config::Config;
use jv_core::layout::resolve_layout;
use jv_core::prompt::{parse_movement, Prompter};
use jv_core::sampler;
use jv_core::sink::{self, DiagnosticSink, SinkKind};
use jv_core::style::{Style, Tone};
use jv_core::table::{RowSink, TableWriter};
use jv_protocol::StepPlan;
use jv_rig::mock::fixtures;
use jv_rig::{MockRig, MockRigConfig};

#[derive(Parser)]
#[command(name = "jointval")]
#[command(version)]
#[command(about = "Sweep a slider joint and tabulate the dependent joint angles")]
struct Cli {
    /// Config file (defaults to ~/.config/jointval/config.toml)
    #[arg(long, env = "JOINTVAL_CONFIG")]
    config: Option<PathBuf>,

    /// Rig description (TOML); defaults to the built-in six-leg rig
    #[arg(long)]
    rig: Option<PathBuf>,

    /// Table to write; prompted for when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Slider movement in the configured input unit; prompted for when omitted
    #[arg(short, long, allow_hyphen_values = true)]
    movement: Option<String>,

    /// Where progress text goes
    #[arg(long, value_enum)]
    sink: Option<SinkKind>,

    /// Log file for the file sink
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Leave the slider at the end of the sweep
    #[arg(long)]
    no_restore: bool,

    /// Skip the refresh and pause after every move
    #[arg(long)]
    no_live: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let stderr_tty = io::stderr().is_terminal();
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(stderr_tty)
        .compact()
        .init();

    if let Err(e) = run(cli) {
        let style = if stderr_tty { Style::new() } else { Style::disabled() };
        eprintln!("{}\n{e:?}", style.paint("Failed:", Tone::Error));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(kind) = cli.sink {
        config.log.sink = kind;
    }
    if let Some(path) = &cli.log_file {
        config.log.path = Some(path.to_string_lossy().into_owned());
    }
    if cli.no_restore {
        config.sweep.restore_actuator = false;
    }
    if cli.no_live {
        config.sweep.update_view = false;
    }

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stderr());

    let path = match cli.output {
        Some(path) => path,
        None => match prompter.destination()? {
            Some(path) => path,
            None => return Ok(()),
        },
    };

    let movement_text = match cli.movement {
        Some(text) => text,
        None => match prompter.movement(config.units.input_length, &config.sweep.default_movement)? {
            Some(text) => text,
            None => return Ok(()),
        },
    };
    let movement = parse_movement(
        &movement_text,
        config.units.input_length,
        config.units.native_length,
    )?;

    let rig = load_rig(cli.rig.as_deref())?;
    let mut sink = sink::from_config(&config.log)?;

    let mut resolved = resolve_layout(&rig, &config.rig, &config.unit_annotation(), sink.as_mut())
        .context("failed to resolve rig layout")?;

    let start = resolved.actuator.position()?;
    let plan = StepPlan::from_movement(start, movement, config.sweep.increment)?;

    let mut table = TableWriter::open(&path, &resolved.header, config.number_format())
        .with_context(|| format!("failed to open {}", path.display()))?;
    if !table.resuming() {
        sink.record("Add CSV header");
    }

    let report = sampler::run(
        &plan,
        &resolved.sensors,
        resolved.actuator.as_mut(),
        &mut table,
        &config.sweep_options(),
        sink.as_mut(),
    )
    .with_context(|| format!("sweep into {} failed", path.display()))?;

    info!(
        steps = report.steps,
        unreadable = report.unreadable,
        resumed = report.resumed,
        path = %path.display(),
        "sweep complete"
    );
    Ok(())
}

fn load_rig(path: Option<&Path>) -> Result<MockRig> {
    let config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read rig {}", path.display()))?;
            toml::from_str::<MockRigConfig>(&contents)
                .with_context(|| format!("failed to parse rig {}", path.display()))?
        }
        None => fixtures::legged_rig(0.0),
    };
    Ok(MockRig::new(config))
}
