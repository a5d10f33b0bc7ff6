use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{info, warn};

mod color;
mod config;
mod display;
mod export;
mod galaxy;
mod ipc;
mod view;

use config::Config;
use export::ExportFormat;
use galaxy::Session;

#[derive(Parser, Debug)]
#[command(name = "galaxia")]
#[command(author, version, about = "Procedural spiral galaxy with an interactive terminal viewer")]
pub struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of stars
    #[arg(short = 'n', long, global = true)]
    stars: Option<usize>,

    /// Number of spiral arms
    #[arg(short, long, global = true)]
    arms: Option<u32>,

    /// Spiral winding per unit radius
    #[arg(long, global = true)]
    pitch: Option<f64>,

    /// Outer radius of the disk
    #[arg(long, global = true)]
    max_radius: Option<f64>,

    /// Random seed
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Central mass, scales colour intensity (0.5-5.0)
    #[arg(long, global = true)]
    mass: Option<f64>,

    /// Angular velocity (0.0-2.0)
    #[arg(long, global = true)]
    omega: Option<f64>,

    /// Vertical dispersion (0.05-0.5)
    #[arg(long, global = true)]
    dispersion: Option<f64>,

    /// Radial density (0.5-3.0)
    #[arg(long, global = true)]
    radial_density: Option<f64>,

    /// Vertical density (0.5-3.0)
    #[arg(long, global = true)]
    vertical_density: Option<f64>,

    /// Color scheme: plasma, spectrum, fire, ocean, purple, monochrome
    #[arg(long, global = true)]
    colors: Option<String>,

    /// Advance time so angular velocity is visible
    #[arg(long)]
    animate: bool,

    /// Viewer frame rate
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a snapshot of the galaxy without starting the viewer
    Export {
        /// Output file (.json, .csv or .html)
        path: PathBuf,

        /// Output format, inferred from the extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Elapsed time to render at
        #[arg(short, long, default_value = "0")]
        time: f64,
    },
    /// Send a command to a running viewer, e.g. `ctl set mass 2.5`
    Ctl {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Write a commented config template to the default path
    InitConfig,
    /// Print shell completions
    Completions { shell: clap_complete::Shell },
}

/// Viewer logs go to a file so they don't tear the TUI; commands log to stderr.
fn init_logging(to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("galaxia=info".parse()?);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if !to_file {
        builder.with_writer(std::io::stderr).init();
        return Ok(());
    }

    match dirs::cache_dir().map(|d| d.join("galaxia")) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("galaxia.log"))
                .context("Failed to open log file")?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    config.merge_args(args);
    config.normalize();
    Ok(config)
}

/// `--format` first, then the path's extension, then the configured format.
fn export_format(
    path: &std::path::Path,
    flag: Option<ExportFormat>,
    configured: Option<ExportFormat>,
) -> Option<ExportFormat> {
    flag.or_else(|| ExportFormat::from_path(path)).or(configured)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.command.is_none())?;

    match &args.command {
        None => {
            let config = load_config(&args)?;
            info!("Starting galaxia viewer");

            let (ipc_tx, ipc_rx) = mpsc::channel(16);
            tokio::spawn(async move {
                if let Err(e) = ipc::start_server(ipc_tx).await {
                    warn!("IPC server error: {:#}", e);
                }
            });

            let result = display::terminal::run(config, ipc_rx).await;
            let _ = std::fs::remove_file(ipc::socket_path());
            result?;
        }
        Some(Command::Export { path, format, time }) => {
            let config = load_config(&args)?;
            let mut session = Session::new(config.galaxy, config.params);
            session.advance(*time);
            let format = export_format(path, *format, config.export.format);
            export::write_snapshot(path, format, &session, config.display.color_scheme)?;
            println!("{}", path.display());
        }
        Some(Command::Ctl { words }) => {
            let reply = ipc::send_command(&words.join(" ")).await?;
            if let Some(err) = reply.strip_prefix("err: ") {
                anyhow::bail!("{}", err);
            }
            println!("{}", reply.strip_prefix("ok: ").unwrap_or(&reply));
        }
        Some(Command::InitConfig) => {
            let path = Config::init_default_config()?;
            println!("Wrote {}", path.display());
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Args::command();
            clap_complete::generate(*shell, &mut cmd, "galaxia", &mut std::io::stdout());
        }
    }

    Ok(())
}
