use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::color::ColorScheme;
use crate::config::ExportConfig;
use crate::export::{self, ExportFormat};
use crate::galaxy::{Param, Session};
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Toggle {
    On,
    Off,
    Flip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorChange {
    Next,
    Prev,
    Set(ColorScheme),
}

/// Commands sent from IPC server to render loop
pub enum IpcCommand {
    Ping { reply: oneshot::Sender<String> },
    Status { reply: oneshot::Sender<String> },
    Params { reply: oneshot::Sender<String> },
    Get { param: Param, reply: oneshot::Sender<String> },
    Set { param: Param, value: f64, reply: oneshot::Sender<String> },
    Step { param: Param, steps: i32, reply: oneshot::Sender<String> },
    Reseed { seed: u64, reply: oneshot::Sender<String> },
    Animate { toggle: Toggle, reply: oneshot::Sender<String> },
    TimeReset { reply: oneshot::Sender<String> },
    Color { change: ColorChange, reply: oneshot::Sender<String> },
    Export { path: PathBuf, reply: oneshot::Sender<String> },
    Reset { reply: oneshot::Sender<String> },
}

/// Get the socket path for IPC
pub fn socket_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(dir).join("galaxia.sock")
    } else {
        PathBuf::from("/tmp/galaxia.sock")
    }
}

/// Parse a protocol line into an IpcCommand
pub fn parse_command(line: &str, reply: oneshot::Sender<String>) -> Result<IpcCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["ping"] => Ok(IpcCommand::Ping { reply }),
        ["status"] => Ok(IpcCommand::Status { reply }),
        ["params"] => Ok(IpcCommand::Params { reply }),
        ["get", name] => Ok(IpcCommand::Get {
            param: name.parse()?,
            reply,
        }),
        ["set", name, val] => {
            let value: f64 = val.parse().context("Invalid parameter value")?;
            Ok(IpcCommand::Set {
                param: name.parse()?,
                value,
                reply,
            })
        }
        ["step", name, n] => {
            let steps: i32 = n.parse().context("Invalid step count")?;
            Ok(IpcCommand::Step {
                param: name.parse()?,
                steps,
                reply,
            })
        }
        ["reseed", seed] => {
            let seed: u64 = seed.parse().context("Invalid seed")?;
            Ok(IpcCommand::Reseed { seed, reply })
        }
        ["animate", mode] => {
            let toggle = match *mode {
                "on" => Toggle::On,
                "off" => Toggle::Off,
                "toggle" => Toggle::Flip,
                other => anyhow::bail!("Invalid animate mode: {}", other),
            };
            Ok(IpcCommand::Animate { toggle, reply })
        }
        ["time", "reset"] => Ok(IpcCommand::TimeReset { reply }),
        ["color", "next"] => Ok(IpcCommand::Color {
            change: ColorChange::Next,
            reply,
        }),
        ["color", "prev"] => Ok(IpcCommand::Color {
            change: ColorChange::Prev,
            reply,
        }),
        ["color", name] => {
            let scheme: ColorScheme = name.parse().map_err(anyhow::Error::msg)?;
            Ok(IpcCommand::Color {
                change: ColorChange::Set(scheme),
                reply,
            })
        }
        ["export", path] => Ok(IpcCommand::Export {
            path: PathBuf::from(path),
            reply,
        }),
        ["reset"] => Ok(IpcCommand::Reset { reply }),
        _ => Err(anyhow::anyhow!("Unknown command: {}", line)),
    }
}

fn format_params(session: &Session) -> String {
    let params = session.params();
    Param::ALL
        .iter()
        .map(|p| format!("{}={}", p.key(), params.get(*p)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Process an IPC command by mutating render loop state
pub fn process_ipc_command(
    cmd: IpcCommand,
    session: &mut Session,
    view: &mut ViewState,
    export_config: &ExportConfig,
) {
    match cmd {
        IpcCommand::Ping { reply } => {
            let _ = reply.send("ok: pong".to_string());
        }
        IpcCommand::Status { reply } => {
            let shape = session.shape();
            let status = format!(
                "ok: stars={} arms={} pitch={} seed={} time={:.3} animate={} color={}",
                shape.stars,
                shape.arms,
                shape.pitch,
                shape.seed,
                session.time(),
                view.animate,
                view.color_scheme.name(),
            );
            let _ = reply.send(status);
        }
        IpcCommand::Params { reply } => {
            let _ = reply.send(format!("ok: {}", format_params(session)));
        }
        IpcCommand::Get { param, reply } => {
            let _ = reply.send(format!("ok: {}", session.params().get(param)));
        }
        IpcCommand::Set { param, value, reply } => {
            let response = match session.set_param(param, value) {
                Ok(()) => format!("ok: {}={}", param.key(), session.params().get(param)),
                Err(e) => format!("err: {}", e),
            };
            let _ = reply.send(response);
        }
        IpcCommand::Step { param, steps, reply } => {
            let value = session.step_param(param, steps);
            let _ = reply.send(format!("ok: {}={}", param.key(), value));
        }
        IpcCommand::Reseed { seed, reply } => {
            session.reseed(seed);
            let _ = reply.send(format!("ok: seed={}", seed));
        }
        IpcCommand::Animate { toggle, reply } => {
            view.animate = match toggle {
                Toggle::On => true,
                Toggle::Off => false,
                Toggle::Flip => !view.animate,
            };
            let state = if view.animate { "running" } else { "static" };
            let _ = reply.send(format!("ok: {}", state));
        }
        IpcCommand::TimeReset { reply } => {
            session.reset_time();
            let _ = reply.send("ok: time=0".to_string());
        }
        IpcCommand::Color { change, reply } => {
            view.color_scheme = match change {
                ColorChange::Next => view.color_scheme.next(),
                ColorChange::Prev => view.color_scheme.prev(),
                ColorChange::Set(scheme) => scheme,
            };
            let _ = reply.send(format!("ok: {}", view.color_scheme.name()));
        }
        IpcCommand::Export { path, reply } => {
            // An explicit path's extension wins over the configured format
            let format = ExportFormat::from_path(&path).or(export_config.format);
            let scheme = view.color_scheme;
            let response = match export::write_snapshot(&path, format, session, scheme) {
                Ok(_) => format!("ok: {}", path.display()),
                Err(e) => format!("err: {}", e),
            };
            let _ = reply.send(response);
        }
        IpcCommand::Reset { reply } => {
            session.reset_params();
            let _ = reply.send(format!("ok: {}", format_params(session)));
        }
    }
}

/// Handle a single client connection
async fn handle_client(stream: UnixStream, cmd_tx: mpsc::Sender<IpcCommand>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();
    buf_reader.read_line(&mut line).await?;
    let line = line.trim();

    if line.is_empty() {
        return Ok(());
    }
    debug!("IPC command: {}", line);

    let (reply_tx, reply_rx) = oneshot::channel();

    let command = match parse_command(line, reply_tx) {
        Ok(cmd) => cmd,
        Err(e) => {
            writer
                .write_all(format!("err: {}\n", e).as_bytes())
                .await?;
            return Ok(());
        }
    };

    cmd_tx
        .send(command)
        .await
        .map_err(|_| anyhow::anyhow!("Render loop has shut down"))?;

    let response = reply_rx
        .await
        .unwrap_or_else(|_| "err: internal error".to_string());

    writer
        .write_all(format!("{}\n", response).as_bytes())
        .await?;
    Ok(())
}

/// Start the IPC server, listening for commands on a Unix socket
pub async fn start_server(cmd_tx: mpsc::Sender<IpcCommand>) -> Result<()> {
    let path = socket_path();

    // Remove stale socket from previous run
    let _ = std::fs::remove_file(&path);

    let listener = UnixListener::bind(&path).context("Failed to bind IPC socket")?;

    info!("IPC server listening on {}", path.display());

    loop {
        let (stream, _) = listener.accept().await?;
        let cmd_tx = cmd_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, cmd_tx).await {
                debug!("IPC client error: {}", e);
            }
        });
    }
}

/// Send a command to a running galaxia viewer (client mode)
pub async fn send_command(line: &str) -> Result<String> {
    let path = socket_path();

    let stream = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        UnixStream::connect(&path),
    )
    .await
    .context("Connection timed out")?
    .context("Could not connect to galaxia. Is the viewer running?")?;

    let (reader, mut writer) = stream.into_split();

    writer.write_all(format!("{}\n", line).as_bytes()).await?;
    writer.shutdown().await?;

    let mut buf_reader = BufReader::new(reader);
    let mut response = String::new();

    tokio::time::timeout(
        std::time::Duration::from_secs(2),
        buf_reader.read_line(&mut response),
    )
    .await
    .context("Response timed out")?
    .context("Failed to read response")?;

    Ok(response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;

    /// Parse and run one command line, returning the reply.
    fn run(line: &str, session: &mut Session, view: &mut ViewState) -> String {
        run_with_export(line, session, view, &ExportConfig::default())
    }

    fn run_with_export(
        line: &str,
        session: &mut Session,
        view: &mut ViewState,
        export_config: &ExportConfig,
    ) -> String {
        let (tx, mut rx) = oneshot::channel();
        match parse_command(line, tx) {
            Ok(cmd) => {
                process_ipc_command(cmd, session, view, export_config);
                rx.try_recv().unwrap()
            }
            Err(e) => format!("err: {}", e),
        }
    }

    fn fixture() -> (Session, ViewState) {
        (Session::default(), ViewState::new(&DisplayConfig::default()))
    }

    #[test]
    fn ping_and_params() {
        let (mut session, mut view) = fixture();
        assert_eq!(run("ping", &mut session, &mut view), "ok: pong");
        assert_eq!(
            run("params", &mut session, &mut view),
            "ok: mass=1 omega=0.4 dispersion=0.15 radial_density=1 vertical_density=1"
        );
    }

    #[test]
    fn set_and_get() {
        let (mut session, mut view) = fixture();
        assert_eq!(run("set mass 2.5", &mut session, &mut view), "ok: mass=2.5");
        assert_eq!(run("get mass", &mut session, &mut view), "ok: 2.5");
        assert_eq!(
            run("set vertical-density 2", &mut session, &mut view),
            "ok: vertical_density=2"
        );
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn bad_input_is_reported() {
        let (mut session, mut view) = fixture();
        assert!(run("set mass 99", &mut session, &mut view).starts_with("err:"));
        assert!(run("set mass heavy", &mut session, &mut view).starts_with("err:"));
        assert!(run("set spin 1", &mut session, &mut view).starts_with("err: unknown parameter"));
        assert!(run("warp 9", &mut session, &mut view).starts_with("err: Unknown command"));
        assert!(run("animate maybe", &mut session, &mut view).starts_with("err:"));
        assert_eq!(session.params().mass, 1.0);
    }

    #[test]
    fn step_reseed_and_reset() {
        let (mut session, mut view) = fixture();
        assert_eq!(run("step omega 3", &mut session, &mut view), "ok: omega=0.7");
        assert_eq!(run("reseed 9", &mut session, &mut view), "ok: seed=9");
        assert_eq!(session.shape().seed, 9);
        run("reset", &mut session, &mut view);
        assert_eq!(session.params().omega, 0.4);
    }

    #[test]
    fn animation_and_color() {
        let (mut session, mut view) = fixture();
        assert_eq!(run("animate on", &mut session, &mut view), "ok: running");
        assert_eq!(run("animate toggle", &mut session, &mut view), "ok: static");
        assert_eq!(run("color next", &mut session, &mut view), "ok: spectrum");
        assert_eq!(run("color ocean", &mut session, &mut view), "ok: ocean");
        assert!(run("color teal", &mut session, &mut view).starts_with("err:"));

        session.advance(3.0);
        assert_eq!(run("time reset", &mut session, &mut view), "ok: time=0");
        assert_eq!(session.time(), 0.0);
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let (mut session, mut view) = fixture();
        let reply = run(&format!("export {}", path.display()), &mut session, &mut view);
        assert!(reply.starts_with("ok:"), "{reply}");
        assert!(path.exists());
    }

    #[test]
    fn export_path_extension_beats_configured_format() {
        let dir = tempfile::tempdir().unwrap();
        let export_config = ExportConfig {
            format: Some(ExportFormat::Html),
            ..ExportConfig::default()
        };
        let (mut session, mut view) = fixture();

        let path = dir.path().join("snap.csv");
        let line = format!("export {}", path.display());
        let reply = run_with_export(&line, &mut session, &mut view, &export_config);
        assert!(reply.starts_with("ok:"), "{reply}");
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.lines().next(), Some("x,y,z,color"));

        // No recognised extension: the configured format applies
        let path = dir.path().join("snap.out");
        let line = format!("export {}", path.display());
        let reply = run_with_export(&line, &mut session, &mut view, &export_config);
        assert!(reply.starts_with("ok:"), "{reply}");
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));
    }
}
