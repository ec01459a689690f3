mod ipc;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use portald::config::{Cfg, CONFIG_ENV, LOG_LEVEL_ENV};

/// `--config <path>` on the command line, else `$PORTALD_CONFIG`.
fn config_path() -> anyhow::Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(a) = args.next() {
        let value = if a == "--config" {
            args.next()
        } else if let Some(p) = a.strip_prefix("--config=") {
            Some(p.to_owned())
        } else {
            continue;
        };
        match value {
            Some(p) if !p.is_empty() => return Ok(Some(PathBuf::from(p))),
            _ => anyhow::bail!("--config needs a path"),
        }
    }
    Ok(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

fn load_config() -> anyhow::Result<Cfg> {
    match config_path()? {
        Some(p) => Cfg::from_file(&p).with_context(|| format!("loading {}", p.display())),
        None => Ok(Cfg::default()),
    }
}

/// Writes one response line. An error means the host has stopped reading.
fn send(out: &mut impl Write, resp: &serde_json::Value) -> io::Result<()> {
    writeln!(out, "{}", resp)?;
    out.flush()
}

fn main() -> anyhow::Result<()> {
    let mut cfg = load_config()?;
    let bad_level = cfg.apply_env();
    portald::init_logging(cfg.log_level).context("starting logger")?;
    if let Some(v) = bad_level {
        log::warn!("ignoring {}={:?}, not a log level", LOG_LEVEL_ENV, v);
    }
    log::info!(
        "portald {} ready; unrecognized shapes: {}",
        env!("CARGO_PKG_VERSION"),
        cfg.unrecognized_shape.as_str()
    );

    let mut state = ipc::AppState::new(cfg);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                log::error!("stdin closed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                log::warn!("bad request line: {e}");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                if let Err(e) = send(&mut stdout, &resp) {
                    log::error!("stdout closed: {e}");
                    break;
                }
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        if let Err(e) = send(&mut stdout, &resp) {
            log::error!("stdout closed: {e}");
            break;
        }
    }

    log::info!("exiting");
    Ok(())
}
