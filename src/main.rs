//! ATX controller firmware — main entry point.
//!
//! ```text
//! ┌───────────────┐  line   ┌──────────────────────────────────────────┐
//! │ Console reader│────────▶│  Control thread                          │
//! │ (stdin/UART)  │ CONSOLE │  edge_executor::LocalExecutor            │
//! └───────────────┘ _LINES  │   worker × COMMAND_WORKERS               │
//!                           │      └─▶ AtxController                   │
//!                           └──────────────────────────────────────────┘
//! ```
//!
//! Several workers pull from the same queue, so `state` is answered while
//! a click is still holding its switch, and a second click is rejected
//! rather than queued behind the first.

use std::io::BufRead;

use anyhow::Result;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use atxctl::app::commands::{AtxCommand, CommandReply};
use atxctl::drivers::line::{InputLine, OutputLine};
use atxctl::{AtxConfig, AtxController};

type Atx = AtxController<InputLine, OutputLine>;

/// Console lines: reader thread → control thread.
static CONSOLE_LINES: Channel<CriticalSectionRawMutex, String, 4> = Channel::new();

/// Optional JSON config baked in at build time (`ATX_CONFIG_JSON`).
const CONFIG_JSON: Option<&str> = option_env!("ATX_CONFIG_JSON");

// ── Console ───────────────────────────────────────────────────

fn spawn_console_reader() -> Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4 * 1024)
        .spawn(|| {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) if line.trim().is_empty() => {}
                    Ok(line) => {
                        if CONSOLE_LINES.try_send(line).is_err() {
                            warn!("console: command queue full, dropping line");
                        }
                    }
                    Err(e) => warn!("console: read failed: {}", e),
                }
            }
        })?;
    Ok(())
}

async fn handle(atx: &Atx, line: String) {
    let result = match line.parse::<AtxCommand>() {
        Ok(cmd) => cmd.execute(atx).await,
        Err(e) => Err(e),
    };
    match serde_json::to_string(&CommandReply::from(result)) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("console: failed to encode reply: {}", e),
    }
}

/// Commands that can be in flight at once.
const COMMAND_WORKERS: usize = 3;

async fn worker(atx: &Atx) {
    loop {
        let line = CONSOLE_LINES.receive().await;
        handle(atx, line).await;
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  atxctl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (build-time JSON or defaults) ───────────────
    let config = match CONFIG_JSON.map(AtxConfig::from_json) {
        Some(Ok(cfg)) => {
            info!("Config loaded from ATX_CONFIG_JSON");
            cfg
        }
        Some(Err(e)) => {
            warn!("ATX_CONFIG_JSON rejected ({}), using defaults", e);
            AtxConfig::default()
        }
        None => AtxConfig::default(),
    };

    // ── 3. Controller ─────────────────────────────────────────
    let atx = AtxController::from_config(&config)?;
    info!(
        "Pulse delays: click={:?} long={:?}",
        atx.delays().short,
        atx.delays().long
    );

    // ── 4. Console + executor ─────────────────────────────────
    spawn_console_reader()?;

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    for _ in 0..COMMAND_WORKERS {
        executor.spawn(worker(&atx)).detach();
    }

    info!("System ready. Commands: state | power | power_long | reset");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));

    Ok(())
}
