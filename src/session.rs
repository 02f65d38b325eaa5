use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::state::Snapshot;
use crate::types::Move;

/// Drives the engine from the outside world: one JSON snapshot per line on
/// stdin, one move per line on stdout, until the input closes.
///
/// Snapshots are read on a separate task so a slow tick never blocks intake.
/// If more than one snapshot is queued when a decision finishes, everything
/// but the newest is discarded unprocessed; deciding a stale state would
/// waste the tick and risk acting on a board that no longer exists.
pub async fn run(mut engine: Engine) -> std::io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let reader = tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut stdout = tokio::io::stdout();
    let mut tick: u64 = 0;

    while let Some(mut line) = rx.recv().await {
        let mut dropped = 0usize;
        while let Ok(newer) = rx.try_recv() {
            line = newer;
            dropped += 1;
        }
        if dropped > 0 {
            warn!(dropped, "Discarded stale snapshots");
        }

        tick += 1;
        let action = match serde_json::from_str::<Snapshot>(&line) {
            Ok(snapshot) => engine.decide(&snapshot).action,
            Err(error) => {
                warn!(%error, tick, "Unparseable snapshot, emitting Idle");
                Move::Idle
            }
        };

        let mut out = serde_json::to_string(&action).map_err(std::io::Error::other)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!(ticks = tick, "Input closed, session over");
    let _ = reader.await;
    Ok(())
}
