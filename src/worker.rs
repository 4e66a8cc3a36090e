use crate::settings::INTERVAL_RANGE;
use crate::stats::{MetricsSource, StatsSnapshot};
use anyhow::Context;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Shortest pause between samples, even when sampling overran the interval.
pub const MIN_SLEEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum StatsMessage {
    Snapshot(Arc<StatsSnapshot>),
    /// Sent once, right after the first snapshot.
    FirstLoad,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkerCommand {
    SetInterval(f32),
    Stop,
}

pub fn clamp_interval(seconds: f32) -> Duration {
    let seconds = if seconds.is_finite() {
        seconds.clamp(INTERVAL_RANGE.0, INTERVAL_RANGE.1)
    } else {
        2.0
    };
    Duration::from_secs_f32(seconds)
}

/// Time to wait before the next sample.
pub fn sleep_after(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed).max(MIN_SLEEP)
}

/// Background sampling thread. Snapshots are handed to the UI loop over a
/// channel; the worker never sees UI state.
pub struct StatsWorker {
    commands: Sender<WorkerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl StatsWorker {
    pub fn spawn<S>(source: S, interval_secs: f32) -> anyhow::Result<(Self, Receiver<StatsMessage>)>
    where
        S: MetricsSource + 'static,
    {
        let (cmd_tx, cmd_rx) = channel();
        let (msg_tx, msg_rx) = channel();
        let interval = clamp_interval(interval_secs);
        let handle = std::thread::Builder::new()
            .name("stats-worker".into())
            .spawn(move || run(source, interval, cmd_rx, msg_tx))
            .context("spawn stats worker thread")?;
        Ok((
            Self {
                commands: cmd_tx,
                handle: Some(handle),
            },
            msg_rx,
        ))
    }

    pub fn set_interval(&self, seconds: f32) {
        let _ = self.commands.send(WorkerCommand::SetInterval(seconds));
    }

    pub fn stop(&mut self) {
        let _ = self.commands.send(WorkerCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("stats worker panicked");
            }
        }
    }
}

impl Drop for StatsWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<S: MetricsSource>(
    mut source: S,
    mut interval: Duration,
    commands: Receiver<WorkerCommand>,
    out: Sender<StatsMessage>,
) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "stats worker started");
    let mut first = true;
    loop {
        let started = Instant::now();
        let snapshot = source.sample();
        if out.send(StatsMessage::Snapshot(Arc::new(snapshot))).is_err() {
            tracing::debug!("stats receiver dropped; stopping worker");
            break;
        }
        if first {
            first = false;
            let _ = out.send(StatsMessage::FirstLoad);
        }

        let mut deadline = Instant::now() + sleep_after(interval, started.elapsed());
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            match commands.recv_timeout(wait) {
                Ok(WorkerCommand::SetInterval(seconds)) => {
                    interval = clamp_interval(seconds);
                    deadline = Instant::now() + sleep_after(interval, started.elapsed());
                    tracing::debug!(interval_ms = interval.as_millis() as u64, "stats interval updated");
                }
                Ok(WorkerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("stats worker stopped");
                    return;
                }
                Err(RecvTimeoutError::Timeout) => break,
            }
        }
    }
}
