use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use tarrow::stats::{MetricsSource, StatsSnapshot};
use tarrow::worker::{StatsMessage, StatsWorker};

const WAIT: Duration = Duration::from_secs(5);

struct Scripted {
    values: Vec<f32>,
    next: usize,
}

impl Scripted {
    fn new(values: &[f32]) -> Self {
        Self {
            values: values.to_vec(),
            next: 0,
        }
    }
}

impl MetricsSource for Scripted {
    fn sample(&mut self) -> StatsSnapshot {
        let cpu = self.values[self.next % self.values.len()];
        self.next += 1;
        StatsSnapshot {
            cpu_percent: cpu,
            ..StatsSnapshot::default()
        }
    }
}

fn snapshot_cpu(msg: StatsMessage) -> f32 {
    match msg {
        StatsMessage::Snapshot(s) => s.cpu_percent,
        StatsMessage::FirstLoad => panic!("expected a snapshot"),
    }
}

#[test]
fn first_load_follows_first_snapshot_only() {
    let (mut worker, rx) = StatsWorker::spawn(Scripted::new(&[10.0, 20.0, 30.0]), 0.5).unwrap();
    assert_eq!(snapshot_cpu(rx.recv_timeout(WAIT).unwrap()), 10.0);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), StatsMessage::FirstLoad);
    assert_eq!(snapshot_cpu(rx.recv_timeout(WAIT).unwrap()), 20.0);
    assert_eq!(snapshot_cpu(rx.recv_timeout(WAIT).unwrap()), 30.0);
    worker.stop();
}

#[test]
fn stop_is_prompt_even_with_long_interval() {
    let (mut worker, rx) = StatsWorker::spawn(Scripted::new(&[1.0]), 10.0).unwrap();
    rx.recv_timeout(WAIT).unwrap();
    let started = Instant::now();
    worker.stop();
    assert!(started.elapsed() < Duration::from_secs(2));
    // Drain what was sent before the stop; then the channel closes.
    loop {
        match rx.recv_timeout(WAIT) {
            Ok(_) => continue,
            Err(e) => {
                assert_eq!(e, RecvTimeoutError::Disconnected);
                break;
            }
        }
    }
}

#[test]
fn shorter_interval_applies_to_current_wait() {
    let (mut worker, rx) = StatsWorker::spawn(Scripted::new(&[5.0]), 10.0).unwrap();
    rx.recv_timeout(WAIT).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), StatsMessage::FirstLoad);
    worker.set_interval(0.5);
    let started = Instant::now();
    rx.recv_timeout(WAIT).unwrap();
    assert!(started.elapsed() < Duration::from_secs(3));
    worker.stop();
}
