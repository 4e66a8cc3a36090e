use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Purpose of a deferred or periodic task owned by the UI loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Hover,
    Breathing,
    Reconcile,
}

#[derive(Debug, Clone, Copy)]
struct Task {
    due: Instant,
    period: Option<Duration>,
}

/// Named, cancellable timers. Nothing runs on its own: the owner calls
/// [`Scheduler::take_due`] from its loop, so tasks can never overlap.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: HashMap<TaskKind, Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a single run after `delay`, replacing any pending task of the
    /// same kind.
    pub fn schedule_once(&mut self, kind: TaskKind, now: Instant, delay: Duration) {
        self.tasks.insert(
            kind,
            Task {
                due: now + delay,
                period: None,
            },
        );
    }

    /// Schedule a repeating task whose first run is one `period` from now.
    pub fn schedule_every(&mut self, kind: TaskKind, now: Instant, period: Duration) {
        self.tasks.insert(
            kind,
            Task {
                due: now + period,
                period: Some(period),
            },
        );
    }

    /// Returns whether a task was pending.
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        self.tasks.remove(&kind).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.tasks.contains_key(&kind)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.values().map(|t| t.due).min()
    }

    /// Collect every task due at `now`, earliest first. One-shot tasks are
    /// removed; periodic ones move to their next slot without catching up on
    /// missed runs.
    pub fn take_due(&mut self, now: Instant) -> Vec<TaskKind> {
        let mut due: Vec<(Instant, TaskKind)> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.due <= now)
            .map(|(kind, task)| (task.due, *kind))
            .collect();
        due.sort();
        for (_, kind) in &due {
            let Some(task) = self.tasks.get_mut(kind) else {
                continue;
            };
            match task.period {
                Some(period) => {
                    let next = task.due + period;
                    task.due = if next <= now { now + period } else { next };
                }
                None => {
                    self.tasks.remove(kind);
                }
            }
        }
        due.into_iter().map(|(_, kind)| kind).collect()
    }
}
