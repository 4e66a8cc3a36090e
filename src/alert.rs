use std::time::Duration;

pub const PHASE_MIN: f32 = 0.2;
pub const PHASE_MAX: f32 = 1.0;
pub const PHASE_STEP: f32 = 0.05;
pub const BREATHING_PERIOD: Duration = Duration::from_millis(50);
pub const DEFAULT_THRESHOLD: f32 = 95.0;

/// Edge of the alert condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEdge {
    Raised,
    Cleared,
}

/// One step of the triangle wave. Returns the new phase and direction; the
/// direction flips when a bound is reached.
pub fn step_phase(phase: f32, rising: bool) -> (f32, bool) {
    let next = if rising {
        phase + PHASE_STEP
    } else {
        phase - PHASE_STEP
    };
    if next >= PHASE_MAX - f32::EPSILON {
        (PHASE_MAX, false)
    } else if next <= PHASE_MIN + f32::EPSILON {
        (PHASE_MIN, true)
    } else {
        (next, rising)
    }
}

pub fn exceeds(cpu_percent: f32, memory_percent: f32, threshold: f32) -> bool {
    cpu_percent >= threshold || memory_percent >= threshold
}

/// Breathing opacity for the threshold alert.
#[derive(Debug, Clone)]
pub struct AlertAnimator {
    active: bool,
    phase: f32,
    rising: bool,
    threshold: f32,
}

impl AlertAnimator {
    pub fn new(threshold: f32) -> Self {
        Self {
            active: false,
            phase: 0.0,
            rising: false,
            threshold,
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    /// Feed the latest snapshot's percentages. Returns an edge only when the
    /// active flag actually flips.
    pub fn observe(&mut self, cpu_percent: f32, memory_percent: f32) -> Option<AlertEdge> {
        let now_active = exceeds(cpu_percent, memory_percent, self.threshold);
        if now_active == self.active {
            return None;
        }
        self.active = now_active;
        if now_active {
            self.phase = PHASE_MAX;
            self.rising = false;
            tracing::info!(cpu_percent, memory_percent, threshold = self.threshold, "alert raised");
            Some(AlertEdge::Raised)
        } else {
            self.phase = 0.0;
            tracing::info!(cpu_percent, memory_percent, threshold = self.threshold, "alert cleared");
            Some(AlertEdge::Cleared)
        }
    }

    /// Advance one breathing tick. Frozen while inactive.
    pub fn tick(&mut self) -> f32 {
        if self.active {
            let (phase, rising) = step_phase(self.phase, self.rising);
            self.phase = phase;
            self.rising = rising;
        }
        self.phase
    }
}

impl Default for AlertAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_stays_within_bounds_over_many_ticks() {
        let mut alert = AlertAnimator::default();
        alert.observe(99.0, 10.0);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..10_000 {
            let phase = alert.tick();
            assert!((PHASE_MIN..=PHASE_MAX).contains(&phase), "phase {phase}");
            seen_min |= phase == PHASE_MIN;
            seen_max |= phase == PHASE_MAX;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn direction_flips_at_bounds() {
        assert_eq!(step_phase(0.98, true), (PHASE_MAX, false));
        assert_eq!(step_phase(0.22, false), (PHASE_MIN, true));
        let (p, rising) = step_phase(0.5, true);
        assert!((p - 0.55).abs() < 1e-6 && rising);
    }

    #[test]
    fn threshold_is_inclusive_on_either_metric() {
        assert!(exceeds(95.0, 0.0, 95.0));
        assert!(exceeds(0.0, 95.0, 95.0));
        assert!(!exceeds(94.9, 94.9, 95.0));
    }

    #[test]
    fn cpu_sequence_raises_and_clears_once() {
        let mut alert = AlertAnimator::new(95.0);
        let edges: Vec<_> = [92.0, 96.0, 97.0, 94.0]
            .into_iter()
            .map(|cpu| alert.observe(cpu, 10.0))
            .collect();
        assert_eq!(
            edges,
            vec![None, Some(AlertEdge::Raised), None, Some(AlertEdge::Cleared)]
        );
        assert_eq!(alert.phase(), 0.0);
    }

    #[test]
    fn inactive_tick_is_frozen() {
        let mut alert = AlertAnimator::default();
        assert_eq!(alert.tick(), 0.0);
        assert_eq!(alert.tick(), 0.0);
    }
}
