use rand::Rng;

use super::stage::AnalysisStage;

/// Result of advancing the counters by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Counters moved; more ticks are needed.
    Advanced,
    /// A gated counter reached its target and waits for its prompt to be answered.
    Paused { counter: usize },
    /// Every counter is at its target.
    Finished,
}

/// Pure state of one analysis animation.
///
/// Timing lives elsewhere; this type only knows how far each counter is and
/// which one is allowed to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressCounters {
    targets: Vec<u8>,
    values: Vec<u8>,
    prompted: Vec<bool>,
    gated: bool,
    cursor: usize,
    paused: Option<usize>,
}

impl ProgressCounters {
    pub fn new(stage: &AnalysisStage) -> Self {
        Self {
            targets: stage.targets(),
            values: vec![0; stage.counters.len()],
            prompted: stage.counters.iter().map(|c| c.prompt.is_some()).collect(),
            gated: stage.is_gated(),
            cursor: 0,
            paused: None,
        }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn targets(&self) -> &[u8] {
        &self.targets
    }

    pub fn paused_at(&self) -> Option<usize> {
        self.paused
    }

    pub fn is_complete(&self) -> bool {
        if self.gated {
            self.cursor >= self.targets.len() && self.paused.is_none()
        } else {
            self.values.iter().zip(&self.targets).all(|(v, t)| v >= t)
        }
    }

    /// Advances the counters by a random increment in `min..=max` each.
    ///
    /// A zero `min` is treated as 1 and a `max` below `min` as `min`, so a
    /// tick always makes progress.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, min: u8, max: u8) -> TickOutcome {
        if let Some(counter) = self.paused {
            return TickOutcome::Paused { counter };
        }
        if self.is_complete() {
            return TickOutcome::Finished;
        }

        let low = min.max(1);
        let high = max.max(low);

        if !self.gated {
            for (value, target) in self.values.iter_mut().zip(&self.targets) {
                *value = step(*value, rng.gen_range(low..=high), *target);
            }
            return if self.is_complete() {
                TickOutcome::Finished
            } else {
                TickOutcome::Advanced
            };
        }

        let current = self.cursor;
        self.values[current] = step(self.values[current], rng.gen_range(low..=high), self.targets[current]);
        if self.values[current] < self.targets[current] {
            return TickOutcome::Advanced;
        }
        if self.prompted[current] {
            self.paused = Some(current);
            return TickOutcome::Paused { counter: current };
        }
        self.cursor += 1;
        if self.is_complete() {
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced
        }
    }

    /// Lifts a pause and hands control to the next counter.
    ///
    /// Returns `false` when nothing was paused.
    pub fn resume(&mut self) -> bool {
        match self.paused.take() {
            Some(counter) => {
                self.cursor = counter + 1;
                true
            }
            None => false,
        }
    }
}

fn step(value: u8, increment: u8, target: u8) -> u8 {
    (u16::from(value) + u16::from(increment)).min(u16::from(target)) as u8
}
