//! Tick pacing for the headless run loop.
//!
//! The simulation measures time from its own clock, so pacing only decides
//! how often a tick runs. A slow tick is never made up: the next tick simply
//! sees a larger delta.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Keeps the run loop near a target tick rate.
#[derive(Debug)]
pub struct TickPacer {
    /// Target ticks per second
    tick_rate: u32,
    /// Time budget per tick
    tick_budget: Duration,
    /// Start of the current tick
    tick_start: Instant,
    /// Recent tick work times in seconds
    tick_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for TickPacer {
    fn default() -> Self {
        Self::new(60)
    }
}

impl TickPacer {
    /// Create a pacer for `tick_rate` ticks per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            tick_rate,
            tick_budget: Duration::from_secs_f64(1.0 / f64::from(tick_rate)),
            tick_start: Instant::now(),
            tick_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Target ticks per second.
    #[must_use]
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Time budget per tick.
    #[must_use]
    pub fn tick_budget(&self) -> Duration {
        self.tick_budget
    }

    /// Mark the start of a tick.
    pub fn begin(&mut self) {
        self.tick_start = Instant::now();
    }

    /// Record how long the tick's work took and sleep out the rest of the
    /// budget. Returns the work time.
    pub fn finish(&mut self) -> Duration {
        let work = self.tick_start.elapsed();
        self.tick_times.push_back(work.as_secs_f32());
        if self.tick_times.len() > self.max_samples {
            self.tick_times.pop_front();
        }

        if work < self.tick_budget {
            let sleep_time = self.tick_budget - work;
            if sleep_time > Duration::from_millis(1) {
                std::thread::sleep(sleep_time - Duration::from_millis(1));
            }
            // Spin for the remainder
            while self.tick_start.elapsed() < self.tick_budget {
                std::hint::spin_loop();
            }
        }
        work
    }

    /// Average tick work time in milliseconds over recent ticks.
    #[must_use]
    pub fn average_work_ms(&self) -> f32 {
        if self.tick_times.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.tick_times.iter().sum();
        sum / self.tick_times.len() as f32 * 1000.0
    }
}
