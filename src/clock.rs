//! Frame timing for the FPS readout.

use std::time::{Duration, Instant};

const HISTORY: usize = 60;

/// Rolling frame-time history.
pub struct FrameClock {
    last_time: Instant,
    last_report: Instant,
    dt_history: Vec<f64>,
    target_fps: f64,
}

impl FrameClock {
    pub fn new(target_fps: f64) -> Self {
        let now = Instant::now();
        Self {
            last_time: now,
            last_report: now,
            dt_history: Vec::with_capacity(HISTORY),
            target_fps,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.record(now.duration_since(self.last_time).as_secs_f64());
        self.last_time = now;
    }

    /// Keeps the last 60 frame times.
    pub fn record(&mut self, dt: f64) {
        self.dt_history.push(dt);
        if self.dt_history.len() > HISTORY {
            self.dt_history.remove(0);
        }
    }

    pub fn avg_framerate(&self) -> f64 {
        if self.dt_history.is_empty() {
            return self.target_fps;
        }
        let avg_dt = self.dt_history.iter().sum::<f64>() / self.dt_history.len() as f64;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            self.target_fps
        }
    }

    /// Returns the average rate at most once per `interval`.
    pub fn report_due(&mut self, interval: Duration) -> Option<f64> {
        let now = Instant::now();
        if now.duration_since(self.last_report) >= interval {
            self.last_report = now;
            Some(self.avg_framerate())
        } else {
            None
        }
    }
}
