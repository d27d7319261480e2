//! Periodic system sampler
//!
//! Overwrites the system gauges on a fixed period. Active users and load are
//! simulated; uptime, memory and CPU come from the process itself.

use std::time::{Duration, Instant};

use dashboard_core::{SystemGauges, SystemSample, process};
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Range of the simulated active user count
pub const ACTIVE_USERS_RANGE: std::ops::Range<i64> = 50..150;

/// Range of the simulated load average
pub const SYSTEM_LOAD_RANGE: std::ops::Range<f64> = 0.0..4.0;

pub struct Sampler {
    gauges: SystemGauges,
    started: Instant,
    last_cpu: Option<(Instant, f64)>,
}

impl Sampler {
    pub fn new(gauges: SystemGauges, started: Instant) -> Self {
        Self {
            gauges,
            started,
            last_cpu: None,
        }
    }

    /// Take one sample and write it to the gauges
    pub fn sample(&mut self) -> SystemSample {
        let mut rng = rand::thread_rng();
        let now = Instant::now();
        let snapshot = process::snapshot().unwrap_or_default();

        let cpu_percent = match self.last_cpu {
            Some((then, cpu_then)) => {
                cpu_percent(cpu_then, snapshot.cpu_seconds, now.duration_since(then))
            }
            None => 0.0,
        };
        self.last_cpu = Some((now, snapshot.cpu_seconds));

        let sample = SystemSample {
            uptime_seconds: now.duration_since(self.started).as_secs_f64(),
            active_users: rng.gen_range(ACTIVE_USERS_RANGE),
            system_load: rng.gen_range(SYSTEM_LOAD_RANGE),
            memory_bytes: snapshot.resident_bytes,
            cpu_percent,
        };

        self.gauges.apply(&sample);
        sample
    }

    /// Run forever on `period`; the first sample is taken immediately
    pub fn spawn(mut self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let sample = self.sample();
                tracing::debug!(
                    active_users = sample.active_users,
                    system_load = sample.system_load,
                    cpu_percent = sample.cpu_percent,
                    "Sampled system gauges"
                );
            }
        })
    }
}

/// CPU usage between two readings of cumulative CPU seconds
fn cpu_percent(before: f64, after: f64, wall: Duration) -> f64 {
    let wall = wall.as_secs_f64();
    if wall <= 0.0 || after < before {
        return 0.0;
    }
    (after - before) / wall * 100.0
}
