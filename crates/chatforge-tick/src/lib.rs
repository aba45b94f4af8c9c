//! Cooperative tick gate for Chatforge.
//!
//! Chatforge plugins don't own a timer. The bot's polling loop asks every
//! plugin "is a tick due?" on each pass, and the plugin answers through a
//! [`TickGate`]: the gate fires at most once per configured interval,
//! never early, possibly late (a slow gateway round-trip simply delays the
//! next poll). Missed ticks are not replayed; the latest tick wins.
//!
//! # Integration
//!
//! ```ignore
//! fn on_tick(&mut self, ctx: &mut BotContext<'_>) -> bool {
//!     let Some(info) = self.gate.poll() else { return false };
//!     step_simulation(info.tick);
//!     self.gate.record_tick_end();
//!     true
//! }
//! ```
//!
//! Time comes from `tokio::time::Instant`, so tests can drive the gate with
//! `tokio::time::pause()` / `advance()`.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Full configuration for the tick gate.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Minimum wall-clock time between two ticks.
    pub interval: Duration,
    /// Budget warning threshold (0.0–1.0). Default: 0.80 (80%).
    /// A tracing warning is emitted when tick work exceeds this fraction
    /// of the interval.
    pub budget_warn_threshold: f64,
    /// Budget critical threshold (0.0–1.0). Default: 1.0 (100%).
    pub budget_critical_threshold: f64,
    /// Enable per-tick metrics collection.
    pub metrics_enabled: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            budget_warn_threshold: 0.80,
            budget_critical_threshold: 1.0,
            metrics_enabled: true,
        }
    }
}

impl TickConfig {
    /// Create a config for a specific interval with sensible defaults.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickGate::new`]. Rules:
    /// - Thresholds clamped to `0.0..=1.0`.
    /// - `budget_warn_threshold` forced ≤ `budget_critical_threshold`.
    pub fn validated(mut self) -> Self {
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self.budget_critical_threshold = self.budget_critical_threshold.clamp(0.0, 1.0);
        if self.budget_warn_threshold > self.budget_critical_threshold {
            self.budget_warn_threshold = self.budget_critical_threshold;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a tick, returned by [`TickGate::poll`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Time since the previous tick. `None` for the first tick.
    pub since_last: Option<Duration>,
    /// How far past the interval this tick fired.
    pub late_by: Duration,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the tick gate.
///
/// Timing values refer to the work reported via
/// [`TickGate::record_tick_end`].
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Total ticks fired.
    pub total_ticks: u64,
    /// Ticks that fired more than 10% of an interval late.
    pub total_late: u64,
    /// Exponential moving average of tick execution time (α = 0.1).
    pub avg_tick_time: Duration,
    /// Maximum tick execution time observed.
    pub max_tick_time: Duration,
    /// Last budget utilization (0.0–∞). >1.0 means the tick outlasted
    /// its interval.
    pub budget_utilization: f64,
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Minimum-interval tick gate.
///
/// One `TickGate` per periodic hook. The first poll fires immediately.
#[derive(Debug)]
pub struct TickGate {
    config: TickConfig,
    last_tick: Option<Instant>,
    tick_count: u64,
    /// When the current tick's work started. Set by `poll`, consumed by
    /// `record_tick_end`.
    tick_start: Option<Instant>,
    paused: bool,
    metrics: TickMetrics,
}

impl TickGate {
    /// Create a new gate from config.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            "tick gate created"
        );
        Self {
            config,
            last_tick: None,
            tick_count: 0,
            tick_start: None,
            paused: false,
            metrics: TickMetrics::default(),
        }
    }

    /// Create a gate for a specific interval with default settings.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(TickConfig::with_interval(interval))
    }

    /// Returns `Some` if a tick is due now, marking it as taken.
    ///
    /// Returns `None` while paused or while less than the interval has
    /// passed since the previous tick.
    pub fn poll(&mut self) -> Option<TickInfo> {
        if self.paused {
            return None;
        }
        let now = Instant::now();
        let since_last = match self.last_tick {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.config.interval {
                    return None;
                }
                Some(elapsed)
            }
            None => None,
        };

        let late_by = since_last
            .map(|elapsed| elapsed.saturating_sub(self.config.interval))
            .unwrap_or_default();
        if late_by > self.config.interval / 10 {
            self.metrics.total_late += 1;
            trace!(
                tick = self.tick_count + 1,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick fired late"
            );
        }

        self.last_tick = Some(now);
        self.tick_start = Some(now);
        self.tick_count += 1;
        self.metrics.total_ticks += 1;

        Some(TickInfo {
            tick: self.tick_count,
            since_last,
            late_by,
        })
    }

    /// Record that the work for the current tick has finished.
    ///
    /// Enables budget monitoring and metrics. If not called, budget
    /// warnings won't fire.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        let budget = self.config.interval;

        if !budget.is_zero() {
            let utilization = elapsed.as_secs_f64() / budget.as_secs_f64();
            self.metrics.budget_utilization = utilization;

            if utilization >= self.config.budget_critical_threshold {
                warn!(
                    tick = self.tick_count,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    budget_ms = budget.as_secs_f64() * 1000.0,
                    "CRITICAL: tick exceeded budget"
                );
            } else if utilization >= self.config.budget_warn_threshold {
                warn!(
                    tick = self.tick_count,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    budget_ms = budget.as_secs_f64() * 1000.0,
                    "tick approaching budget limit"
                );
            }
        }

        if self.config.metrics_enabled {
            if elapsed > self.metrics.max_tick_time {
                self.metrics.max_tick_time = elapsed;
            }
            // Exponential moving average (α = 0.1).
            let alpha = 0.1;
            let prev = self.metrics.avg_tick_time.as_secs_f64();
            let curr = elapsed.as_secs_f64();
            self.metrics.avg_tick_time =
                Duration::from_secs_f64(prev * (1.0 - alpha) + curr * alpha);
        }
    }

    /// Pause the gate. `poll` returns `None` until [`resume`](Self::resume).
    ///
    /// Safe to call multiple times (idempotent).
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick gate paused");
        }
    }

    /// Resume after a pause.
    ///
    /// The next tick is due one full interval after resuming.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_tick = Some(Instant::now());
            debug!(tick = self.tick_count, "tick gate resumed");
        }
    }

    /// Whether the gate is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current tick count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// The configured minimum interval.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}
