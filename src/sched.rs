//! ==============================================================================
//! sched.rs - retry/refresh clock
//! ==============================================================================
//!
//! purpose:
//!     the decision state machine the control loop consults every pass.
//!     four periodic actions, each with an explicit next-fire instant:
//!
//! ```text
//!     - token refresh: long period, unconditional
//!     - full cycle:    medium period (acquire -> forward -> display)
//!     - retry:         short period, armed only while the last cycle failed;
//!                      when it fires the full cycle runs immediately instead
//!                      of waiting out its normal period
//!     - chart append:  slow period, kick-started once right after the first
//!                      successful cycle instead of waiting a full period
//!
//!     all checks are pure over a caller-supplied `now`, so the state machine
//!     is testable without sleeping.
//! ```
//!
//! ==============================================================================

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
pub struct Intervals {
    pub cycle: Duration,
    pub retry: Duration,
    pub token_refresh: Duration,
    pub chart: Duration,
}

impl Intervals {
    pub fn from_config(cfg: &crate::config::IntervalsConfig) -> Self {
        Self {
            cycle: Duration::from_secs(cfg.cycle_secs),
            retry: Duration::from_secs(cfg.retry_secs),
            token_refresh: Duration::from_secs(cfg.token_refresh_secs),
            chart: Duration::from_secs(cfg.chart_secs),
        }
    }
}

#[derive(Debug)]
pub struct Scheduler {
    intervals: Intervals,
    next_token_refresh: Instant,
    next_cycle: Instant,
    /// armed only while the last cycle failed
    next_retry: Option<Instant>,
    next_chart: Instant,
    /// one-shot: force a chart append right after the first successful cycle
    chart_kickstart_pending: bool,
    /// strictly-forward clock bookkeeping
    pub last_success: Option<Instant>,
    pub last_failure: Option<Instant>,
}

impl Scheduler {
    /// token refresh and first cycle are due immediately at startup;
    /// the chart waits for the first-success kickstart
    pub fn new(now: Instant, intervals: Intervals) -> Self {
        Self {
            intervals,
            next_token_refresh: now,
            next_cycle: now,
            next_retry: None,
            next_chart: now + intervals.chart,
            chart_kickstart_pending: true,
            last_success: None,
            last_failure: None,
        }
    }

    pub fn token_refresh_due(&self, now: Instant) -> bool {
        now >= self.next_token_refresh
    }

    pub fn note_token_refreshed(&mut self, now: Instant) {
        self.next_token_refresh = now + self.intervals.token_refresh;
    }

    /// a cycle is due on its own period, or immediately when an armed retry
    /// fires
    pub fn cycle_due(&self, now: Instant) -> bool {
        if now >= self.next_cycle {
            return true;
        }
        matches!(self.next_retry, Some(at) if now >= at)
    }

    pub fn retry_armed(&self) -> bool {
        self.next_retry.is_some()
    }

    pub fn note_cycle_success(&mut self, now: Instant) {
        self.last_success = Some(now);
        self.next_cycle = now + self.intervals.cycle;
        self.next_retry = None;
        if self.chart_kickstart_pending {
            self.chart_kickstart_pending = false;
            self.next_chart = now;
        }
    }

    pub fn note_cycle_failure(&mut self, now: Instant) {
        self.last_failure = Some(now);
        self.next_cycle = now + self.intervals.cycle;
        self.next_retry = Some(now + self.intervals.retry);
    }

    pub fn chart_due(&self, now: Instant) -> bool {
        now >= self.next_chart
    }

    pub fn note_chart_done(&mut self, now: Instant) {
        self.next_chart = now + self.intervals.chart;
    }
}
