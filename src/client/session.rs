//! Inactivity logout.
//!
//! While a session is authenticated, user activity keeps pushing a logout
//! deadline `timeout_minutes` into the future. Pushes are throttled so a
//! stream of pointer moves costs one reset per throttle interval. When the
//! timeout is longer than the warning lead, a warning deadline sits that
//! far ahead of the logout.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::model::config::SessionConfig;

use super::throttle::Throttle;
use super::timer::{Deadline, earliest};

/// User input that counts as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyDown,
    Scroll,
    TouchStart,
    Click,
}

/// What a poll of the monitor produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// Logout is near; informational only
    Warning { remaining: Duration },
    /// The inactivity timeout elapsed; the session must end now
    Expired,
}

#[derive(Debug)]
pub struct SessionMonitor {
    config: SessionConfig,
    throttle: Throttle,
    logout: Deadline,
    warning: Deadline,
    authenticated: bool,
    resets: u64,
}

impl SessionMonitor {
    pub fn new(config: SessionConfig) -> Self {
        SessionMonitor {
            throttle: Throttle::new(config.activity_throttle()),
            config,
            logout: Deadline::new(),
            warning: Deadline::new(),
            authenticated: false,
            resets: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.authenticated
    }

    /// Session became authenticated: open a fresh full window
    pub fn start(&mut self, now: Instant) {
        self.authenticated = true;
        self.throttle.reset();
        self.arm(now);
        info!(timeout_minutes = self.config.timeout_minutes, "session monitor started");
    }

    /// Authentication ended: cancel everything and go inert
    pub fn stop(&mut self) {
        if self.authenticated {
            info!("session monitor stopped");
        }
        self.authenticated = false;
        self.logout.cancel();
        self.warning.cancel();
        self.throttle.reset();
    }

    /// Feed one activity event. Returns true if it reset the timers.
    pub fn record_activity(&mut self, kind: ActivityKind, now: Instant) -> bool {
        if !self.authenticated {
            return false;
        }
        if !self.throttle.try_fire(now) {
            return false;
        }
        debug!(?kind, "activity reset session timers");
        self.arm(now);
        true
    }

    /// Fire whatever is due at `now`. After `Expired` the monitor is inert.
    pub fn poll(&mut self, now: Instant) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        if !self.authenticated {
            return signals;
        }
        if self.warning.fire_if_due(now) {
            let remaining = self.logout.remaining(now).unwrap_or(Duration::ZERO);
            info!(remaining_secs = remaining.as_secs(), "session about to expire");
            signals.push(SessionSignal::Warning { remaining });
        }
        if self.logout.fire_if_due(now) {
            info!("session expired after inactivity");
            self.stop();
            signals.push(SessionSignal::Expired);
        }
        signals
    }

    /// Settings changed. A running session restarts its window with the
    /// new values.
    pub fn update_config(&mut self, config: SessionConfig, now: Instant) {
        self.throttle = Throttle::new(config.activity_throttle());
        self.config = config;
        if self.authenticated {
            self.arm(now);
        }
    }

    /// Earliest pending deadline, for the event loop
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.logout.at(), self.warning.at())
    }

    pub fn logout_at(&self) -> Option<Instant> {
        self.logout.at()
    }

    pub fn warning_at(&self) -> Option<Instant> {
        self.warning.at()
    }

    /// Number of timer resets since construction
    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn arm(&mut self, now: Instant) {
        self.logout.cancel();
        self.warning.cancel();
        // a timeout past the clock's range never fires
        if let Some(at) = now.checked_add(self.config.timeout()) {
            self.logout.arm(at);
        }
        if let Some(at) = self.config.warning_after().and_then(|after| now.checked_add(after)) {
            self.warning.arm(at);
        }
        self.resets += 1;
    }
}
