//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the configuration resolved at startup and the monotonic instant the
/// service started, from which every reported uptime is derived.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new application state, starting the uptime clock now.
    pub fn new(config: AppConfig) -> Self {
        Self::with_start(config, Instant::now())
    }

    pub fn with_start(config: AppConfig, started_at: Instant) -> Self {
        Self {
            config: Arc::new(config),
            started_at,
        }
    }

    /// Time elapsed since startup. Never decreases.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_monotonic() {
        let state = AppState::new(AppConfig::default());
        let first = state.uptime();
        let second = state.uptime();
        assert!(second >= first);
    }

    #[test]
    fn test_uptime_from_earlier_start() {
        // Monotonic clocks may start near zero on a freshly booted host
        let Some(start) = Instant::now().checked_sub(Duration::from_secs(90)) else {
            return;
        };
        let state = AppState::with_start(AppConfig::default(), start);
        assert!(state.uptime() >= Duration::from_secs(90));
    }
}
