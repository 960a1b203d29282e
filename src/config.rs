//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the supervisor runtime.
//!
//! Everything the original deployment would have hard-coded (relay tool
//! location, health sink path) is explicit configuration here — there is
//! no process-wide implicit state.
//!
//! ## Sentinel values
//! - `restart_every = 0s` / `health_every = 0s` → clamped to the 1 ms
//!   floor by the `*_period()` accessors (a zero-period timer is invalid).
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`].

use std::path::PathBuf;
use std::time::Duration;

/// Smallest period the loop accessors will hand to a timer.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Global configuration for the supervisor runtime.
///
/// Defines:
/// - **Relay tool**: path of the external executable to spawn
/// - **Health sink**: file the health reporter rewrites each tick
/// - **Periods**: reconciliation and health-check intervals
/// - **Event system**: bus capacity for event delivery
///
/// ## Field semantics
/// - `relay_path`: resolved like any `Command` program (absolute path, or
///   a bare name looked up on `PATH`)
/// - `health_file`: truncated and rewritten whole every health tick
/// - `restart_every`: how often dead instances are (re)started
/// - `health_every`: how often the health snapshot is written
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
///
/// All fields are public for flexibility. Prefer the accessor methods to
/// avoid sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Path of the external relay executable (e.g. `ffmpeg`).
    pub relay_path: PathBuf,

    /// Path of the health-report sink file.
    ///
    /// Replaced (not appended) on every health tick: first line is the
    /// current timestamp, followed by the argument string of every
    /// instance suspected to be hung.
    pub health_file: PathBuf,

    /// Period of the reconciliation loop.
    ///
    /// The first tick fires immediately on `start()`; subsequent ticks
    /// fire every `restart_every`.
    pub restart_every: Duration,

    /// Period of the health-report loop.
    ///
    /// The first tick fires immediately on `start()`; subsequent ticks
    /// fire every `health_every`.
    pub health_every: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// skip the oldest items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the reconciliation period clamped to the 1 ms floor.
    #[inline]
    pub fn restart_period(&self) -> Duration {
        self.restart_every.max(MIN_PERIOD)
    }

    /// Returns the health-check period clamped to the 1 ms floor.
    #[inline]
    pub fn health_period(&self) -> Duration {
        self.health_every.max(MIN_PERIOD)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    ///
    /// The `Bus` should use this value to avoid constructing an invalid
    /// channel.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `relay_path = "ffmpeg"` (resolved via `PATH`)
    /// - `health_file = "health.log"`
    /// - `restart_every = 5s`
    /// - `health_every = 1s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            relay_path: PathBuf::from("ffmpeg"),
            health_file: PathBuf::from("health.log"),
            restart_every: Duration::from_secs(5),
            health_every: Duration::from_secs(1),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.relay_path, PathBuf::from("ffmpeg"));
        assert_eq!(cfg.restart_every, Duration::from_secs(5));
        assert_eq!(cfg.health_every, Duration::from_secs(1));
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn test_zero_periods_are_clamped() {
        let cfg = Config {
            restart_every: Duration::ZERO,
            health_every: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.restart_period(), Duration::from_millis(1));
        assert_eq!(cfg.health_period(), Duration::from_millis(1));
    }

    #[test]
    fn test_nonzero_periods_pass_through() {
        let cfg = Config {
            restart_every: Duration::from_secs(7),
            ..Config::default()
        };
        assert_eq!(cfg.restart_period(), Duration::from_secs(7));
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
