//! Run-mode selection
//!
//! The platform tells the actor how it was started through one environment
//! variable. Anything other than the exact standby marker - including an
//! absent variable - means a standard one-shot batch run.

use std::env;

use crate::config::ServerConfig;

/// Environment variable carrying the invocation origin
pub const META_ORIGIN_ENV: &str = "ACTOR_META_ORIGIN";

/// Origin value that selects standby mode
pub const STANDBY_ORIGIN: &str = "STANDBY";

/// Environment variable carrying the standby listen port
pub const STANDBY_PORT_ENV: &str = "ACTOR_STANDBY_PORT";

/// How the actor was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One-shot batch run: process input once, persist, exit
    Standard,
    /// Long-lived HTTP server run
    Standby,
}

impl Mode {
    /// Detect the mode from the process environment
    #[must_use]
    pub fn detect() -> Self {
        Self::from_origin(env::var(META_ORIGIN_ENV).ok().as_deref())
    }

    /// Map an origin indicator to a mode. Mismatch or absence always
    /// yields `Standard`; there is no error condition.
    #[must_use]
    pub fn from_origin(origin: Option<&str>) -> Self {
        match origin {
            Some(STANDBY_ORIGIN) => Self::Standby,
            _ => Self::Standard,
        }
    }
}

/// Resolve the standby listen port: the platform-provided port variable
/// wins, the configured port is the fallback.
#[must_use]
pub fn standby_port(server: &ServerConfig) -> u16 {
    env::var(STANDBY_PORT_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(server.port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standby_requires_exact_marker() {
        assert_eq!(Mode::from_origin(Some("STANDBY")), Mode::Standby);
        assert_eq!(Mode::from_origin(Some("standby")), Mode::Standard);
        assert_eq!(Mode::from_origin(Some("WEB")), Mode::Standard);
        assert_eq!(Mode::from_origin(Some("")), Mode::Standard);
        assert_eq!(Mode::from_origin(None), Mode::Standard);
    }
}
