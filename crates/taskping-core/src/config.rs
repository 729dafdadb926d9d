// Stream session configuration
//
// Bounded session lifetime plus a fixed poll interval. The lifetime
// bounds resource holding per connection; the interval caps the store
// query rate at one per open connection per tick.

use std::time::Duration;

const DEFAULT_SESSION_LIFETIME_SECS: u64 = 300;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 4;

/// Per-session streaming knobs, passed into the transport layer at
/// session start rather than mutated process-wide.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Absolute wall-clock lifetime of one streaming connection.
    pub session_lifetime: Duration,
    /// Sleep between store polls while idle.
    pub poll_interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            session_lifetime: Duration::from_secs(DEFAULT_SESSION_LIFETIME_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl StreamConfig {
    /// Load overrides from the environment.
    ///
    /// `TASKPING_SESSION_LIFETIME_SECS` and `TASKPING_POLL_INTERVAL_SECS`;
    /// unset or unparseable values keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = env_secs("TASKPING_SESSION_LIFETIME_SECS") {
            config.session_lifetime = secs;
        }
        if let Some(secs) = env_secs("TASKPING_POLL_INTERVAL_SECS") {
            config.poll_interval = secs;
        }

        config
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
