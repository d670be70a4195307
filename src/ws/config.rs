#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

const DEFAULT_RECONNECT_DELAY_DURATION: Duration = Duration::from_millis(3000);
const DEFAULT_HANDSHAKE_TIMEOUT_DURATION: Duration = Duration::from_secs(10);
const DEFAULT_HEARTBEAT_INTERVAL_DURATION: Duration = Duration::from_secs(20);
const DEFAULT_HEARTBEAT_TIMEOUT_DURATION: Duration = Duration::from_secs(10);
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.0;
const DEFAULT_MESSAGE_CAPACITY: usize = 1024;

/// Configuration for the connection manager.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on a single handshake. `None` waits for the transport to decide.
    pub handshake_timeout: Option<Duration>,
    /// Interval between WebSocket PING control frames while open. `None` disables heartbeats.
    pub heartbeat_interval: Option<Duration>,
    /// Maximum time to wait for PONG before the transport is considered dead
    pub heartbeat_timeout: Duration,
    /// Buffer size for stream subscribers before they start lagging
    pub message_capacity: usize,
    /// Reconnection strategy configuration
    pub reconnect: ReconnectConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handshake_timeout: Some(DEFAULT_HANDSHAKE_TIMEOUT_DURATION),
            heartbeat_interval: Some(DEFAULT_HEARTBEAT_INTERVAL_DURATION),
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT_DURATION,
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Configuration for automatic reconnection behavior.
///
/// The default is a fixed 3 second delay between attempts, retried forever.
/// Raising `backoff_multiplier` above `1.0` turns it into exponential backoff capped at
/// `max_backoff`.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of consecutive failed handshakes before giving up.
    /// `None` means infinite retries.
    pub max_attempts: Option<u32>,
    /// Delay before the first reconnection attempt
    pub initial_backoff: Duration,
    /// Maximum delay between attempts
    pub max_backoff: Duration,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
    /// Random spread applied to each delay, as a fraction in `0.0..=1.0`
    pub jitter: f64,
}

impl ReconnectConfig {
    /// A fixed delay between attempts with no growth and no jitter.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_backoff: delay,
            max_backoff: delay,
            ..Self::default()
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_backoff: DEFAULT_RECONNECT_DELAY_DURATION,
            max_backoff: DEFAULT_RECONNECT_DELAY_DURATION,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: 0.0,
        }
    }
}

impl From<ReconnectConfig> for ExponentialBackoff {
    fn from(config: ReconnectConfig) -> Self {
        ExponentialBackoffBuilder::default()
            .with_initial_interval(config.initial_backoff)
            .with_max_interval(config.max_backoff)
            .with_multiplier(config.backoff_multiplier)
            .with_randomization_factor(config.jitter)
            .with_max_elapsed_time(None) // We handle max attempts separately
            .build()
    }
}
