//! # Runtime configuration for the supervisor.
//!
//! Provides [`Config`], the centralized settings for the link supervisor:
//! the remote endpoint, the connect bound, the probe cadence, the retry
//! policy, and the event-bus capacity.
//!
//! All fields are public; [`Config::default`] carries the reference
//! deployment values.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Settings for a supervised keep-alive link.
///
/// ## Field semantics
/// - `host` / `port`: the remote endpoint, joined by [`Config::endpoint`].
/// - `connect_timeout`: bound on one connect attempt; exceeding it is a
///   connection failure, never fatal to the process.
/// - `probe_period`: cadence at which the injected timer fires the probe
///   handler while a link is up.
/// - `retry`: growth/reset parameters for the reconnect backoff.
/// - `bus_capacity`: ring-buffer size of the event broadcast channel;
///   slow observers past this lag skip old events.
#[derive(Clone, Debug)]
pub struct Config {
    /// Remote host to keep a connection to.
    pub host: String,
    /// Remote TCP port.
    pub port: u16,
    /// Maximum time one connect attempt may take.
    pub connect_timeout: Duration,
    /// Period of the repeating liveness-probe trigger.
    pub probe_period: Duration,
    /// Reconnect backoff parameters.
    pub retry: RetryPolicy,
    /// Capacity of the event bus ring buffer (minimum 1, clamped by the bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the `host:port` dial string for the remote endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    /// Reference configuration:
    ///
    /// - `host = "jasta.dyndns.org"`, `port = 5545`
    /// - `connect_timeout = 20s`
    /// - `probe_period = 120s`
    /// - `retry = RetryPolicy::default()` (5s initial, 120s cap, ×10 growth)
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            host: "jasta.dyndns.org".to_string(),
            port: 5545,
            connect_timeout: Duration::from_secs(20),
            probe_period: Duration::from_secs(120),
            retry: RetryPolicy::default(),
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_host_and_port() {
        let cfg = Config {
            host: "127.0.0.1".into(),
            port: 9000,
            ..Config::default()
        };
        assert_eq!(cfg.endpoint(), "127.0.0.1:9000");
    }

    #[test]
    fn test_default_reference_values() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 5545);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(20));
        assert_eq!(cfg.probe_period, Duration::from_secs(120));
    }
}
