use std::net::SocketAddr;
use std::time::Duration;

use crate::scheduler::Speed;

/// Which keying device the dispatcher talks to.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeConfig {
    /// In-process keyer that logs symbols and waits for the keying time.
    Simulated {
        /// Multiplier applied to the real keying time. `0.0` plays instantly.
        time_scale: f64,
    },
    /// Device reachable over a newline-delimited JSON socket.
    Tcp {
        /// host:port, hostnames allowed
        addr: String,
    },
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::Simulated { time_scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address of the HTTP surface.
    pub listen_addr: SocketAddr,
    /// Initial default speed.
    pub default_speed: Speed,
    /// Pause between two dispatcher passes.
    pub poll_interval_ms: u64,
    /// Upper bound on a single playback.
    pub actuator_timeout_secs: u64,
    pub bridge: BridgeConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:7000"
                .parse()
                .expect("default listen address is valid"),
            default_speed: Speed::DEFAULT,
            poll_interval_ms: 100,
            actuator_timeout_secs: 120,
            bridge: BridgeConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }

    pub fn with_bridge(mut self, bridge: BridgeConfig) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_default_speed(mut self, speed: Speed) -> Self {
        self.default_speed = speed;
        self
    }

    /// Never zero: a zero period would stall the dispatcher.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn actuator_timeout(&self) -> Duration {
        Duration::from_secs(self.actuator_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_config_default_is_simulated_realtime() {
        assert_eq!(
            BridgeConfig::default(),
            BridgeConfig::Simulated { time_scale: 1.0 }
        );
    }

    #[test]
    fn relay_config_default() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.listen_addr.to_string(), "127.0.0.1:7000");
        assert_eq!(cfg.default_speed.wpm(), 17);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(100));
        assert_eq!(cfg.actuator_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn relay_config_new_keeps_defaults() {
        let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let cfg = RelayConfig::new(addr);
        assert_eq!(cfg.listen_addr, addr);
        assert_eq!(cfg.actuator_timeout_secs, 120);
    }

    #[test]
    fn poll_interval_is_floored_at_one_millisecond() {
        let mut cfg = RelayConfig::default();
        cfg.poll_interval_ms = 0;
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn relay_config_builders() {
        let cfg = RelayConfig::default()
            .with_default_speed(Speed::clamped(25))
            .with_bridge(BridgeConfig::Tcp {
                addr: "keyer.local:9000".to_string(),
            });
        assert_eq!(cfg.default_speed.wpm(), 25);
        assert_eq!(
            cfg.bridge,
            BridgeConfig::Tcp {
                addr: "keyer.local:9000".to_string()
            }
        );
    }
}
