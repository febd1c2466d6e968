use crate::error::{ProbeError, Result};
use crate::packet::{ICMP_HEADER_LEN, MAX_PACKET_SIZE};
use std::time::Duration;

pub const DEFAULT_COUNT: u32 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_PAYLOAD_SIZE: usize = 55;
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_TTL: u8 = 64;

/// Upper bound for the reply timeout and the probe interval.
pub const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings for one probe session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Number of echo requests to send
    pub count: u32,
    /// How long to wait for each reply
    pub timeout: Duration,
    /// Payload bytes after the ICMP header
    pub payload_size: usize,
    /// Minimum spacing between consecutive probes
    pub interval: Duration,
    /// TTL of outbound datagrams
    pub ttl: u8,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            payload_size: DEFAULT_PAYLOAD_SIZE,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            ttl: DEFAULT_TTL,
        }
    }
}

impl ProbeConfig {
    /// Rejects settings that can never produce a valid probe.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(ProbeError::Configuration("count must be at least 1".into()));
        }
        if self.ttl == 0 {
            return Err(ProbeError::Configuration("ttl must be at least 1".into()));
        }
        if self.timeout > MAX_WAIT || self.interval > MAX_WAIT {
            return Err(ProbeError::Configuration(format!(
                "timeout and interval must not exceed {} ms",
                MAX_WAIT.as_millis()
            )));
        }
        let packet_size = ICMP_HEADER_LEN + self.payload_size;
        if packet_size > MAX_PACKET_SIZE {
            return Err(ProbeError::Configuration(format!(
                "packet size too large: {} > {}",
                packet_size, MAX_PACKET_SIZE
            )));
        }
        Ok(())
    }
}
