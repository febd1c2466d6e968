use crate::messages::ProbeOutcome;

/// Running counters for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub sent_count: u32,
    pub received_count: u32,
    pub min_rtt: f64,
    pub max_rtt: f64,
    pub sum_rtt: f64,
}

/// Latency figures, only present when at least one reply arrived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RttSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub sent: u32,
    pub received: u32,
    pub loss_pct: f64,
    pub rtt: Option<RttSummary>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    pub const fn new() -> Self {
        Self {
            sent_count: 0,
            received_count: 0,
            min_rtt: f64::INFINITY,
            max_rtt: 0.0,
            sum_rtt: 0.0,
        }
    }

    pub fn record_sent(&mut self) {
        self.sent_count = self.sent_count.saturating_add(1);
    }

    /// Folds a finished probe into the counters. Timeouts were already
    /// counted by `record_sent`.
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        if let ProbeOutcome::Success { rtt_ms, .. } = *outcome {
            self.received_count = self.received_count.saturating_add(1);
            self.min_rtt = self.min_rtt.min(rtt_ms);
            self.max_rtt = self.max_rtt.max(rtt_ms);
            self.sum_rtt += rtt_ms;
        }
    }

    pub fn loss_percent(&self) -> f64 {
        if self.sent_count == 0 {
            return 0.0;
        }
        self.sent_count.saturating_sub(self.received_count) as f64 * 100.0 / self.sent_count as f64
    }

    /// The average divides by packets sent, not packets received, so lost
    /// probes pull it down.
    pub fn summarize(&self) -> Summary {
        let rtt = (self.received_count > 0).then(|| RttSummary {
            min: self.min_rtt,
            avg: self.sum_rtt / self.sent_count as f64,
            max: self.max_rtt,
        });

        Summary {
            sent: self.sent_count,
            received: self.received_count,
            loss_pct: self.loss_percent(),
            rtt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn success(rtt_ms: f64) -> ProbeOutcome {
        ProbeOutcome::Success { rtt_ms, ttl: 64, payload_len: 55, source: Ipv4Addr::LOCALHOST }
    }

    #[test]
    fn all_replies() {
        let mut stats = SessionStats::new();
        for rtt in [10.0, 20.0, 30.0] {
            stats.record_sent();
            stats.record(&success(rtt));
        }

        let summary = stats.summarize();
        assert_eq!(summary.sent, 3);
        assert_eq!(summary.received, 3);
        assert_eq!(summary.loss_pct, 0.0);
        assert_eq!(summary.rtt, Some(RttSummary { min: 10.0, avg: 20.0, max: 30.0 }));
    }

    #[test]
    fn all_timeouts_omit_latency() {
        let mut stats = SessionStats::new();
        for _ in 0..4 {
            stats.record_sent();
            stats.record(&ProbeOutcome::Timeout);
        }

        let summary = stats.summarize();
        assert_eq!(summary.sent, 4);
        assert_eq!(summary.received, 0);
        assert_eq!(summary.loss_pct, 100.0);
        assert_eq!(summary.rtt, None);
        assert_eq!(stats.min_rtt, f64::INFINITY);
        assert_eq!(stats.max_rtt, 0.0);
    }

    #[test]
    fn average_divides_by_sent() {
        let mut stats = SessionStats::new();
        stats.record_sent();
        stats.record(&success(10.0));
        stats.record_sent();
        stats.record(&success(30.0));
        stats.record_sent();
        stats.record(&ProbeOutcome::Timeout);
        stats.record_sent();
        stats.record(&ProbeOutcome::Timeout);

        let summary = stats.summarize();
        assert_eq!(summary.loss_pct, 50.0);
        let rtt = summary.rtt.unwrap();
        assert_eq!(rtt.min, 10.0);
        assert_eq!(rtt.max, 30.0);
        assert_eq!(rtt.avg, 10.0);
    }

    #[test]
    fn nothing_sent() {
        let summary = SessionStats::new().summarize();
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.loss_pct, 0.0);
        assert_eq!(summary.rtt, None);
    }
}
