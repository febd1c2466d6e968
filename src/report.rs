use crate::messages::ProbeEvent;
use crate::stats::Summary;
use crossterm::style::Print;
use crossterm::ExecutableCommand;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use tracing::warn;

/// Receives session events; all formatting happens on this side.
pub trait ReportSink {
    fn report(&mut self, event: &ProbeEvent);
}

/// Collects events, mostly useful in tests.
impl ReportSink for Vec<ProbeEvent> {
    fn report(&mut self, event: &ProbeEvent) {
        self.push(event.clone());
    }
}

/// Writes classic ping output to a terminal.
pub struct ConsoleReporter<W: Write> {
    out: W,
    target: Option<(String, Ipv4Addr)>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleReporter::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        ConsoleReporter { out, target: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, event: &ProbeEvent) -> String {
        match event {
            ProbeEvent::Started { dest, addr, payload_size } => {
                format!("PING {} ({}): {} data bytes\n", dest, addr, payload_size)
            }
            ProbeEvent::Success { seq, len, addr, ttl, rtt_ms } => {
                format!("{} bytes from {}: icmp_seq={} ttl={} time={:.3} ms\n", len, addr, seq, ttl, rtt_ms)
            }
            ProbeEvent::Timeout { seq } => format!("Request timeout for icmp_seq {}\n", seq),
            ProbeEvent::Summary(summary) => self.render_summary(summary),
        }
    }

    fn render_summary(&self, summary: &Summary) -> String {
        let (dest, addr) = match &self.target {
            Some((dest, addr)) => (dest.clone(), addr.to_string()),
            None => (String::from("?"), String::from("?")),
        };

        let mut text = format!("\n--- {} ping statistics ---\n", dest);
        if summary.sent > 0 {
            text.push_str(&format!(
                "For {} ({}) {} packets transmitted, {} packets received, {:.1}% packet loss\n",
                dest, addr, summary.sent, summary.received, summary.loss_pct
            ));
            if let Some(rtt) = summary.rtt {
                text.push_str(&format!("round-trip min/avg/max = {:.3}/{:.3}/{:.3} ms\n", rtt.min, rtt.avg, rtt.max));
            }
        } else {
            text.push_str(&format!("{} packets transmitted, {} packets received\n", summary.sent, summary.received));
        }
        text.push_str("----------------------------------\n");
        text
    }
}

impl<W: Write> ReportSink for ConsoleReporter<W> {
    fn report(&mut self, event: &ProbeEvent) {
        if let ProbeEvent::Started { dest, addr, .. } = event {
            self.target = Some((dest.clone(), *addr));
        }

        let line = self.render(event);
        if let Err(e) = self.out.execute(Print(line)) {
            warn!("failed to write report: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RttSummary;

    fn printed(events: &[ProbeEvent]) -> String {
        let mut reporter = ConsoleReporter::new(Vec::new());
        for event in events {
            reporter.report(event);
        }
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn probe_lines() {
        let addr = Ipv4Addr::new(8, 8, 8, 8);
        let text = printed(&[
            ProbeEvent::Started { dest: "dns.google".into(), addr, payload_size: 55 },
            ProbeEvent::Success { seq: 0, len: 55, addr, ttl: 117, rtt_ms: 12.3456 },
            ProbeEvent::Timeout { seq: 1 },
        ]);

        assert_eq!(
            text,
            "PING dns.google (8.8.8.8): 55 data bytes\n\
             55 bytes from 8.8.8.8: icmp_seq=0 ttl=117 time=12.346 ms\n\
             Request timeout for icmp_seq 1\n"
        );
    }

    #[test]
    fn summary_with_replies() {
        let addr = Ipv4Addr::new(1, 1, 1, 1);
        let text = printed(&[
            ProbeEvent::Started { dest: "one".into(), addr, payload_size: 55 },
            ProbeEvent::Summary(Summary {
                sent: 4,
                received: 3,
                loss_pct: 25.0,
                rtt: Some(RttSummary { min: 1.0, avg: 1.5, max: 2.0 }),
            }),
        ]);

        assert!(text.contains("--- one ping statistics ---"));
        assert!(text.contains("For one (1.1.1.1) 4 packets transmitted, 3 packets received, 25.0% packet loss"));
        assert!(text.contains("round-trip min/avg/max = 1.000/1.500/2.000 ms"));
    }

    #[test]
    fn summary_without_replies_has_no_latency() {
        let text = printed(&[ProbeEvent::Summary(Summary { sent: 2, received: 0, loss_pct: 100.0, rtt: None })]);
        assert!(text.contains("100.0% packet loss"));
        assert!(!text.contains("round-trip"));
    }
}
