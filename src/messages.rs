use crate::error::Result;
use crate::packet::{self, IcmpHeader, IpHeader};
use crate::stats::Summary;
use std::net::Ipv4Addr;
use std::time::Instant;

/// The probe currently waiting for a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence: u16,
    pub payload_len: usize,
    pub sent_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoReply {
    pub ip: IpHeader,
    pub icmp: IcmpHeader,
    pub payload_len: usize,
    pub source: Ipv4Addr,
    pub received_at: Instant,
}

impl EchoReply {
    pub fn decode(raw: &[u8], source: Ipv4Addr, received_at: Instant) -> Result<EchoReply> {
        let (ip, icmp, payload_len) = packet::parse_ip_and_icmp(raw)?;
        Ok(EchoReply { ip, icmp, payload_len, source, received_at })
    }

    /// Whether this is the reply to `request` rather than someone else's traffic.
    pub fn answers(&self, request: &EchoRequest) -> bool {
        self.icmp.is_echo_reply()
            && self.icmp.identifier == request.identifier
            && self.icmp.sequence == request.sequence
    }

    pub fn rtt_ms(&self, request: &EchoRequest) -> f64 {
        self.received_at.saturating_duration_since(request.sent_at).as_secs_f64() * 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    Success {
        rtt_ms: f64,
        ttl: u8,
        payload_len: usize,
        source: Ipv4Addr,
    },
    Timeout,
}

/// What a session tells its reporting sink.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeEvent {
    Started {
        dest: String,
        addr: Ipv4Addr,
        payload_size: usize,
    },
    Success {
        seq: u32,
        len: usize,
        addr: Ipv4Addr,
        ttl: u8,
        rtt_ms: f64,
    },
    Timeout {
        seq: u32,
    },
    Summary(Summary),
}
