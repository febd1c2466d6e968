//! One destination, probed sequentially until the count runs out or the user
//! interrupts.

use crate::channel::{EchoChannel, RawIcmpChannel};
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::messages::{EchoReply, EchoRequest, ProbeEvent, ProbeOutcome};
use crate::packet;
use crate::report::ReportSink;
use crate::resolver::{self, Destination};
use crate::stats::{SessionStats, Summary};
use std::io;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Longest uninterrupted sleep between probes, so Ctrl+C is noticed quickly.
const PAUSE_STEP: Duration = Duration::from_millis(50);

/// Echo identifier for sessions started by this process.
pub fn process_identifier() -> u16 {
    (process::id() & 0xFFFF) as u16
}

pub struct ProbeSession<C: EchoChannel> {
    destination: Destination,
    config: ProbeConfig,
    identifier: u16,
    payload: Vec<u8>,
    sequence: u32,
    stats: SessionStats,
    channel: C,
    cancel: Arc<AtomicBool>,
}

impl ProbeSession<RawIcmpChannel> {
    /// Validates `config`, resolves `name` and opens a raw socket, in that
    /// order, so bad settings never touch the network.
    pub fn open(name: &str, config: ProbeConfig, cancel: Arc<AtomicBool>) -> Result<Self> {
        config.validate()?;
        let destination = resolver::resolve(name)?;
        let channel = RawIcmpChannel::open(config.ttl)?;
        ProbeSession::with_channel(destination, config, process_identifier(), channel, cancel)
    }
}

impl<C: EchoChannel> ProbeSession<C> {
    pub fn with_channel(
        destination: Destination,
        config: ProbeConfig,
        identifier: u16,
        channel: C,
        cancel: Arc<AtomicBool>,
    ) -> Result<Self> {
        config.validate()?;
        let payload = packet::echo_payload(config.payload_size);
        Ok(ProbeSession {
            destination,
            config,
            identifier,
            payload,
            sequence: 0,
            stats: SessionStats::default(),
            channel,
            cancel,
        })
    }

    /// Sends every probe, reporting each outcome, and returns the final
    /// summary. The channel is released when this returns.
    pub fn run(mut self, sink: &mut dyn ReportSink) -> Summary {
        info!(
            "pinging {} ({}) with identifier {:#06x}",
            self.destination.name, self.destination.addr, self.identifier
        );
        sink.report(&ProbeEvent::Started {
            dest: self.destination.name.clone(),
            addr: self.destination.addr,
            payload_size: self.config.payload_size,
        });

        while self.sequence < self.config.count && !self.is_cancelled() {
            let seq = self.sequence;
            let spacing = match self.probe_once() {
                Ok(outcome) => {
                    self.stats.record(&outcome);
                    match outcome {
                        ProbeOutcome::Success { rtt_ms, ttl, payload_len, source } => {
                            sink.report(&ProbeEvent::Success { seq, len: payload_len, addr: source, ttl, rtt_ms });
                            self.config.interval.saturating_sub(Duration::from_secs_f64(rtt_ms / 1000.0))
                        }
                        ProbeOutcome::Timeout => {
                            sink.report(&ProbeEvent::Timeout { seq });
                            self.config.interval
                        }
                    }
                }
                Err(e) => {
                    warn!("icmp_seq {} to {} abandoned: {}", seq, self.destination.addr, e);
                    // an unsent probe is lost as far as the sink is concerned
                    sink.report(&ProbeEvent::Timeout { seq });
                    self.config.interval
                }
            };

            if self.sequence < self.config.count {
                self.pause(spacing);
            }
        }

        if self.is_cancelled() {
            info!("interrupted after {} probes", self.stats.sent_count);
        }

        let summary = self.stats.summarize();
        sink.report(&ProbeEvent::Summary(summary.clone()));
        summary
    }

    fn probe_once(&mut self) -> Result<ProbeOutcome> {
        // the wire field is 16 bits wide and wraps on very long sessions
        let sequence = self.sequence as u16;
        self.sequence += 1;

        let icmp = packet::build_echo_request(self.identifier, sequence, &self.payload)?;
        self.stats.record_sent();

        let request = EchoRequest {
            identifier: self.identifier,
            sequence,
            payload_len: self.payload.len(),
            sent_at: Instant::now(),
        };
        self.channel
            .send(&icmp, self.destination.addr)
            .map_err(ProbeError::Transmit)?;
        trace!("sent icmp_seq {} with {} payload bytes", sequence, request.payload_len);

        let deadline = request.sent_at + self.config.timeout;
        Ok(match self.await_reply(&request, deadline) {
            Some(reply) => ProbeOutcome::Success {
                rtt_ms: reply.rtt_ms(&request),
                ttl: reply.ip.ttl,
                payload_len: reply.payload_len,
                source: reply.source,
            },
            None => ProbeOutcome::Timeout,
        })
    }

    /// Reads until the reply to `request` shows up or `deadline` passes.
    /// Anything else that arrives in between is dropped.
    fn await_reply(&mut self, request: &EchoRequest, deadline: Instant) -> Option<EchoReply> {
        loop {
            let inbound = match self.channel.recv_until(deadline) {
                Ok(Some(inbound)) => inbound,
                Ok(None) => return None,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    continue;
                }
                Err(e) => {
                    warn!("{}", ProbeError::Receive(e));
                    return None;
                }
            };

            match EchoReply::decode(&inbound.bytes, inbound.source, inbound.received_at) {
                Ok(reply) if reply.answers(request) => return Some(reply),
                Ok(reply) => trace!(
                    "ignoring icmp type {} id {:#06x} seq {} from {}",
                    reply.icmp.icmp_type, reply.icmp.identifier, reply.icmp.sequence, reply.source
                ),
                Err(e) => debug!("ignoring datagram from {}: {}", inbound.source, e),
            }
        }
    }

    fn pause(&self, duration: Duration) {
        let until = Instant::now() + duration;
        while !self.is_cancelled() {
            let left = until.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            thread::sleep(left.min(PAUSE_STEP));
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}
