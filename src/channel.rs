use crate::error::{ProbeError, Result};
use crate::packet;

use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::Packet;
use pnet::transport::TransportChannelType::Layer3;
use pnet::transport::{ipv4_packet_iter, transport_channel, TransportReceiver, TransportSender};
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Instant;
use tracing::debug;

/// Big enough for the largest IPv4 datagram.
const RECV_BUFFER_SIZE: usize = 65536;

/// A datagram read from the wire, IPv4 header included.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub bytes: Vec<u8>,
    pub source: Ipv4Addr,
    pub received_at: Instant,
}

/// Where echo requests go out and candidate replies come in.
pub trait EchoChannel {
    /// Sends one ICMP message (header + payload) to `destination`.
    fn send(&mut self, icmp: &[u8], destination: Ipv4Addr) -> io::Result<()>;

    /// Waits for the next inbound datagram. Returns `Ok(None)` once `deadline`
    /// has passed without one; never blocks beyond it.
    fn recv_until(&mut self, deadline: Instant) -> io::Result<Option<Inbound>>;
}

/// Raw IPv4/ICMP socket. Closed when dropped.
pub struct RawIcmpChannel {
    ttl: u8,
    transport_sender: TransportSender,
    transport_receiver: TransportReceiver,
}

impl RawIcmpChannel {
    pub fn open(ttl: u8) -> Result<RawIcmpChannel> {
        let (transport_sender, transport_receiver) =
            transport_channel(RECV_BUFFER_SIZE, Layer3(IpNextHeaderProtocols::Icmp)).map_err(|e| {
                match e.kind() {
                    io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied,
                    _ => ProbeError::Channel(e),
                }
            })?;
        debug!("opened raw ICMP channel (ttl {})", ttl);
        Ok(RawIcmpChannel { ttl, transport_sender, transport_receiver })
    }
}

impl EchoChannel for RawIcmpChannel {
    fn send(&mut self, icmp: &[u8], destination: Ipv4Addr) -> io::Result<()> {
        let datagram = packet::wrap_ipv4(icmp, destination, self.ttl)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let ipv4 = Ipv4Packet::new(&datagram)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "datagram shorter than an IPv4 header"))?;
        self.transport_sender.send_to(ipv4, IpAddr::V4(destination))?;
        Ok(())
    }

    fn recv_until(&mut self, deadline: Instant) -> io::Result<Option<Inbound>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        // a zero socket timeout would block forever
        if remaining.as_micros() == 0 {
            return Ok(None);
        }

        let mut iter = ipv4_packet_iter(&mut self.transport_receiver);
        match iter.next_with_timeout(remaining) {
            Ok(Some((ipv4, addr))) => {
                let received_at = Instant::now();
                let source = match addr {
                    IpAddr::V4(v4) => v4,
                    IpAddr::V6(_) => ipv4.get_source(),
                };
                Ok(Some(Inbound { bytes: ipv4.packet().to_vec(), source, received_at }))
            }
            Ok(None) => Ok(None),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for RawIcmpChannel {
    fn drop(&mut self) {
        debug!("closing raw ICMP channel");
    }
}
