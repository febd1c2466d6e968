//! ICMP echo and IPv4 header encoding/decoding

use crate::checksum::checksum;
use crate::error::{ProbeError, Result};

use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpCode, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::{Ipv4Packet, MutableIpv4Packet};
use pnet::packet::Packet;
use std::net::Ipv4Addr;

pub const IPV4_HEADER_LEN: usize = 20;
pub const ICMP_HEADER_LEN: usize = 8;

/// Shortest buffer `parse_ip_and_icmp` accepts.
pub const MIN_REPLY_LEN: usize = IPV4_HEADER_LEN + ICMP_HEADER_LEN;

/// Largest ICMP message (header + payload) we are willing to send.
pub const MAX_PACKET_SIZE: usize = 65507;

/// Largest payload that still fits in `MAX_PACKET_SIZE`.
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - ICMP_HEADER_LEN;

const PAYLOAD_START: usize = 65;

/// Deterministic echo payload: byte `i` is `(65 + i) mod 256`.
pub fn echo_payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((PAYLOAD_START + i) & 0xFF) as u8).collect()
}

/// Builds an ICMP Echo Request (header + payload) with a valid checksum.
pub fn build_echo_request(identifier: u16, sequence: u16, payload: &[u8]) -> Result<Vec<u8>> {
    let total = ICMP_HEADER_LEN + payload.len();
    if total > MAX_PACKET_SIZE {
        return Err(ProbeError::Configuration(format!(
            "packet size too large: {} > {}",
            total, MAX_PACKET_SIZE
        )));
    }

    let mut buf = vec![0u8; total];
    let Some(mut echo_packet) = MutableEchoRequestPacket::new(&mut buf) else {
        return Err(ProbeError::MalformedPacket { len: total });
    };

    echo_packet.set_icmp_type(IcmpTypes::EchoRequest);
    echo_packet.set_icmp_code(IcmpCode::new(0));
    echo_packet.set_checksum(0);
    echo_packet.set_identifier(identifier);
    echo_packet.set_sequence_number(sequence);
    echo_packet.set_payload(payload);

    let echo_checksum = checksum(echo_packet.packet());
    echo_packet.set_checksum(echo_checksum);

    Ok(buf)
}

/// Wraps an ICMP message in a 20-byte IPv4 header addressed to `destination`.
///
/// The source address and identification are left zero for the kernel to
/// fill in.
pub fn wrap_ipv4(icmp: &[u8], destination: Ipv4Addr, ttl: u8) -> Result<Vec<u8>> {
    let total = IPV4_HEADER_LEN + icmp.len();
    let total_length = u16::try_from(total).map_err(|_| {
        ProbeError::Configuration(format!("datagram too large: {} bytes", total))
    })?;

    let mut buf = vec![0u8; total];
    let Some(mut ipv4) = MutableIpv4Packet::new(&mut buf) else {
        return Err(ProbeError::MalformedPacket { len: total });
    };

    ipv4.set_version(4);
    ipv4.set_header_length((IPV4_HEADER_LEN / 4) as u8);
    ipv4.set_total_length(total_length);
    ipv4.set_ttl(ttl);
    ipv4.set_next_level_protocol(IpNextHeaderProtocols::Icmp);
    ipv4.set_source(Ipv4Addr::UNSPECIFIED);
    ipv4.set_destination(destination);
    ipv4.set_payload(icmp);

    let header_checksum = checksum(&ipv4.packet()[..IPV4_HEADER_LEN]);
    ipv4.set_checksum(header_checksum);

    Ok(buf)
}

/// Fixed-layout IPv4 header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpHeader {
    pub version: u8,
    pub ihl: u8,
    pub tos: u8,
    pub total_length: u16,
    pub identification: u16,
    pub flags: u8,
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
}

impl IcmpHeader {
    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == IcmpTypes::EchoReply.0
    }
}

/// Splits a raw datagram into its IPv4 header, ICMP header and payload length.
///
/// The IPv4 header is read from the first 20 bytes and the ICMP header from the
/// 8 that follow, whatever IHL says. The IP header checksum is not checked.
pub fn parse_ip_and_icmp(raw: &[u8]) -> Result<(IpHeader, IcmpHeader, usize)> {
    let malformed = || ProbeError::MalformedPacket { len: raw.len() };
    if raw.len() < MIN_REPLY_LEN {
        return Err(malformed());
    }

    let ipv4 = Ipv4Packet::new(&raw[..IPV4_HEADER_LEN]).ok_or_else(malformed)?;
    let icmp = EchoReplyPacket::new(&raw[IPV4_HEADER_LEN..MIN_REPLY_LEN]).ok_or_else(malformed)?;

    let ip_header = IpHeader {
        version: ipv4.get_version(),
        ihl: ipv4.get_header_length(),
        tos: (ipv4.get_dscp() << 2) | ipv4.get_ecn(),
        total_length: ipv4.get_total_length(),
        identification: ipv4.get_identification(),
        flags: ipv4.get_flags(),
        fragment_offset: ipv4.get_fragment_offset(),
        ttl: ipv4.get_ttl(),
        protocol: ipv4.get_next_level_protocol().0,
        checksum: ipv4.get_checksum(),
        source: ipv4.get_source(),
        destination: ipv4.get_destination(),
    };

    let icmp_header = IcmpHeader {
        icmp_type: icmp.get_icmp_type().0,
        code: icmp.get_icmp_code().0,
        checksum: icmp.get_checksum(),
        identifier: icmp.get_identifier(),
        sequence: icmp.get_sequence_number(),
    };

    Ok((ip_header, icmp_header, raw.len() - MIN_REPLY_LEN))
}
