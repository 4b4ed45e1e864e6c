//! DNS transport layer
//!
//! The check engine only talks to servers through [`DnsTransport`], so tests
//! can swap the network for a scripted implementation.

mod network;

pub use network::NetworkTransport;

use std::{fmt, net::SocketAddr, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::dns::{
    DNSPacket, ParseError, enums::DNSResourceType, rdata::RData, resource::DNSResource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Udp,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Tcp => write!(f, "TCP"),
        }
    }
}

/// A single question aimed at one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRequest {
    pub name: String,
    pub rtype: DNSResourceType,
    pub server: SocketAddr,
    pub protocol: Protocol,
    /// EDNS0 payload size; when set the DO bit is set as well
    pub edns: Option<u16>,
    pub timeout: Duration,
}

impl DnsRequest {
    pub fn new(name: &str, rtype: DNSResourceType, server: SocketAddr, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            rtype,
            server,
            protocol: Protocol::Udp,
            edns: None,
            timeout,
        }
    }

    pub fn with_edns(mut self, payload_size: u16) -> Self {
        self.edns = Some(payload_size);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn to_packet(&self, id: u16) -> DNSPacket {
        let mut packet = DNSPacket::query(id, &self.name, self.rtype);
        if let Some(payload_size) = self.edns {
            packet.add_edns(payload_size, true);
        }
        packet
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsResponse {
    pub rcode: u8,
    pub truncated: bool,
    pub answers: Vec<DNSResource>,
    pub authorities: Vec<DNSResource>,
}

impl DnsResponse {
    pub fn from_packet(packet: DNSPacket) -> Self {
        Self {
            rcode: packet.header.rcode,
            truncated: packet.header.tc,
            answers: packet.answers,
            authorities: packet.authorities,
        }
    }

    /// Answer data of the requested type. Other records in the answer
    /// section, such as the CNAMEs leading to it, are skipped.
    pub fn answers_of(&self, rtype: DNSResourceType) -> impl Iterator<Item = &RData> {
        self.answers
            .iter()
            .filter(move |record| record.rtype == rtype)
            .map(|record| &record.parsed_rdata)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("IO error talking to {server}: {message}")]
    Io { server: SocketAddr, message: String },

    #[error("No response from {server} within {timeout:?}")]
    Timeout { server: SocketAddr, timeout: Duration },

    #[error("Malformed response: {0}")]
    Parse(#[from] ParseError),

    #[error("Response ID {received} does not match query ID {expected}")]
    IdMismatch { expected: u16, received: u16 },
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Sends one request and waits for its response. Implementations must
    /// honour `request.timeout` and must not retry on their own.
    async fn exchange(&self, request: &DnsRequest) -> Result<DnsResponse, TransportError>;
}
