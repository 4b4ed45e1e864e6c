use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpStream, UdpSocket},
    time::timeout,
};
use tracing::{debug, trace};

use super::{DnsRequest, DnsResponse, DnsTransport, Protocol, TransportError};
use crate::dns::{DNSPacket, constants::MAX_UDP_MESSAGE};

/// Plain UDP/TCP exchange over the network, one socket per query.
#[derive(Debug, Default, Clone)]
pub struct NetworkTransport;

impl NetworkTransport {
    pub fn new() -> Self {
        Self
    }

    async fn send_udp_query(
        &self,
        query_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<Vec<u8>, TransportError> {
        let io_err = |e: std::io::Error| TransportError::Io {
            server,
            message: e.to_string(),
        };

        let bind_addr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await.map_err(io_err)?;
        socket.connect(server).await.map_err(io_err)?;
        socket.send(query_bytes).await.map_err(io_err)?;

        let mut response_buf = vec![0u8; MAX_UDP_MESSAGE];
        let response_len = socket.recv(&mut response_buf).await.map_err(io_err)?;
        response_buf.truncate(response_len);
        Ok(response_buf)
    }

    async fn send_tcp_query(
        &self,
        query_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<Vec<u8>, TransportError> {
        let io_err = |e: std::io::Error| TransportError::Io {
            server,
            message: e.to_string(),
        };

        let mut stream = TcpStream::connect(server).await.map_err(io_err)?;

        // Length-prefixed framing (RFC 1035 4.2.2)
        let query_length = query_bytes.len() as u16;
        stream
            .write_all(&query_length.to_be_bytes())
            .await
            .map_err(io_err)?;
        stream.write_all(query_bytes).await.map_err(io_err)?;
        stream.flush().await.map_err(io_err)?;

        let mut length_buf = [0u8; 2];
        stream.read_exact(&mut length_buf).await.map_err(io_err)?;
        let response_length = u16::from_be_bytes(length_buf) as usize;

        let mut response_buf = vec![0; response_length];
        stream.read_exact(&mut response_buf).await.map_err(io_err)?;
        Ok(response_buf)
    }

    fn log_response_details(&self, response: &DNSPacket, response_len: usize, protocol: Protocol) {
        debug!(
            "Parsed {} response: {} bytes, rcode={}, tc={}, answers={}, authorities={}",
            protocol,
            response_len,
            response.header.rcode,
            response.header.tc,
            response.answers.len(),
            response.authorities.len()
        );

        for answer in &response.answers {
            trace!("  {} {} {} {}", answer.name(), answer.ttl, answer.rtype, answer.parsed_rdata);
        }
    }
}

#[async_trait]
impl DnsTransport for NetworkTransport {
    async fn exchange(&self, request: &DnsRequest) -> Result<DnsResponse, TransportError> {
        let id = rand::random::<u16>();
        let query_bytes = request.to_packet(id).serialize()?;

        debug!(
            "Querying {} {} @{} over {}",
            request.name, request.rtype, request.server, request.protocol
        );

        let exchange = async {
            match request.protocol {
                Protocol::Udp => self.send_udp_query(&query_bytes, request.server).await,
                Protocol::Tcp => self.send_tcp_query(&query_bytes, request.server).await,
            }
        };
        let response_buf = timeout(request.timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout {
                server: request.server,
                timeout: request.timeout,
            })??;

        trace!(
            "Raw {} response data ({} bytes): {:02x?}",
            request.protocol,
            response_buf.len(),
            &response_buf[..response_buf.len().min(64)]
        );

        let header = DNSPacket::parse_header(&response_buf)?;
        if header.id != id {
            return Err(TransportError::IdMismatch {
                expected: id,
                received: header.id,
            });
        }

        let packet = match DNSPacket::parse(&response_buf) {
            Ok(packet) => packet,
            // A truncated answer may stop mid-record (RFC 2181 9)
            Err(e) if header.tc => {
                debug!("Truncated response from {} cut short: {}", request.server, e);
                return Ok(DnsResponse {
                    rcode: header.rcode,
                    truncated: true,
                    ..DnsResponse::default()
                });
            }
            Err(e) => {
                debug!("Failed to parse response from {}: {}", request.server, e);
                return Err(TransportError::Parse(e));
            }
        };

        self.log_response_details(&packet, response_buf.len(), request.protocol);
        Ok(DnsResponse::from_packet(packet))
    }
}
