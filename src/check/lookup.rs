use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    dns::{constants::DNSRcode, enums::DNSResourceType, rdata::RData},
    transport::{DnsRequest, DnsResponse, DnsTransport, TransportError},
};

/// Shared query settings for one checker: every request gets the configured
/// timeout and an EDNS0 OPT with the DO bit.
#[derive(Clone)]
pub struct Lookup {
    transport: Arc<dyn DnsTransport>,
    timeout: Duration,
    edns_payload_size: u16,
}

impl Lookup {
    pub fn new(transport: Arc<dyn DnsTransport>, timeout: Duration, edns_payload_size: u16) -> Self {
        Self {
            transport,
            timeout,
            edns_payload_size,
        }
    }

    pub fn request(&self, name: &str, rtype: DNSResourceType, server: SocketAddr) -> DnsRequest {
        DnsRequest::new(name, rtype, server, self.timeout).with_edns(self.edns_payload_size)
    }

    pub async fn exchange(&self, request: &DnsRequest) -> Result<DnsResponse, TransportError> {
        debug!(
            "{} {} @{} ({})",
            request.name, request.rtype, request.server, request.protocol
        );
        self.transport.exchange(request).await
    }

    /// Answer data of `rtype`. Transport failures count as an empty answer
    /// and are only logged.
    pub async fn records(&self, name: &str, rtype: DNSResourceType, server: SocketAddr) -> Vec<RData> {
        let request = self.request(name, rtype, server);
        match self.exchange(&request).await {
            Ok(response) => {
                if response.rcode != DNSRcode::NOERROR {
                    debug!(
                        "{} {} @{} answered {}",
                        name,
                        rtype,
                        server,
                        DNSRcode::name(response.rcode)
                    );
                }
                response.answers_of(rtype).cloned().collect()
            }
            Err(e) => {
                warn!("{} {} lookup @{} failed: {}", name, rtype, server, e);
                Vec::new()
            }
        }
    }

    /// First IPv4 address of `host`, asked of `server`.
    pub async fn first_ipv4(&self, host: &str, server: SocketAddr) -> Option<IpAddr> {
        self.records(host, DNSResourceType::A, server)
            .await
            .into_iter()
            .find_map(|rdata| match rdata {
                RData::A(addr) => Some(IpAddr::V4(addr)),
                _ => None,
            })
    }
}
