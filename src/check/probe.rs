use std::net::SocketAddr;

use tracing::{debug, info, warn};

use super::lookup::Lookup;
use crate::{
    dns::{constants::DNSRcode, enums::DNSResourceType},
    error::CheckError,
    transport::{DnsResponse, Protocol},
};

/// UDP first, then at most one TCP retry when the answer was truncated.
const MAX_ATTEMPTS: usize = 2;

/// Maps the gate's response code onto the run outcome.
pub fn classify(rcode: u8) -> Result<(), CheckError> {
    match rcode {
        DNSRcode::SERVFAIL => Err(CheckError::ServerFailure),
        DNSRcode::NXDOMAIN => Err(CheckError::NameNotFound),
        DNSRcode::REFUSED => Err(CheckError::PolicyRefused),
        _ => Ok(()),
    }
}

/// Asks the recursive resolver for the domain's SOA. Anything but a usable
/// answer stops the run.
pub async fn probe(
    lookup: &Lookup,
    domain: &str,
    resolver: SocketAddr,
) -> Result<DnsResponse, CheckError> {
    let mut protocol = Protocol::Udp;

    for attempt in 1..=MAX_ATTEMPTS {
        let request = lookup
            .request(domain, DNSResourceType::SOA, resolver)
            .with_protocol(protocol);

        let response = lookup.exchange(&request).await.map_err(|e| {
            warn!("SOA probe for {} @{} failed: {}", domain, resolver, e);
            CheckError::Unreachable
        })?;

        if response.truncated {
            if protocol == Protocol::Udp && attempt < MAX_ATTEMPTS {
                debug!("SOA answer for {} truncated, retrying over TCP", domain);
                protocol = Protocol::Tcp;
                continue;
            }
            warn!("SOA answer for {} still truncated over {}", domain, protocol);
            return Err(CheckError::Unreachable);
        }

        classify(response.rcode)?;
        info!(
            "{} reachable via {} ({})",
            domain,
            resolver,
            DNSRcode::name(response.rcode)
        );
        return Ok(response);
    }

    Err(CheckError::Unreachable)
}
