use std::net::SocketAddr;

use tracing::{info, warn};

use super::{
    lookup::Lookup,
    normalize::NormalizedDomain,
    report::{DelegationChain, DelegationLevel, ZoneLevel},
};
use crate::{
    dns::{enums::DNSResourceType, rdata::RData},
    error::CheckError,
};

/// Resolves the NS sets of the root, the registry zone and the domain, all
/// asked of the bootstrap nameserver. Levels are appended to `chain` as they
/// resolve, so a failure leaves the progress made so far in place.
pub async fn walk(
    lookup: &Lookup,
    domain: &NormalizedDomain,
    bootstrap: SocketAddr,
    chain: &mut DelegationChain,
) -> Result<(), CheckError> {
    let zones = [
        (ZoneLevel::Root, "."),
        (ZoneLevel::Registry, domain.suffix.suffix.as_str()),
        (ZoneLevel::Domain, domain.name.as_str()),
    ];

    for (level, zone) in zones {
        let nameservers = fetch_nameservers(lookup, zone, bootstrap).await;
        if nameservers.is_empty() {
            warn!("No nameservers found for {} @{}", zone, bootstrap);
            chain.fail(level, zone);
            return Err(CheckError::NoNameserversFound {
                zone: zone.to_string(),
            });
        }

        // The root's servers are never queried directly
        let address = match level {
            ZoneLevel::Root => None,
            _ => {
                let address = lookup.first_ipv4(&nameservers[0], bootstrap).await;
                if address.is_none() {
                    warn!("Could not resolve {} for zone {}", nameservers[0], zone);
                }
                address
            }
        };

        info!(
            "{} served by {} nameservers (first: {})",
            zone,
            nameservers.len(),
            nameservers[0]
        );
        chain.push(DelegationLevel {
            zone: zone.to_string(),
            level,
            nameservers,
            address,
        });
    }

    Ok(())
}

/// NS hostnames of `zone`, sorted so repeated runs pick the same first server.
async fn fetch_nameservers(lookup: &Lookup, zone: &str, server: SocketAddr) -> Vec<String> {
    let mut hosts: Vec<String> = lookup
        .records(zone, DNSResourceType::NS, server)
        .await
        .into_iter()
        .filter_map(|rdata| match rdata {
            RData::NS(host) => Some(host.to_ascii_lowercase()),
            _ => None,
        })
        .collect();
    hosts.sort();
    hosts.dedup();
    hosts
}
