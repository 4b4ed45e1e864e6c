use std::net::SocketAddr;

use tracing::{info, warn};

use super::lookup::Lookup;
use crate::{
    dns::{
        enums::DNSResourceType,
        rdata::{DnskeyData, DsData, RData},
    },
    dnssec::compute_expected_ds,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnssecMaterial {
    /// DS set published by the registry
    pub ds: Vec<DsData>,
    /// DNSKEY set published by the domain
    pub dnskeys: Vec<DnskeyData>,
    /// DS records recomputed from `dnskeys`
    pub computed: Vec<DsData>,
}

/// Fetches DS from the registry's nameserver and DNSKEY from the domain's own,
/// then recomputes the DS set. Missing servers or records leave the
/// corresponding set empty.
pub async fn verify(
    lookup: &Lookup,
    domain: &str,
    registry_server: Option<SocketAddr>,
    domain_server: Option<SocketAddr>,
) -> DnssecMaterial {
    let ds_lookup = async {
        let Some(server) = registry_server else {
            warn!("No registry nameserver address, skipping DS lookup for {}", domain);
            return Vec::new();
        };
        lookup
            .records(domain, DNSResourceType::DS, server)
            .await
            .into_iter()
            .filter_map(|rdata| match rdata {
                RData::DS(ds) => Some(ds),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    let dnskey_lookup = async {
        let Some(server) = domain_server else {
            warn!("No domain nameserver address, skipping DNSKEY lookup for {}", domain);
            return Vec::new();
        };
        lookup
            .records(domain, DNSResourceType::DNSKEY, server)
            .await
            .into_iter()
            .filter_map(|rdata| match rdata {
                RData::DNSKEY(key) => Some(key),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    let (ds, dnskeys) = tokio::join!(ds_lookup, dnskey_lookup);
    let computed = compute_expected_ds(domain, &ds, &dnskeys);

    info!(
        "{}: {} DS, {} DNSKEY, {} computed DS",
        domain,
        ds.len(),
        dnskeys.len(),
        computed.len()
    );

    DnssecMaterial {
        ds,
        dnskeys,
        computed,
    }
}
