use std::net::SocketAddr;

use futures::{StreamExt, stream};
use tracing::{debug, info};

use super::{lookup::Lookup, report::TlsaRecord};
use crate::dns::{enums::DNSResourceType, rdata::RData};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MxHost {
    pub preference: u16,
    pub exchange: String,
    /// TLSA records at `_25._tcp.<exchange>`
    pub tlsa: Vec<TlsaRecord>,
}

/// Web and mail records of a domain, all asked of the recursive resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryRecords {
    pub a: Vec<String>,
    pub aaaa: Vec<String>,
    /// Ordered by preference, then name
    pub mx: Vec<MxHost>,
    pub spf: Vec<String>,
    pub dmarc: Vec<String>,
    pub apex_tlsa: Vec<TlsaRecord>,
    /// Informational only
    pub www_tlsa: Vec<TlsaRecord>,
}

impl AuxiliaryRecords {
    /// Every TLSA record found: apex, www, then each MX host in order.
    pub fn all_tlsa(&self) -> Vec<TlsaRecord> {
        self.apex_tlsa
            .iter()
            .chain(&self.www_tlsa)
            .chain(self.mx.iter().flat_map(|mx| &mx.tlsa))
            .cloned()
            .collect()
    }
}

pub async fn collect(
    lookup: &Lookup,
    domain: &str,
    resolver: SocketAddr,
    max_concurrent: usize,
) -> AuxiliaryRecords {
    let dmarc_name = format!("_dmarc.{}", domain);
    let apex_tlsa_name = format!("_443._tcp.{}", domain);
    let www_tlsa_name = format!("_443._tcp.www.{}", domain);

    let (a, aaaa, mx, txt, dmarc_txt, apex_tlsa, www_tlsa) = futures::join!(
        lookup.records(domain, DNSResourceType::A, resolver),
        lookup.records(domain, DNSResourceType::AAAA, resolver),
        lookup.records(domain, DNSResourceType::MX, resolver),
        lookup.records(domain, DNSResourceType::TXT, resolver),
        lookup.records(&dmarc_name, DNSResourceType::TXT, resolver),
        tlsa_records(lookup, &apex_tlsa_name, resolver),
        tlsa_records(lookup, &www_tlsa_name, resolver),
    );

    let mut mx_hosts: Vec<(u16, String)> = mx
        .into_iter()
        .filter_map(|rdata| match rdata {
            RData::MX {
                preference,
                exchange,
            } => Some((preference, exchange.to_ascii_lowercase())),
            _ => None,
        })
        // Null MX (RFC 7505) names no host
        .filter(|(_, exchange)| !exchange.trim_end_matches('.').is_empty())
        .collect();
    mx_hosts.sort();

    // Ordered buffering keeps results in MX order regardless of completion
    let mx = stream::iter(mx_hosts)
        .map(|(preference, exchange)| async move {
            let name = format!("_25._tcp.{}", exchange.trim_end_matches('.'));
            let tlsa = tlsa_records(lookup, &name, resolver).await;
            MxHost {
                preference,
                exchange,
                tlsa,
            }
        })
        .buffered(max_concurrent)
        .collect::<Vec<_>>()
        .await;

    let records = AuxiliaryRecords {
        a: addresses(&a),
        aaaa: addresses(&aaaa),
        mx,
        spf: txt_with_prefix(&txt, "v=spf1"),
        dmarc: txt_with_prefix(&dmarc_txt, "v=DMARC1"),
        apex_tlsa,
        www_tlsa,
    };

    info!(
        "{}: {} A, {} AAAA, {} MX, SPF {}, DMARC {}, {} TLSA",
        domain,
        records.a.len(),
        records.aaaa.len(),
        records.mx.len(),
        if records.spf.is_empty() { "missing" } else { "present" },
        if records.dmarc.is_empty() { "missing" } else { "present" },
        records.all_tlsa().len()
    );

    records
}

async fn tlsa_records(lookup: &Lookup, name: &str, resolver: SocketAddr) -> Vec<TlsaRecord> {
    let records: Vec<TlsaRecord> = lookup
        .records(name, DNSResourceType::TLSA, resolver)
        .await
        .iter()
        .filter_map(|rdata| match rdata {
            RData::TLSA(tlsa) => Some(TlsaRecord::new(name, tlsa)),
            _ => None,
        })
        .collect();
    debug!("{} TLSA records at {}", records.len(), name);
    records
}

fn addresses(records: &[RData]) -> Vec<String> {
    records
        .iter()
        .filter_map(|rdata| match rdata {
            RData::A(addr) => Some(addr.to_string()),
            RData::AAAA(addr) => Some(addr.to_string()),
            _ => None,
        })
        .collect()
}

/// TXT values starting with a policy tag such as `v=spf1`. Character strings
/// of one record are concatenated first (RFC 7208 3.3).
fn txt_with_prefix(records: &[RData], prefix: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|rdata| match rdata {
            RData::TXT(strings) => Some(strings.concat()),
            _ => None,
        })
        .filter(|value| {
            value
                .trim_start()
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spf_filter_joins_character_strings() {
        let records = vec![
            RData::TXT(vec!["google-site-verification=abc".into()]),
            RData::TXT(vec!["v=spf1 include:_spf.example.com".into(), " ~all".into()]),
        ];
        assert_eq!(
            txt_with_prefix(&records, "v=spf1"),
            vec!["v=spf1 include:_spf.example.com ~all".to_string()]
        );
    }

    #[test]
    fn test_dmarc_tag_is_case_insensitive() {
        let records = vec![RData::TXT(vec!["v=dmarc1; p=reject".into()])];
        assert_eq!(txt_with_prefix(&records, "v=DMARC1").len(), 1);
        assert!(txt_with_prefix(&[RData::TXT(vec!["p=none".into()])], "v=DMARC1").is_empty());
    }

    #[test]
    fn test_all_tlsa_keeps_lookup_order() {
        let tlsa = |record: &str| TlsaRecord {
            record: record.to_string(),
            usage: 3,
            selector: 1,
            matching_type: 1,
            certificate: "00".into(),
        };
        let records = AuxiliaryRecords {
            apex_tlsa: vec![tlsa("_443._tcp.example.com")],
            www_tlsa: vec![tlsa("_443._tcp.www.example.com")],
            mx: vec![MxHost {
                preference: 10,
                exchange: "mx.example.com.".into(),
                tlsa: vec![tlsa("_25._tcp.mx.example.com")],
            }],
            ..AuxiliaryRecords::default()
        };

        let order: Vec<_> = records.all_tlsa().into_iter().map(|t| t.record).collect();
        assert_eq!(
            order,
            vec![
                "_443._tcp.example.com",
                "_443._tcp.www.example.com",
                "_25._tcp.mx.example.com"
            ]
        );
    }
}
