//! Domain check engine.
//!
//! A run moves through fixed stages: normalization, the SOA reachability
//! gate, the delegation walk, then DNSSEC material and auxiliary records
//! side by side, and finally scoring. Normalization, the gate and the walk
//! are hard preconditions; everything after them only produces findings.

pub mod collector;
pub mod delegation;
pub mod lookup;
pub mod normalize;
pub mod probe;
pub mod report;
pub mod scoring;
pub mod verifier;

use std::{net::SocketAddr, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::{CheckConfig, parse_resolver},
    dns::{constants::DNS_PORT, rdata::RData},
    error::CheckError,
    psl::PublicSuffixList,
    transport::{DnsResponse, DnsTransport},
};
use collector::AuxiliaryRecords;
use lookup::Lookup;
use normalize::NormalizedDomain;
use report::{
    CheckStatus, DelegationChain, DnskeyRecord, DsRecord, Registry, Report, SoaRecord, ZoneLevel,
};
use scoring::Observations;
use verifier::DnssecMaterial;

/// A check that stopped at a hard gate. The report keeps everything filled in
/// before the failure.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct CheckFailure {
    pub error: CheckError,
    pub report: Box<Report>,
}

pub struct DomainChecker {
    config: CheckConfig,
    lookup: Lookup,
    psl: Arc<PublicSuffixList>,
}

impl DomainChecker {
    pub fn new(
        config: CheckConfig,
        transport: Arc<dyn DnsTransport>,
        psl: Arc<PublicSuffixList>,
    ) -> Self {
        let lookup = Lookup::new(transport, config.query_timeout, config.edns_payload_size);
        Self {
            config,
            lookup,
            psl,
        }
    }

    /// Runs every stage for `raw_domain`. Without a starting nameserver the
    /// configured default is used.
    pub async fn check_domain(
        &self,
        raw_domain: &str,
        starting_nameserver: Option<&str>,
    ) -> Result<Report, CheckFailure> {
        let nameserver = starting_nameserver
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .unwrap_or(self.config.default_nameserver.as_str());

        let mut report = Report::new(raw_domain);
        match self.run(&mut report, raw_domain, nameserver).await {
            Ok(()) => {
                report.finish(CheckStatus::Ok, "OK".to_string());
                info!(
                    "Check of {} finished with score {}",
                    report.answer.domain,
                    report.total_score()
                );
                Ok(report)
            }
            Err(error) => {
                warn!("Check of {} failed: {}", raw_domain, error);
                report.finish(CheckStatus::Failed, error.to_string());
                Err(CheckFailure {
                    error,
                    report: Box::new(report),
                })
            }
        }
    }

    async fn run(
        &self,
        report: &mut Report,
        raw_domain: &str,
        nameserver: &str,
    ) -> Result<(), CheckError> {
        let domain = normalize::normalize(raw_domain, &self.psl)?;
        report.answer.domain = domain.name.clone();

        let resolver = self.config.recursive_resolver;
        let gate = probe::probe(&self.lookup, &domain.name, resolver).await?;

        report.answer.soa = soa_from(&gate);
        report.answer.registry = Some(Registry::from(&domain.suffix));
        report.findings.push(scoring::registry_finding(&domain.suffix));

        let bootstrap = self.resolve_bootstrap(nameserver).await?;
        info!("Walking delegation of {} from {}", domain.name, bootstrap);

        let walked = delegation::walk(
            &self.lookup,
            &domain,
            bootstrap,
            &mut report.answer.delegation,
        )
        .await;
        if let Err(error) = walked {
            if report.answer.delegation.failed_level() == Some(ZoneLevel::Domain) {
                report
                    .findings
                    .push(scoring::missing_nameservers_finding(&domain.name));
            }
            return Err(error);
        }

        let (material, records) = self.inspect(&domain, &report.answer.delegation).await;

        assemble(report, &material, &records);
        report
            .findings
            .extend(scoring::score(&observe(&material, &records)));
        Ok(())
    }

    /// DNSSEC material from the walked servers and the auxiliary records
    /// from the recursive resolver, fetched concurrently.
    async fn inspect(
        &self,
        domain: &NormalizedDomain,
        chain: &DelegationChain,
    ) -> (DnssecMaterial, AuxiliaryRecords) {
        tokio::join!(
            verifier::verify(
                &self.lookup,
                &domain.name,
                chain.server_for(ZoneLevel::Registry),
                chain.server_for(ZoneLevel::Domain),
            ),
            collector::collect(
                &self.lookup,
                &domain.name,
                self.config.recursive_resolver,
                self.config.max_concurrent_lookups,
            )
        )
    }

    /// An address is used as is; a hostname is resolved once through the
    /// recursive resolver.
    async fn resolve_bootstrap(&self, nameserver: &str) -> Result<SocketAddr, CheckError> {
        if let Some(addr) = parse_resolver(nameserver) {
            return Ok(addr);
        }

        match self
            .lookup
            .first_ipv4(nameserver, self.config.recursive_resolver)
            .await
        {
            Some(ip) => Ok(SocketAddr::new(ip, DNS_PORT)),
            None => {
                warn!("Starting nameserver {} did not resolve", nameserver);
                Err(CheckError::Unreachable)
            }
        }
    }
}

fn soa_from(response: &DnsResponse) -> Option<SoaRecord> {
    response.answers.iter().find_map(|record| match &record.parsed_rdata {
        RData::SOA(soa) => Some(SoaRecord::from(soa)),
        _ => None,
    })
}

fn assemble(report: &mut Report, material: &DnssecMaterial, records: &AuxiliaryRecords) {
    let answer = &mut report.answer;
    answer.ds_record_count = material.ds.len();
    answer.dnskey_record_count = material.dnskeys.len();
    answer.ds_records = material.ds.iter().map(DsRecord::from).collect();
    answer.dnskey_records = material.dnskeys.iter().map(DnskeyRecord::from).collect();
    answer.computed_ds_records = material.computed.iter().map(DsRecord::from).collect();

    answer.a = records.a.clone();
    answer.aaaa = records.aaaa.clone();
    answer.mx = records.mx.iter().map(|mx| mx.exchange.clone()).collect();
    answer.spf = records.spf.clone();
    answer.dmarc = records.dmarc.clone();
    answer.tlsa_records = records.all_tlsa();
}

fn observe(material: &DnssecMaterial, records: &AuxiliaryRecords) -> Observations {
    Observations {
        ds_present: !material.ds.is_empty(),
        dnskey_present: !material.dnskeys.is_empty(),
        aaaa_present: !records.aaaa.is_empty(),
        dmarc_present: !records.dmarc.is_empty(),
        spf_present: !records.spf.is_empty(),
        apex_tlsa_present: !records.apex_tlsa.is_empty(),
        mx_tlsa: records
            .mx
            .iter()
            .map(|mx| (mx.exchange.clone(), !mx.tlsa.is_empty()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector::MxHost;
    use report::TlsaRecord;

    #[test]
    fn test_observations_follow_collected_records() {
        let records = AuxiliaryRecords {
            aaaa: vec!["2001:db8::1".into()],
            spf: vec!["v=spf1 -all".into()],
            mx: vec![MxHost {
                preference: 10,
                exchange: "mx.example.com.".into(),
                tlsa: vec![TlsaRecord {
                    record: "_25._tcp.mx.example.com".into(),
                    usage: 3,
                    selector: 1,
                    matching_type: 1,
                    certificate: "ab".into(),
                }],
            }],
            ..AuxiliaryRecords::default()
        };

        let observations = observe(&DnssecMaterial::default(), &records);
        assert!(observations.aaaa_present);
        assert!(observations.spf_present);
        assert!(!observations.dmarc_present);
        assert!(!observations.ds_present);
        assert_eq!(
            observations.mx_tlsa,
            vec![("mx.example.com.".to_string(), true)]
        );
    }
}
