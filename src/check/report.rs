use std::{fmt, net::IpAddr, net::SocketAddr};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    dns::{
        constants::DNS_PORT,
        rdata::{DnskeyData, DsData, SoaData, TlsaData},
    },
    dnssec::calculate_key_tag,
    psl::PublicSuffix,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Pending,
    Failed,
    #[serde(rename = "OK")]
    Ok,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pending => write!(f, "Pending"),
            CheckStatus::Failed => write!(f, "Failed"),
            CheckStatus::Ok => write!(f, "OK"),
        }
    }
}

/// Echo of the request plus the run's outcome.
#[derive(Debug, Clone, Serialize)]
pub struct QueryEcho {
    pub domain: String,
    pub status: CheckStatus,
    pub message: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registry {
    pub tld: String,
    pub icann: bool,
}

impl From<&PublicSuffix> for Registry {
    fn from(suffix: &PublicSuffix) -> Self {
        Self {
            tld: suffix.suffix.clone(),
            icann: suffix.icann,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneLevel {
    Root,
    Registry,
    Domain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegationLevel {
    pub zone: String,
    pub level: ZoneLevel,
    pub nameservers: Vec<String>,
    /// Address of the first nameserver; never resolved for the root
    pub address: Option<IpAddr>,
}

/// Root, registry and domain levels in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DelegationChain {
    pub levels: Vec<DelegationLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<String>,
}

impl DelegationChain {
    pub fn push(&mut self, level: DelegationLevel) {
        self.levels.push(level);
    }

    /// Records a level that yielded no nameservers and marks the chain failed.
    pub fn fail(&mut self, level: ZoneLevel, zone: &str) {
        self.levels.push(DelegationLevel {
            zone: zone.to_string(),
            level,
            nameservers: Vec::new(),
            address: None,
        });
        self.failed_at = Some(zone.to_string());
    }

    pub fn is_failed(&self) -> bool {
        self.failed_at.is_some()
    }

    pub fn failed_level(&self) -> Option<ZoneLevel> {
        self.failed_at.as_ref()?;
        self.levels.last().map(|level| level.level)
    }

    pub fn level(&self, level: ZoneLevel) -> Option<&DelegationLevel> {
        self.levels.iter().find(|entry| entry.level == level)
    }

    /// Where to send queries for a level's zone.
    pub fn server_for(&self, level: ZoneLevel) -> Option<SocketAddr> {
        self.level(level)?
            .address
            .map(|ip| SocketAddr::new(ip, DNS_PORT))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoaRecord {
    pub primary_ns: String,
    pub mailbox: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum_ttl: u32,
}

impl From<&SoaData> for SoaRecord {
    fn from(soa: &SoaData) -> Self {
        Self {
            primary_ns: soa.mname.clone(),
            mailbox: soa.rname.clone(),
            serial: soa.serial,
            refresh: soa.refresh,
            retry: soa.retry,
            expire: soa.expire,
            minimum_ttl: soa.minimum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DsRecord {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    /// Uppercase hex
    pub digest: String,
}

impl From<&DsData> for DsRecord {
    fn from(ds: &DsData) -> Self {
        Self {
            key_tag: ds.key_tag,
            algorithm: ds.algorithm,
            digest_type: ds.digest_type,
            digest: hex::encode_upper(&ds.digest),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnskeyRecord {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub key_tag: u16,
    /// Standard base64
    pub public_key: String,
}

impl From<&DnskeyData> for DnskeyRecord {
    fn from(key: &DnskeyData) -> Self {
        Self {
            flags: key.flags,
            protocol: key.protocol,
            algorithm: key.algorithm,
            key_tag: calculate_key_tag(key),
            public_key: BASE64.encode(&key.public_key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsaRecord {
    /// Service name the record was found at, e.g. `_443._tcp.example.com`
    pub record: String,
    pub usage: u8,
    pub selector: u8,
    pub matching_type: u8,
    /// Lowercase hex
    pub certificate: String,
}

impl TlsaRecord {
    pub fn new(record: &str, tlsa: &TlsaData) -> Self {
        Self {
            record: record.to_string(),
            usage: tlsa.usage,
            selector: tlsa.selector,
            matching_type: tlsa.matching_type,
            certificate: hex::encode(&tlsa.data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub check_code: String,
    pub category: String,
    pub description: String,
    pub score_delta: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Normalized registrable domain every query is anchored on
    pub domain: String,
    pub registry: Option<Registry>,
    pub delegation: DelegationChain,
    pub soa: Option<SoaRecord>,
    pub ds_record_count: usize,
    pub dnskey_record_count: usize,
    pub ds_records: Vec<DsRecord>,
    pub dnskey_records: Vec<DnskeyRecord>,
    pub computed_ds_records: Vec<DsRecord>,
    #[serde(rename = "A")]
    pub a: Vec<String>,
    #[serde(rename = "AAAA")]
    pub aaaa: Vec<String>,
    #[serde(rename = "MX")]
    pub mx: Vec<String>,
    pub spf: Vec<String>,
    pub dmarc: Vec<String>,
    pub tlsa_records: Vec<TlsaRecord>,
}

/// Outcome of one domain check. Created empty, filled in stage by stage and
/// frozen when the run ends, whether it succeeded or not.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub question: QueryEcho,
    pub answer: Answer,
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn new(raw_domain: &str) -> Self {
        Self {
            question: QueryEcho {
                domain: raw_domain.to_string(),
                status: CheckStatus::Pending,
                message: String::new(),
                time: Utc::now(),
            },
            answer: Answer::default(),
            findings: Vec::new(),
        }
    }

    pub fn status(&self) -> CheckStatus {
        self.question.status
    }

    /// Sum of every finding's score delta.
    pub fn total_score(&self) -> i32 {
        self.findings.iter().map(|finding| finding.score_delta).sum()
    }

    pub fn finding_codes(&self) -> Vec<&str> {
        self.findings
            .iter()
            .map(|finding| finding.check_code.as_str())
            .collect()
    }

    pub(crate) fn finish(&mut self, status: CheckStatus, message: String) {
        self.question.status = status;
        self.question.message = message;
    }
}

/// Plain-text summary for terminals.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let answer = &self.answer;
        writeln!(f, "Domain:   {}", self.question.domain)?;
        writeln!(f, "Status:   {} ({})", self.question.status, self.question.message)?;
        if let Some(registry) = &answer.registry {
            let kind = if registry.icann { "ICANN" } else { "private" };
            writeln!(f, "Registry: {} ({})", registry.tld, kind)?;
        }

        for level in &answer.delegation.levels {
            let address = level
                .address
                .map(|ip| format!(" @ {}", ip))
                .unwrap_or_default();
            writeln!(
                f,
                "NS {:<20} {}{}",
                level.zone,
                level.nameservers.join(", "),
                address
            )?;
        }

        if let Some(soa) = &answer.soa {
            writeln!(f, "SOA:      {} {} serial {}", soa.primary_ns, soa.mailbox, soa.serial)?;
        }
        writeln!(
            f,
            "DNSSEC:   {} DS, {} DNSKEY, {} computed DS",
            answer.ds_record_count,
            answer.dnskey_record_count,
            answer.computed_ds_records.len()
        )?;
        for ds in &answer.ds_records {
            writeln!(f, "  DS       {} {} {} {}", ds.key_tag, ds.algorithm, ds.digest_type, ds.digest)?;
        }
        for ds in &answer.computed_ds_records {
            writeln!(f, "  computed {} {} {} {}", ds.key_tag, ds.algorithm, ds.digest_type, ds.digest)?;
        }

        for (label, values) in [
            ("A", &answer.a),
            ("AAAA", &answer.aaaa),
            ("MX", &answer.mx),
            ("SPF", &answer.spf),
            ("DMARC", &answer.dmarc),
        ] {
            if !values.is_empty() {
                writeln!(f, "{:<9} {}", format!("{}:", label), values.join(", "))?;
            }
        }
        for tlsa in &answer.tlsa_records {
            writeln!(
                f,
                "TLSA:     {} {} {} {} {}",
                tlsa.record, tlsa.usage, tlsa.selector, tlsa.matching_type, tlsa.certificate
            )?;
        }

        if !self.findings.is_empty() {
            writeln!(f)?;
            for finding in &self.findings {
                writeln!(
                    f,
                    "{:+3}  {:<15} {}",
                    finding.score_delta, finding.check_code, finding.description
                )?;
            }
        }
        write!(f, "Score:    {}", self.total_score())
    }
}
