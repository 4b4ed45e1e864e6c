//! Control scoring.
//!
//! Every check code maps to a fixed category and point value. The table is
//! part of the report contract and must not drift.

use super::report::Finding;
use crate::psl::PublicSuffix;

const PRESENT_POINTS: i32 = 5;
const ABSENT_POINTS: i32 = -5;
const NO_MX_POINTS: i32 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    IcannSuffix,
    Nameservers,
    DelegationSigner,
    Ipv6,
    MailExchanger,
    Dmarc,
    Spf,
    DaneHttps,
    DaneMail,
    DnsKey,
}

impl Control {
    pub fn code(self) -> &'static str {
        match self {
            Control::IcannSuffix => "DNS-ICANN-001",
            Control::Nameservers => "DNS-NS-001",
            Control::DelegationSigner => "DNS-DNSSEC-001",
            Control::Ipv6 => "DNS-IPV6-001",
            Control::MailExchanger => "DNS-EMAIL-001",
            Control::Dmarc => "DNS-EMAIL-002",
            Control::Spf => "DNS-EMAIL-003",
            Control::DaneHttps => "DNS-DANE-001",
            Control::DaneMail => "DNS-DANE-002",
            Control::DnsKey => "DNS-DNSSEC-003",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            Control::IcannSuffix | Control::Nameservers => "DNS",
            Control::DelegationSigner | Control::DnsKey => "DNSSEC",
            Control::Ipv6 => "IPv6",
            Control::MailExchanger | Control::Dmarc | Control::Spf => "Email",
            Control::DaneHttps | Control::DaneMail => "DANE",
        }
    }
}

impl Finding {
    pub fn new(control: Control, score_delta: i32, description: impl Into<String>) -> Self {
        Finding {
            check_code: control.code().to_string(),
            category: control.category().to_string(),
            description: description.into(),
            score_delta,
        }
    }

    fn presence(control: Control, present: bool, found: String, missing: String) -> Self {
        if present {
            Finding::new(control, PRESENT_POINTS, found)
        } else {
            Finding::new(control, ABSENT_POINTS, missing)
        }
    }
}

/// What the verifier and collector saw, reduced to what scoring needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observations {
    pub ds_present: bool,
    pub dnskey_present: bool,
    pub aaaa_present: bool,
    pub dmarc_present: bool,
    pub spf_present: bool,
    pub apex_tlsa_present: bool,
    /// One entry per MX host, in MX order: (host, TLSA present)
    pub mx_tlsa: Vec<(String, bool)>,
}

/// Informational; carries no points either way.
pub fn registry_finding(suffix: &PublicSuffix) -> Finding {
    let description = if suffix.icann {
        format!("Top-level domain {} is an ICANN-managed suffix", suffix.suffix)
    } else {
        format!("Top-level domain {} is not an ICANN-managed suffix", suffix.suffix)
    };
    Finding::new(Control::IcannSuffix, 0, description)
}

pub fn missing_nameservers_finding(domain: &str) -> Finding {
    Finding::new(
        Control::Nameservers,
        ABSENT_POINTS,
        format!("No nameservers found for {}", domain),
    )
}

/// Posture findings in evaluation order.
pub fn score(observations: &Observations) -> Vec<Finding> {
    let mut findings = vec![
        Finding::presence(
            Control::DelegationSigner,
            observations.ds_present,
            "DS record found at registry".into(),
            "No DS record found at registry".into(),
        ),
        Finding::presence(
            Control::Ipv6,
            observations.aaaa_present,
            "AAAA records found for domain".into(),
            "No AAAA records found for domain".into(),
        ),
    ];

    if observations.mx_tlsa.is_empty() {
        findings.push(Finding::new(
            Control::MailExchanger,
            NO_MX_POINTS,
            "No MX records found for domain",
        ));
    }

    findings.push(Finding::presence(
        Control::Dmarc,
        observations.dmarc_present,
        "DMARC record found".into(),
        "No DMARC record found".into(),
    ));
    findings.push(Finding::presence(
        Control::Spf,
        observations.spf_present,
        "SPF record found".into(),
        "No SPF record found".into(),
    ));
    findings.push(Finding::presence(
        Control::DaneHttps,
        observations.apex_tlsa_present,
        "TLSA record found for HTTPS".into(),
        "No TLSA record found for HTTPS".into(),
    ));

    for (host, present) in &observations.mx_tlsa {
        findings.push(Finding::presence(
            Control::DaneMail,
            *present,
            format!("TLSA record found for mail server {}", host),
            format!("No TLSA record found for mail server {}", host),
        ));
    }

    findings.push(Finding::presence(
        Control::DnsKey,
        observations.dnskey_present,
        "DNSKEY records found at domain".into(),
        "No DNSKEY records found at domain".into(),
    ));

    findings
}
