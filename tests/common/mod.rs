//! Shared helpers for the integration tests: a scripted in-memory transport
//! and record builders.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use dnscheck::{
    CheckConfig, DomainChecker, PublicSuffixList,
    dns::{
        constants::DNSRcode,
        enums::DNSResourceType,
        rdata::{DnskeyData, DsData, RData, SoaData, TlsaData},
        resource::DNSResource,
    },
    transport::{DnsRequest, DnsResponse, DnsTransport, Protocol, TransportError},
};

pub const RESOLVER: &str = "198.51.100.1:53";
pub const BOOTSTRAP: &str = "198.51.100.2";
pub const REGISTRY_NS_IP: &str = "192.0.2.10";
pub const DOMAIN_NS_IP: &str = "192.0.2.20";

/// DNSKEY from RFC 4034 section 5.4 (owner dskey.example.com, key tag 60485)
pub const RFC4034_KEY: &str = "AQOeiiR0GOMYkDshWoSKz9XzfwJr1AYtsmx3TGkJaNXVbfi/2pHm822aJ5iI9BMzNXxeYCmZDRD99WYwYqUSdjMmmAphXdvxegXd/M5+X7OrzKBaMbCVdFLUUh6DhweJBjEVv5f2wwjM9XzcnOf+EPbtG9DMBmADjFDc2w/rljwvFw==";
pub const RFC4034_SHA1: &str = "2BB183AF5F22588179A53B0A98631FAD1A292118";
pub const RFC4034_SHA256: &str = "D4B7D520E7BB5F0F67674A0CCEB1E3E0614B93C4F9E99B8383F6A1E4469DA50A";

type ScriptKey = (String, DNSResourceType, Protocol);

/// Answers from a fixed script keyed by (name, type, protocol). Unscripted
/// questions get an empty NOERROR answer. Every request is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    script: HashMap<ScriptKey, Result<DnsResponse, TransportError>>,
    calls: Mutex<Vec<DnsRequest>>,
}

fn key(name: &str, rtype: DNSResourceType, protocol: Protocol) -> ScriptKey {
    (
        name.trim_end_matches('.').to_ascii_lowercase(),
        rtype,
        protocol,
    )
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same response over UDP and TCP
    pub fn respond(&mut self, name: &str, rtype: DNSResourceType, response: DnsResponse) {
        self.respond_over(Protocol::Udp, name, rtype, response.clone());
        self.respond_over(Protocol::Tcp, name, rtype, response);
    }

    pub fn respond_over(
        &mut self,
        protocol: Protocol,
        name: &str,
        rtype: DNSResourceType,
        response: DnsResponse,
    ) {
        self.script.insert(key(name, rtype, protocol), Ok(response));
    }

    pub fn fail(&mut self, name: &str, rtype: DNSResourceType) {
        for protocol in [Protocol::Udp, Protocol::Tcp] {
            self.script.insert(
                key(name, rtype, protocol),
                Err(TransportError::Timeout {
                    server: RESOLVER.parse().unwrap(),
                    timeout: Duration::from_secs(1),
                }),
            );
        }
    }

    pub fn answer(&mut self, name: &str, rtype: DNSResourceType, rdata: Vec<RData>) {
        let answers = rdata
            .into_iter()
            .map(|data| record(name, rtype, data))
            .collect();
        self.respond(name, rtype, response(answers));
    }

    pub fn calls(&self) -> Vec<DnsRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, name: &str, rtype: DNSResourceType) -> Vec<DnsRequest> {
        let name = name.trim_end_matches('.').to_ascii_lowercase();
        self.calls()
            .into_iter()
            .filter(|call| {
                call.rtype == rtype && call.name.trim_end_matches('.').to_ascii_lowercase() == name
            })
            .collect()
    }
}

#[async_trait]
impl DnsTransport for ScriptedTransport {
    async fn exchange(&self, request: &DnsRequest) -> Result<DnsResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());
        self.script
            .get(&key(&request.name, request.rtype, request.protocol))
            .cloned()
            .unwrap_or_else(|| Ok(DnsResponse::default()))
    }
}

pub fn record(name: &str, rtype: DNSResourceType, rdata: RData) -> DNSResource {
    DNSResource::new(name, rtype, 300, rdata).unwrap()
}

pub fn response(answers: Vec<DNSResource>) -> DnsResponse {
    DnsResponse {
        rcode: DNSRcode::NOERROR,
        answers,
        ..DnsResponse::default()
    }
}

pub fn rcode_response(rcode: u8) -> DnsResponse {
    DnsResponse {
        rcode,
        ..DnsResponse::default()
    }
}

pub fn soa(domain: &str) -> RData {
    RData::SOA(SoaData {
        mname: format!("ns1.{}.", domain),
        rname: format!("hostmaster.{}.", domain),
        serial: 2024010101,
        refresh: 7200,
        retry: 3600,
        expire: 1209600,
        minimum: 3600,
    })
}

pub fn rfc4034_dnskey() -> DnskeyData {
    DnskeyData {
        flags: 256,
        protocol: 3,
        algorithm: 5,
        public_key: BASE64.decode(RFC4034_KEY).unwrap(),
    }
}

pub fn ds_for(key_tag: u16, algorithm: u8, digest_type: u8, digest_hex: &str) -> DsData {
    DsData {
        key_tag,
        algorithm,
        digest_type,
        digest: hex::decode(digest_hex).unwrap(),
    }
}

pub fn tlsa() -> RData {
    RData::TLSA(TlsaData {
        usage: 3,
        selector: 1,
        matching_type: 1,
        data: vec![0xab; 32],
    })
}

pub fn ns(host: &str) -> RData {
    RData::NS(host.to_string())
}

pub fn a(ip: &str) -> RData {
    RData::A(ip.parse().unwrap())
}

pub fn aaaa(ip: &str) -> RData {
    RData::AAAA(ip.parse().unwrap())
}

pub fn txt(value: &str) -> RData {
    RData::TXT(vec![value.to_string()])
}

pub fn mx(preference: u16, exchange: &str) -> RData {
    RData::MX {
        preference,
        exchange: exchange.to_string(),
    }
}

/// Script the reachability gate and a complete delegation for `domain`
/// under `tld`. Registry and domain nameservers resolve to
/// [`REGISTRY_NS_IP`] and [`DOMAIN_NS_IP`].
pub fn delegated(domain: &str, tld: &str) -> ScriptedTransport {
    let mut transport = ScriptedTransport::new();
    transport.answer(domain, DNSResourceType::SOA, vec![soa(domain)]);
    transport.answer(
        ".",
        DNSResourceType::NS,
        vec![ns("b.root-servers.net."), ns("a.root-servers.net.")],
    );

    let registry_ns = format!("a.nic.{}.", tld);
    transport.answer(tld, DNSResourceType::NS, vec![ns(&registry_ns)]);
    transport.answer(&registry_ns, DNSResourceType::A, vec![a(REGISTRY_NS_IP)]);

    let domain_ns1 = format!("ns1.{}.", domain);
    let domain_ns2 = format!("ns2.{}.", domain);
    transport.answer(
        domain,
        DNSResourceType::NS,
        vec![ns(&domain_ns2), ns(&domain_ns1)],
    );
    transport.answer(&domain_ns1, DNSResourceType::A, vec![a(DOMAIN_NS_IP)]);
    transport
}

pub fn test_config() -> CheckConfig {
    CheckConfig {
        recursive_resolver: RESOLVER.parse().unwrap(),
        default_nameserver: BOOTSTRAP.to_string(),
        query_timeout: Duration::from_secs(1),
        ..CheckConfig::default()
    }
}

pub fn checker(transport: Arc<ScriptedTransport>) -> DomainChecker {
    DomainChecker::new(
        test_config(),
        transport,
        Arc::new(PublicSuffixList::embedded().unwrap()),
    )
}

pub fn socket(ip: &str) -> SocketAddr {
    SocketAddr::new(ip.parse().unwrap(), 53)
}
