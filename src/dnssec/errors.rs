use thiserror::Error;

use super::algorithm::DnsSecAlgorithm;

/// Reasons a DS record cannot be computed for a DNSKEY
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsSecError {
    #[error("Algorithm {0} has no mandated digest")]
    UnsupportedAlgorithm(DnsSecAlgorithm),

    #[error("Unsupported digest type: {0}")]
    UnsupportedDigestType(u8),

    #[error("Invalid owner name: {0}")]
    InvalidOwnerName(String),
}

pub type Result<T> = std::result::Result<T, DnsSecError>;
