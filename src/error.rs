use thiserror::Error;

/// Reasons a domain check stops early.
///
/// The display text doubles as the report's status message, so it is part of
/// the output contract. Protocol-level detail stays in the logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("Non ASCII or IDN characters in domain: {0}")]
    InvalidEncoding(String),

    #[error("Domain not OK: {0} is not a registrable domain")]
    InvalidDomain(String),

    #[error("DNS server could not be reached")]
    Unreachable,

    #[error("The name server encountered an internal failure while processing this request (SERVFAIL)")]
    ServerFailure,

    #[error("Some name that ought to exist, does not exist (NXDOMAIN)")]
    NameNotFound,

    #[error("The name server refuses to perform the specified operation for policy or security reasons (REFUSED)")]
    PolicyRefused,

    #[error("No nameservers found for {zone}")]
    NoNameserversFound { zone: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid resolver address: {0}")]
    InvalidResolver(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid EDNS payload size: {0}")]
    InvalidPayloadSize(String),

    #[error("Invalid concurrency limit: {0}")]
    InvalidConcurrency(String),
}
