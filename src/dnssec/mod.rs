//! DNSSEC material checks: DS recomputation from published DNSKEYs.
//!
//! Signatures are not validated; only the presence of DS/DNSKEY material and
//! the digests linking them are examined.

pub mod algorithm;
pub mod digest;
pub mod ds;
pub mod errors;
pub mod key_tag;

pub use algorithm::DnsSecAlgorithm;
pub use digest::DigestType;
pub use ds::{compute_ds, compute_expected_ds};
pub use errors::DnsSecError;
pub use key_tag::calculate_key_tag;
