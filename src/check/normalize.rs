use std::net::IpAddr;

use crate::{
    error::CheckError,
    psl::{PublicSuffix, PublicSuffixList},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDomain {
    /// Registrable domain, lowercase ASCII without a trailing dot
    pub name: String,
    pub suffix: PublicSuffix,
}

/// Reduces user input to the registrable domain every query is anchored on.
pub fn normalize(raw: &str, psl: &PublicSuffixList) -> Result<NormalizedDomain, CheckError> {
    let trimmed = raw.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(CheckError::InvalidDomain(raw.to_string()));
    }

    let ascii = idna::domain_to_ascii_strict(trimmed)
        .map_err(|_| CheckError::InvalidEncoding(raw.to_string()))?;

    if ascii.parse::<IpAddr>().is_ok() {
        return Err(CheckError::InvalidDomain(raw.to_string()));
    }

    let suffix = psl
        .public_suffix(&ascii)
        .ok_or_else(|| CheckError::InvalidDomain(raw.to_string()))?;
    let name = psl
        .registrable_domain(&ascii)
        .ok_or_else(|| CheckError::InvalidDomain(raw.to_string()))?;

    Ok(NormalizedDomain { name, suffix })
}
