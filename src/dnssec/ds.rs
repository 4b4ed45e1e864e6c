use tracing::trace;

use super::{
    algorithm::DnsSecAlgorithm,
    digest::DigestType,
    errors::{DnsSecError, Result},
    key_tag::calculate_key_tag,
};
use crate::dns::{
    common::canonical_wire_name,
    rdata::{DnskeyData, DsData},
};

/// Computes the DS record a parent would publish for `key` (RFC 4034 5.1.4):
/// digest = hash(canonical owner name | DNSKEY RDATA).
pub fn compute_ds(owner: &str, key: &DnskeyData, digest_type: u8) -> Result<DsData> {
    let hasher =
        DigestType::from_u8(digest_type).ok_or(DnsSecError::UnsupportedDigestType(digest_type))?;

    let mut data =
        canonical_wire_name(owner).map_err(|_| DnsSecError::InvalidOwnerName(owner.to_string()))?;
    data.extend_from_slice(&key.to_wire());

    let digest = hasher
        .digest(&data)
        .ok_or(DnsSecError::UnsupportedDigestType(digest_type))?;
    let key_tag = calculate_key_tag(key);
    trace!("Computed {} DS for {} key tag {}", hasher, owner, key_tag);

    Ok(DsData {
        key_tag,
        algorithm: key.algorithm,
        digest_type,
        digest,
    })
}

/// Computes DS records for every key whose algorithm has a mandated digest,
/// all with the digest type of the first published DS record.
///
/// Returns nothing unless both sets are non-empty. Keys that cannot be
/// digested are skipped.
pub fn compute_expected_ds(owner: &str, published: &[DsData], keys: &[DnskeyData]) -> Vec<DsData> {
    let Some(first) = published.first() else {
        return Vec::new();
    };

    keys.iter()
        .filter_map(|key| {
            let algorithm = DnsSecAlgorithm::from(key.algorithm);
            let result = if algorithm.has_mandated_digest() {
                compute_ds(owner, key, first.digest_type)
            } else {
                Err(DnsSecError::UnsupportedAlgorithm(algorithm))
            };
            match result {
                Ok(ds) => Some(ds),
                Err(e) => {
                    trace!("Skipping DNSKEY {} for {}: {}", calculate_key_tag(key), owner, e);
                    None
                }
            }
        })
        .collect()
}
