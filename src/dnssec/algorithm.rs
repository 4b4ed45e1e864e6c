use std::fmt;

/// DNSKEY algorithm numbers (IANA DNS Security Algorithm Numbers registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsSecAlgorithm {
    RsaMd5,
    Dsa,
    RsaSha1,
    RsaSha1Nsec3Sha1,
    RsaSha256,
    RsaSha512,
    EccGost,
    EcdsaP256Sha256,
    EcdsaP384Sha384,
    Ed25519,
    Ed448,
    Other(u8),
}

impl From<u8> for DnsSecAlgorithm {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::RsaMd5,
            3 => Self::Dsa,
            5 => Self::RsaSha1,
            7 => Self::RsaSha1Nsec3Sha1,
            8 => Self::RsaSha256,
            10 => Self::RsaSha512,
            12 => Self::EccGost,
            13 => Self::EcdsaP256Sha256,
            14 => Self::EcdsaP384Sha384,
            15 => Self::Ed25519,
            16 => Self::Ed448,
            other => Self::Other(other),
        }
    }
}

impl DnsSecAlgorithm {
    /// Keys of algorithms without a mandated signing hash (RSAMD5, DSA, GOST,
    /// unassigned numbers) are never digested into computed DS records.
    pub fn has_mandated_digest(self) -> bool {
        !matches!(self, Self::RsaMd5 | Self::Dsa | Self::EccGost | Self::Other(_))
    }
}

impl fmt::Display for DnsSecAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsaMd5 => write!(f, "RSAMD5"),
            Self::Dsa => write!(f, "DSA"),
            Self::RsaSha1 => write!(f, "RSASHA1"),
            Self::RsaSha1Nsec3Sha1 => write!(f, "RSASHA1-NSEC3-SHA1"),
            Self::RsaSha256 => write!(f, "RSASHA256"),
            Self::RsaSha512 => write!(f, "RSASHA512"),
            Self::EccGost => write!(f, "ECC-GOST"),
            Self::EcdsaP256Sha256 => write!(f, "ECDSAP256SHA256"),
            Self::EcdsaP384Sha384 => write!(f, "ECDSAP384SHA384"),
            Self::Ed25519 => write!(f, "ED25519"),
            Self::Ed448 => write!(f, "ED448"),
            Self::Other(value) => write!(f, "ALG{}", value),
        }
    }
}
