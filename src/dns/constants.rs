/// Response codes the checker distinguishes (RFC 1035 4.1.1)
pub struct DNSRcode;

impl DNSRcode {
    pub const NOERROR: u8 = 0; // No error
    pub const FORMERR: u8 = 1; // Format error
    pub const SERVFAIL: u8 = 2; // Server failure
    pub const NXDOMAIN: u8 = 3; // Name error
    pub const NOTIMP: u8 = 4; // Not implemented
    pub const REFUSED: u8 = 5; // Query refused

    pub fn name(rcode: u8) -> &'static str {
        match rcode {
            Self::NOERROR => "NOERROR",
            Self::FORMERR => "FORMERR",
            Self::SERVFAIL => "SERVFAIL",
            Self::NXDOMAIN => "NXDOMAIN",
            Self::NOTIMP => "NOTIMP",
            Self::REFUSED => "REFUSED",
            _ => "UNKNOWN",
        }
    }
}

pub const DNS_PORT: u16 = 53;

/// Largest datagram we are prepared to receive.
pub const MAX_UDP_MESSAGE: usize = 65_535;

/// Longest encoded domain name, including length octets.
pub const MAX_NAME_LEN: usize = 255;

pub const MAX_LABEL_LEN: usize = 63;
