use super::ParseError;

const DO_BIT: u16 = 0x8000;

/// EDNS0 OPT pseudo-record (RFC 6891)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdnsOpt {
    /// UDP payload size the sender can reassemble
    pub udp_payload_size: u16,
    /// Upper 8 bits of the extended RCODE
    pub extended_rcode: u8,
    pub version: u8,
    pub flags: u16,
    pub options: Vec<EdnsOption>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

impl Default for EdnsOpt {
    fn default() -> Self {
        Self::with_payload_size(4096)
    }
}

impl EdnsOpt {
    pub fn with_payload_size(payload_size: u16) -> Self {
        Self {
            udp_payload_size: payload_size,
            extended_rcode: 0,
            version: 0,
            flags: 0,
            options: Vec::new(),
        }
    }

    /// DNSSEC OK: asks the server to include signature material.
    pub fn do_flag(&self) -> bool {
        (self.flags & DO_BIT) != 0
    }

    pub fn set_do_flag(&mut self, value: bool) {
        if value {
            self.flags |= DO_BIT;
        } else {
            self.flags &= !DO_BIT;
        }
    }

    pub fn payload_size(&self) -> u16 {
        self.udp_payload_size
    }

    /// The OPT record repurposes CLASS as the payload size and TTL as
    /// extended RCODE | version | flags.
    pub fn parse_from_resource(class: u16, ttl: u32, rdata: &[u8]) -> Result<Self, ParseError> {
        let extended_rcode = ((ttl >> 24) & 0xFF) as u8;
        let version = ((ttl >> 16) & 0xFF) as u8;
        let flags = (ttl & 0xFFFF) as u16;

        let mut options = Vec::new();
        let mut pos = 0;
        while pos + 4 <= rdata.len() {
            let code = u16::from_be_bytes([rdata[pos], rdata[pos + 1]]);
            let len = u16::from_be_bytes([rdata[pos + 2], rdata[pos + 3]]) as usize;
            pos += 4;

            let data = rdata
                .get(pos..pos + len)
                .ok_or(ParseError::UnexpectedEnd(pos))?
                .to_vec();
            pos += len;
            options.push(EdnsOption { code, data });
        }

        Ok(EdnsOpt {
            udp_payload_size: class,
            extended_rcode,
            version,
            flags,
            options,
        })
    }

    pub fn to_resource_format(&self) -> (u16, u32, Vec<u8>) {
        let class = self.udp_payload_size;
        let ttl = ((self.extended_rcode as u32) << 24)
            | ((self.version as u32) << 16)
            | (self.flags as u32);

        let mut rdata = Vec::new();
        for option in &self.options {
            rdata.extend_from_slice(&option.code.to_be_bytes());
            rdata.extend_from_slice(&(option.data.len() as u16).to_be_bytes());
            rdata.extend_from_slice(&option.data);
        }

        (class, ttl, rdata)
    }
}

impl std::fmt::Display for EdnsOpt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EDNS0: payload_size={}, version={}, flags=0x{:04x}{}, options={}",
            self.udp_payload_size,
            self.version,
            self.flags,
            if self.do_flag() { " (DO)" } else { "" },
            self.options.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_do_flag() {
        let mut opt = EdnsOpt::default();
        assert!(!opt.do_flag());

        opt.set_do_flag(true);
        assert!(opt.do_flag());
        assert_eq!(opt.flags & 0x8000, 0x8000);

        opt.set_do_flag(false);
        assert!(!opt.do_flag());
    }

    #[test]
    fn test_resource_format_carries_payload_and_flags() {
        let mut opt = EdnsOpt::with_payload_size(1232);
        opt.set_do_flag(true);
        opt.options.push(EdnsOption {
            code: 3,
            data: vec![0x01, 0x02, 0x03],
        });

        let (class, ttl, rdata) = opt.to_resource_format();
        assert_eq!(class, 1232);
        assert_eq!(ttl, 0x8000);

        let parsed = EdnsOpt::parse_from_resource(class, ttl, &rdata).unwrap();
        assert_eq!(parsed, opt);
        assert_eq!(parsed.to_string(), "EDNS0: payload_size=1232, version=0, flags=0x8000 (DO), options=1");
    }

    #[test]
    fn test_truncated_option_is_rejected() {
        let rdata = [0, 3, 0, 8, 1, 2];
        assert!(EdnsOpt::parse_from_resource(4096, 0, &rdata).is_err());
    }
}
