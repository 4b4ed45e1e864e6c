use std::{
    fmt,
    net::{Ipv4Addr, Ipv6Addr},
};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bitstream_io::{BigEndian, BitWrite, BitWriter};

use super::{
    ParseError,
    common::{labels_to_name, name_to_labels, write_name},
    enums::DNSResourceType,
    reader::WireReader,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoaData {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Delegation signer (RFC 4034 5.1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DsData {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

/// Public zone key (RFC 4034 2.1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnskeyData {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DnskeyData {
    /// RDATA as it appears on the wire, the input to key tags and DS digests.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.public_key.len());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        buf.push(self.protocol);
        buf.push(self.algorithm);
        buf.extend_from_slice(&self.public_key);
        buf
    }
}

/// DANE certificate association (RFC 6698 2.1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsaData {
    pub usage: u8,
    pub selector: u8,
    pub matching_type: u8,
    pub data: Vec<u8>,
}

/// Typed record data for the types the checker inspects. Everything else is
/// kept as raw bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RData {
    #[default]
    Empty,
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(String),
    CNAME(String),
    MX { preference: u16, exchange: String },
    TXT(Vec<String>),
    SOA(SoaData),
    DS(DsData),
    DNSKEY(DnskeyData),
    TLSA(TlsaData),
    Unknown(Vec<u8>),
}

impl RData {
    /// Decodes `rdlength` bytes at the reader's position. Embedded names may be
    /// compressed, so the reader must span the whole message.
    pub fn decode(
        rtype: DNSResourceType,
        reader: &mut WireReader<'_>,
        rdlength: u16,
    ) -> Result<Self, ParseError> {
        let start = reader.position();
        let end = start + rdlength as usize;
        let invalid = || ParseError::InvalidRData(rtype);

        let rdata = match rtype {
            DNSResourceType::A => {
                let octets = reader.read_slice(4).map_err(|_| invalid())?;
                RData::A(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))
            }
            DNSResourceType::AAAA => {
                let octets: [u8; 16] = reader
                    .read_slice(16)
                    .map_err(|_| invalid())?
                    .try_into()
                    .map_err(|_| invalid())?;
                RData::AAAA(Ipv6Addr::from(octets))
            }
            DNSResourceType::NS => RData::NS(labels_to_name(&reader.read_name()?)),
            DNSResourceType::CNAME => RData::CNAME(labels_to_name(&reader.read_name()?)),
            DNSResourceType::MX => {
                let preference = reader.read_u16()?;
                let exchange = labels_to_name(&reader.read_name()?);
                RData::MX {
                    preference,
                    exchange,
                }
            }
            DNSResourceType::TXT => {
                let mut strings = Vec::new();
                while reader.position() < end {
                    let len = reader.read_u8()? as usize;
                    let text = reader.read_slice(len).map_err(|_| invalid())?;
                    strings.push(String::from_utf8_lossy(text).into_owned());
                }
                RData::TXT(strings)
            }
            DNSResourceType::SOA => RData::SOA(SoaData {
                mname: labels_to_name(&reader.read_name()?),
                rname: labels_to_name(&reader.read_name()?),
                serial: reader.read_u32()?,
                refresh: reader.read_u32()?,
                retry: reader.read_u32()?,
                expire: reader.read_u32()?,
                minimum: reader.read_u32()?,
            }),
            DNSResourceType::DS => {
                if rdlength < 4 {
                    return Err(invalid());
                }
                RData::DS(DsData {
                    key_tag: reader.read_u16()?,
                    algorithm: reader.read_u8()?,
                    digest_type: reader.read_u8()?,
                    digest: reader.read_slice(rdlength as usize - 4)?.to_vec(),
                })
            }
            DNSResourceType::DNSKEY => {
                if rdlength < 4 {
                    return Err(invalid());
                }
                RData::DNSKEY(DnskeyData {
                    flags: reader.read_u16()?,
                    protocol: reader.read_u8()?,
                    algorithm: reader.read_u8()?,
                    public_key: reader.read_slice(rdlength as usize - 4)?.to_vec(),
                })
            }
            DNSResourceType::TLSA => {
                if rdlength < 3 {
                    return Err(invalid());
                }
                RData::TLSA(TlsaData {
                    usage: reader.read_u8()?,
                    selector: reader.read_u8()?,
                    matching_type: reader.read_u8()?,
                    data: reader.read_slice(rdlength as usize - 3)?.to_vec(),
                })
            }
            _ if rdlength == 0 => RData::Empty,
            _ => RData::Unknown(reader.read_slice(rdlength as usize)?.to_vec()),
        };

        if reader.position() > end {
            return Err(invalid());
        }
        reader.seek(end);
        Ok(rdata)
    }

    /// Encodes the record data with uncompressed names.
    pub fn encode(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::new();
        let mut writer = BitWriter::endian(&mut buf, BigEndian);

        match self {
            RData::Empty => {}
            RData::A(addr) => writer.write_bytes(&addr.octets())?,
            RData::AAAA(addr) => writer.write_bytes(&addr.octets())?,
            RData::NS(name) | RData::CNAME(name) => write_name(&mut writer, &name_to_labels(name))?,
            RData::MX {
                preference,
                exchange,
            } => {
                writer.write_var::<u16>(16, *preference)?;
                write_name(&mut writer, &name_to_labels(exchange))?;
            }
            RData::TXT(strings) => {
                for text in strings {
                    // character-strings carry a one-octet length
                    for chunk in text.as_bytes().chunks(255) {
                        writer.write_var::<u8>(8, chunk.len() as u8)?;
                        writer.write_bytes(chunk)?;
                    }
                }
            }
            RData::SOA(soa) => {
                write_name(&mut writer, &name_to_labels(&soa.mname))?;
                write_name(&mut writer, &name_to_labels(&soa.rname))?;
                for value in [soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    writer.write_var::<u32>(32, value)?;
                }
            }
            RData::DS(ds) => {
                writer.write_var::<u16>(16, ds.key_tag)?;
                writer.write_var::<u8>(8, ds.algorithm)?;
                writer.write_var::<u8>(8, ds.digest_type)?;
                writer.write_bytes(&ds.digest)?;
            }
            RData::DNSKEY(key) => writer.write_bytes(&key.to_wire())?,
            RData::TLSA(tlsa) => {
                writer.write_var::<u8>(8, tlsa.usage)?;
                writer.write_var::<u8>(8, tlsa.selector)?;
                writer.write_var::<u8>(8, tlsa.matching_type)?;
                writer.write_bytes(&tlsa.data)?;
            }
            RData::Unknown(bytes) => writer.write_bytes(bytes)?,
        }

        Ok(buf)
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::Empty => Ok(()),
            RData::A(addr) => write!(f, "{}", addr),
            RData::AAAA(addr) => write!(f, "{}", addr),
            RData::NS(name) | RData::CNAME(name) => write!(f, "{}", name),
            RData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RData::TXT(strings) => {
                let quoted: Vec<String> = strings.iter().map(|s| format!("\"{}\"", s)).collect();
                write!(f, "{}", quoted.join(" "))
            }
            RData::SOA(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            RData::DS(ds) => write!(
                f,
                "{} {} {} {}",
                ds.key_tag,
                ds.algorithm,
                ds.digest_type,
                hex::encode_upper(&ds.digest)
            ),
            RData::DNSKEY(key) => write!(
                f,
                "{} {} {} {}",
                key.flags,
                key.protocol,
                key.algorithm,
                BASE64.encode(&key.public_key)
            ),
            RData::TLSA(tlsa) => write!(
                f,
                "{} {} {} {}",
                tlsa.usage,
                tlsa.selector,
                tlsa.matching_type,
                hex::encode(&tlsa.data)
            ),
            RData::Unknown(bytes) => write!(f, "\\# {} {}", bytes.len(), hex::encode(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(rtype: DNSResourceType, bytes: &[u8]) -> Result<RData, ParseError> {
        let mut reader = WireReader::new(bytes, 0);
        RData::decode(rtype, &mut reader, bytes.len() as u16)
    }

    #[test]
    fn test_txt_keeps_each_character_string() {
        let rdata = decode(DNSResourceType::TXT, b"\x06v=spf1\x04 -all").unwrap();
        assert_eq!(rdata, RData::TXT(vec!["v=spf1".into(), " -all".into()]));
    }

    #[test]
    fn test_ds_digest_renders_as_uppercase_hex() {
        let rdata = decode(DNSResourceType::DS, &[0xEC, 0x45, 8, 2, 0xab, 0xcd]).unwrap();
        assert_eq!(rdata.to_string(), "60485 8 2 ABCD");
    }

    #[test]
    fn test_dnskey_renders_key_as_base64() {
        let rdata = decode(DNSResourceType::DNSKEY, &[1, 1, 3, 13, 0xff, 0xee]).unwrap();
        match &rdata {
            RData::DNSKEY(key) => {
                assert_eq!(key.flags, 257);
                assert_eq!(key.protocol, 3);
                assert_eq!(key.public_key, vec![0xff, 0xee]);
            }
            other => panic!("unexpected rdata {:?}", other),
        }
        assert_eq!(rdata.to_string(), "257 3 13 /+4=");
    }

    #[test]
    fn test_short_a_record_is_invalid() {
        assert_eq!(
            decode(DNSResourceType::A, &[10, 0, 0]),
            Err(ParseError::InvalidRData(DNSResourceType::A))
        );
    }

    #[test]
    fn test_tlsa_association_data_renders_as_lowercase_hex() {
        let rdata = decode(DNSResourceType::TLSA, &[3, 1, 1, 0xAB, 0x01]).unwrap();
        assert_eq!(rdata.to_string(), "3 1 1 ab01");
    }

    #[test]
    fn test_unknown_type_is_kept_raw() {
        let rdata = decode(DNSResourceType::Unknown(999), &[1, 2, 3]).unwrap();
        assert_eq!(rdata, RData::Unknown(vec![1, 2, 3]));
    }
}
