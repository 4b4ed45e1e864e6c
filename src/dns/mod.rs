pub mod common;
pub mod constants;
pub mod edns;
pub mod enums;
pub mod header;
pub mod question;
pub mod rdata;
pub mod reader;
pub mod resource;

use bitstream_io::{BigEndian, BitReader, BitWriter};
use common::PacketComponent;
use edns::EdnsOpt;
use enums::{DNSResourceClass, DNSResourceType};
use header::DNSHeader;
use question::DNSQuestion;
use reader::WireReader;
use resource::DNSResource;
use thiserror::Error;
use tracing::trace;

const HEADER_LEN: usize = 12;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSPacket {
    pub header: DNSHeader,
    pub questions: Vec<DNSQuestion>,
    pub answers: Vec<DNSResource>,
    pub authorities: Vec<DNSResource>,
    pub resources: Vec<DNSResource>,
    /// EDNS0 OPT record if present (extracted from additional records)
    pub edns: Option<EdnsOpt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid DNS header")]
    InvalidHeader,
    #[error("Invalid DNS label")]
    InvalidLabel,
    #[error("Domain name exceeds 255 octets")]
    NameTooLong,
    #[error("Too many compression pointers in domain name")]
    PointerLoop,
    #[error("Unexpected end of message at offset {0}")]
    UnexpectedEnd(usize),
    #[error("Invalid {0} record data")]
    InvalidRData(DNSResourceType),
    #[error("Invalid bit stream: {0}")]
    InvalidBitStream(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::InvalidBitStream(e.to_string())
    }
}

impl DNSPacket {
    /// Builds a recursive query for a single name and type.
    pub fn query(id: u16, name: &str, qtype: DNSResourceType) -> Self {
        let header = DNSHeader {
            id,
            rd: true,
            qdcount: 1,
            ..DNSHeader::default()
        };

        DNSPacket {
            header,
            questions: vec![DNSQuestion::new(name, qtype)],
            ..DNSPacket::default()
        }
    }

    /// Attaches an OPT pseudo-record advertising `payload_size`, optionally with DO set.
    pub fn add_edns(&mut self, payload_size: u16, dnssec_ok: bool) {
        let mut edns = EdnsOpt::with_payload_size(payload_size);
        edns.set_do_flag(dnssec_ok);
        self.edns = Some(edns);
    }

    /// Decodes only the fixed 12 byte header.
    pub fn parse_header(buf: &[u8]) -> Result<DNSHeader, ParseError> {
        if buf.len() < HEADER_LEN {
            return Err(ParseError::InvalidHeader);
        }

        let mut header_reader = BitReader::<_, BigEndian>::new(&buf[..HEADER_LEN]);
        let mut header = DNSHeader::default();
        header.read(&mut header_reader)?;
        Ok(header)
    }

    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        let mut packet = DNSPacket {
            header: Self::parse_header(buf)?,
            ..DNSPacket::default()
        };

        let mut reader = WireReader::new(buf, HEADER_LEN);
        for _ in 0..packet.header.qdcount {
            packet.questions.push(DNSQuestion::decode(&mut reader)?);
        }
        for _ in 0..packet.header.ancount {
            packet.answers.push(DNSResource::decode(&mut reader)?);
        }
        for _ in 0..packet.header.nscount {
            packet.authorities.push(DNSResource::decode(&mut reader)?);
        }
        for _ in 0..packet.header.arcount {
            let resource = DNSResource::decode(&mut reader)?;
            if resource.rtype == DNSResourceType::OPT {
                packet.edns = Some(EdnsOpt::parse_from_resource(
                    resource.rclass.into(),
                    resource.ttl,
                    &resource.rdata,
                )?);
            } else {
                packet.resources.push(resource);
            }
        }

        trace!(
            id = packet.header.id,
            answers = packet.answers.len(),
            authorities = packet.authorities.len(),
            additional = packet.resources.len(),
            edns = packet.edns.is_some(),
            "parsed DNS message"
        );

        Ok(packet)
    }

    /// Encodes the packet. Section counts are taken from the sections, not the header.
    pub fn serialize(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::with_capacity(512);
        let mut writer = BitWriter::endian(&mut buf, BigEndian);

        let opt = self.edns.as_ref().map(|edns| {
            let (class, ttl, rdata) = edns.to_resource_format();
            DNSResource {
                labels: Vec::new(),
                rtype: DNSResourceType::OPT,
                rclass: DNSResourceClass::from(class),
                ttl,
                rdata,
                ..DNSResource::default()
            }
        });

        let header = DNSHeader {
            qdcount: self.questions.len() as u16,
            ancount: self.answers.len() as u16,
            nscount: self.authorities.len() as u16,
            arcount: (self.resources.len() + usize::from(opt.is_some())) as u16,
            ..self.header.clone()
        };
        header.write(&mut writer)?;

        for question in &self.questions {
            question.write(&mut writer)?;
        }
        for resource in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.resources)
            .chain(opt.as_ref())
        {
            resource.write(&mut writer)?;
        }

        Ok(buf)
    }
}
