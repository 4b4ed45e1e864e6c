use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::{PacketComponent, labels_to_name, name_to_labels},
    enums::{DNSResourceClass, DNSResourceType},
    rdata::RData,
    reader::WireReader,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSResource {
    pub labels: Vec<String>,
    pub rtype: DNSResourceType,
    pub rclass: DNSResourceClass,
    pub ttl: u32,
    pub rdata: Vec<u8>,
    pub parsed_rdata: RData,
}

impl DNSResource {
    /// Builds an IN-class record, encoding `rdata` for the wire.
    pub fn new(
        name: &str,
        rtype: DNSResourceType,
        ttl: u32,
        rdata: RData,
    ) -> Result<Self, ParseError> {
        Ok(DNSResource {
            labels: name_to_labels(name),
            rtype,
            rclass: DNSResourceClass::IN,
            ttl,
            rdata: rdata.encode()?,
            parsed_rdata: rdata,
        })
    }

    pub fn name(&self) -> String {
        labels_to_name(&self.labels)
    }

    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, ParseError> {
        let labels = reader.read_name()?;
        let rtype: DNSResourceType = reader.read_u16()?.into();
        let rclass = reader.read_u16()?.into();
        let ttl = reader.read_u32()?;
        let rdlength = reader.read_u16()?;

        let start = reader.position();
        let rdata = reader.read_slice(rdlength as usize)?.to_vec();
        reader.seek(start);
        let parsed_rdata = RData::decode(rtype, reader, rdlength)?;

        Ok(DNSResource {
            labels,
            rtype,
            rclass,
            ttl,
            rdata,
            parsed_rdata,
        })
    }
}

impl PacketComponent for DNSResource {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        self.write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.rtype.into())?;
        writer.write_var::<u16>(16, self.rclass.into())?;
        writer.write_var::<u32>(32, self.ttl)?;
        writer.write_var::<u16>(16, self.rdata.len() as u16)?;
        writer.write_bytes(&self.rdata)?;
        Ok(())
    }
}
