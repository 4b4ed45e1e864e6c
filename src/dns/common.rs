use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    constants::{MAX_LABEL_LEN, MAX_NAME_LEN},
};

pub trait PacketComponent {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError>;

    /// Writes an uncompressed name followed by the root label.
    fn write_labels<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
        labels: &[String],
    ) -> Result<(), ParseError> {
        write_name(writer, labels)
    }
}

pub(crate) fn write_name<E: Endianness>(
    writer: &mut BitWriter<&mut Vec<u8>, E>,
    labels: &[String],
) -> Result<(), ParseError> {
    let encoded_len: usize = labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1;
    if encoded_len > MAX_NAME_LEN {
        return Err(ParseError::NameTooLong);
    }

    for label in labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(ParseError::InvalidLabel);
        }
        writer.write_var::<u8>(8, label.len() as u8)?;
        writer.write_bytes(label.as_bytes())?;
    }
    writer.write_var::<u8>(8, 0)?;

    Ok(())
}

/// Splits a presentation-format name into labels. The root label is implicit,
/// so "." and "" both yield no labels.
pub fn name_to_labels(name: &str) -> Vec<String> {
    name.trim_end_matches('.')
        .split('.')
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Renders labels as an absolute name with a trailing dot.
pub fn labels_to_name(labels: &[String]) -> String {
    if labels.is_empty() {
        return ".".to_string();
    }
    let mut name = labels.join(".");
    name.push('.');
    name
}

/// Uncompressed wire form of a name, lowercased for canonical use (RFC 4034 6.2).
pub fn canonical_wire_name(name: &str) -> Result<Vec<u8>, ParseError> {
    let labels: Vec<String> = name_to_labels(name)
        .into_iter()
        .map(|label| label.to_ascii_lowercase())
        .collect();
    let mut buf = Vec::with_capacity(name.len() + 2);
    let mut writer = BitWriter::endian(&mut buf, bitstream_io::BigEndian);
    write_name(&mut writer, &labels)?;
    Ok(buf)
}
