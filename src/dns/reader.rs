use super::{ParseError, constants::MAX_NAME_LEN};

const MAX_POINTER_JUMPS: usize = 16;

/// Cursor over a complete DNS message.
///
/// Names may point anywhere earlier in the message, so decoding needs the
/// whole buffer rather than a stream positioned at the current record.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        let value = *self
            .buf
            .get(self.pos)
            .ok_or(ParseError::UnexpectedEnd(self.pos))?;
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        let end = self.pos.checked_add(len).ok_or(ParseError::UnexpectedEnd(self.pos))?;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or(ParseError::UnexpectedEnd(self.pos))?;
        self.pos = end;
        Ok(slice)
    }

    /// Reads a possibly compressed name. The cursor ends up after the name as
    /// it appears at the current position, not after any pointer target.
    pub fn read_name(&mut self) -> Result<Vec<String>, ParseError> {
        let mut labels = Vec::new();
        let mut pos = self.pos;
        let mut resume_at = None;
        let mut jumps = 0;
        let mut encoded_len = 1;

        loop {
            let len = *self.buf.get(pos).ok_or(ParseError::UnexpectedEnd(pos))?;
            match len & 0xC0 {
                0xC0 => {
                    let low = *self.buf.get(pos + 1).ok_or(ParseError::UnexpectedEnd(pos + 1))?;
                    if resume_at.is_none() {
                        resume_at = Some(pos + 2);
                    }
                    jumps += 1;
                    if jumps > MAX_POINTER_JUMPS {
                        return Err(ParseError::PointerLoop);
                    }
                    pos = (((len & 0x3F) as usize) << 8) | low as usize;
                }
                0x00 if len == 0 => {
                    pos += 1;
                    break;
                }
                0x00 => {
                    let len = len as usize;
                    encoded_len += len + 1;
                    if encoded_len > MAX_NAME_LEN {
                        return Err(ParseError::NameTooLong);
                    }
                    let start = pos + 1;
                    let label = self
                        .buf
                        .get(start..start + len)
                        .ok_or(ParseError::UnexpectedEnd(start))?;
                    labels.push(String::from_utf8_lossy(label).into_owned());
                    pos = start + len;
                }
                // 0x40 and 0x80 label types are not in use
                _ => return Err(ParseError::InvalidLabel),
            }
        }

        self.pos = resume_at.unwrap_or(pos);
        Ok(labels)
    }
}
