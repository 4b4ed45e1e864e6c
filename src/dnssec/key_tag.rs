use crate::dns::rdata::DnskeyData;

/// Key tag of a DNSKEY record (RFC 4034 Appendix B)
pub fn calculate_key_tag(key: &DnskeyData) -> u16 {
    // RSAMD5 keys use the most significant 16 of the modulus' low 24 bits
    if key.algorithm == 1 {
        let len = key.public_key.len();
        if len >= 3 {
            return u16::from_be_bytes([key.public_key[len - 3], key.public_key[len - 2]]);
        }
        return 0;
    }

    let mut accumulator: u32 = 0;
    for (i, &byte) in key.to_wire().iter().enumerate() {
        if i % 2 == 0 {
            accumulator += u32::from(byte) << 8;
        } else {
            accumulator += u32::from(byte);
        }
    }

    // Add carries and mask to 16 bits
    accumulator += accumulator >> 16;
    (accumulator & 0xFFFF) as u16
}
