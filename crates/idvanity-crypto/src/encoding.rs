//! Text encodings for addresses and key material

/// Width of an address in hex digits
pub const ADDRESS_HEX_LEN: usize = 10;

/// Render a 40-bit address as ten lower-case hex digits
pub fn address_hex(address: u64) -> String {
    format!("{:010x}", address & 0xff_ffff_ffff)
}

/// Big-endian integer from up to eight bytes
pub fn be_u64(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_padding() {
        assert_eq!(address_hex(0), "0000000000");
        assert_eq!(address_hex(0xf123456789), "f123456789");
        assert_eq!(address_hex(0xab), "00000000ab");
        assert_eq!(address_hex(0x1_ff_ffff_ffff).len(), ADDRESS_HEX_LEN);
    }

    #[test]
    fn test_be_u64() {
        assert_eq!(be_u64(&[0x01, 0x02, 0x03, 0x04, 0x05]), 0x0102030405);
        assert_eq!(be_u64(&[]), 0);
    }
}
