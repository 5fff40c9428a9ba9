//! Secure erase of secret material

use zeroize::Zeroize;

/// Overwrite `buf` with zeros
pub fn burn(buf: &mut [u8]) {
    buf.zeroize();
}

/// Wipe a string holding secret text, spare capacity included, then release it
pub fn burn_string(mut text: String) {
    text.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burn_zeroes_everything() {
        let mut secret = [0xa5u8; 97];
        burn(&mut secret);
        assert!(secret.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_burn_partial_range() {
        let mut buf = [7u8; 16];
        burn(&mut buf[4..12]);
        assert_eq!(&buf[..4], &[7; 4]);
        assert_eq!(&buf[4..12], &[0; 8]);
        assert_eq!(&buf[12..], &[7; 4]);
    }

    #[test]
    fn test_burn_string_accepts_any_text() {
        burn_string(String::from("f123456789:0:secret"));
        burn_string(String::new());
    }

    #[test]
    fn test_burn_empty() {
        let mut empty: [u8; 0] = [];
        burn(&mut empty);
    }
}
