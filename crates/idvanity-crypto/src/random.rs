//! Secure random bridge
//!
//! There is no local entropy here. Every request is forwarded to an
//! [`EntropySource`] supplied by the embedder, and a short answer is an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RandomError {
    #[error("entropy source returned {got} of {wanted} bytes")]
    ShortRead { wanted: usize, got: usize },
}

/// Provider of cryptographically strong random bytes
pub trait EntropySource {
    /// Fill `buf` and return how many bytes were actually written.
    fn fill_secure_random(&mut self, buf: &mut [u8]) -> usize;
}

impl<S: EntropySource + ?Sized> EntropySource for &mut S {
    fn fill_secure_random(&mut self, buf: &mut [u8]) -> usize {
        (**self).fill_secure_random(buf)
    }
}

/// Fill `buf` from `source`, failing on a short read
pub fn secure_random<S: EntropySource + ?Sized>(
    source: &mut S,
    buf: &mut [u8],
) -> Result<(), RandomError> {
    let wanted = buf.len();
    let got = source.fill_secure_random(buf).min(wanted);
    if got < wanted {
        return Err(RandomError::ShortRead { wanted, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u8);

    impl EntropySource for Counter {
        fn fill_secure_random(&mut self, buf: &mut [u8]) -> usize {
            for b in buf.iter_mut() {
                self.0 = self.0.wrapping_add(1);
                *b = self.0;
            }
            buf.len()
        }
    }

    struct Stingy(usize);

    impl EntropySource for Stingy {
        fn fill_secure_random(&mut self, buf: &mut [u8]) -> usize {
            let n = self.0.min(buf.len());
            buf[..n].fill(0x42);
            n
        }
    }

    #[test]
    fn test_forwards_to_source() {
        let mut source = Counter(0);
        let mut buf = [0u8; 4];
        secure_random(&mut source, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_short_read_is_error() {
        let mut buf = [0u8; 32];
        let err = secure_random(&mut Stingy(8), &mut buf).unwrap_err();
        assert_eq!(err, RandomError::ShortRead { wanted: 32, got: 8 });
    }

    #[test]
    fn test_empty_host_is_error() {
        let mut buf = [0u8; 1];
        assert!(secure_random(&mut Stingy(0), &mut buf).is_err());
    }

    #[test]
    fn test_dyn_source() {
        let mut counter = Counter(10);
        let source: &mut dyn EntropySource = &mut counter;
        let mut buf = [0u8; 2];
        secure_random(source, &mut buf).unwrap();
        assert_eq!(buf, [11, 12]);
    }
}
