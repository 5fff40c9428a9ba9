//! CPU capability detection
//!
//! The processor is probed once per process and the result is frozen.
//! Primitives read the record to pick hardware code paths; every flag is
//! optional and must have a portable fallback.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Instruction-set extensions available on this processor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Hardware AES rounds (AES-NI with SSE4.1 and PCLMULQDQ on x86)
    pub aes: bool,
    /// CRC32 instructions (SSE4.2 on x86)
    pub crc32: bool,
    /// Carry-less multiply (PMULL on ARM, PCLMULQDQ on x86)
    pub pmull: bool,
    pub sha1: bool,
    pub sha2: bool,
    /// AES over 256/512-bit vectors
    pub vaes: bool,
    /// Carry-less multiply over 256/512-bit vectors
    pub vpclmulqdq: bool,
    pub avx: bool,
    pub avx2: bool,
    pub avx512f: bool,
    /// Fast short `rep movsb`
    pub fsrm: bool,
    /// `rdrand` hardware random number instruction
    pub rdrand: bool,
}

/// Raw CPUID words consumed by the x86 decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuidRegisters {
    /// Leaf 1, ECX
    pub leaf1_ecx: u32,
    /// Leaf 7 sub-leaf 0, EBX
    pub leaf7_ebx: u32,
    /// Leaf 7 sub-leaf 0, ECX
    pub leaf7_ecx: u32,
    /// Leaf 7 sub-leaf 0, EDX
    pub leaf7_edx: u32,
}

/// Masks of the crypto extensions inside an auxiliary-vector capability word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwcapLayout {
    pub aes: u64,
    pub pmull: u64,
    pub sha1: u64,
    pub sha2: u64,
    pub crc32: u64,
}

/// `AT_HWCAP` layout on AArch64
pub const AARCH64_HWCAP: HwcapLayout = HwcapLayout {
    aes: 1 << 3,
    pmull: 1 << 4,
    sha1: 1 << 5,
    sha2: 1 << 6,
    crc32: 1 << 7,
};

/// `AT_HWCAP2` layout on 32-bit ARM
pub const ARM_HWCAP2: HwcapLayout = HwcapLayout {
    aes: 1 << 0,
    pmull: 1 << 1,
    sha1: 1 << 2,
    sha2: 1 << 3,
    crc32: 1 << 4,
};

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();
static PROBES: AtomicUsize = AtomicUsize::new(0);

/// Capabilities of the current processor.
///
/// The first call probes the hardware; every later call returns the same
/// record without probing or allocating.
pub fn capabilities() -> Capabilities {
    *CAPABILITIES.get_or_init(|| {
        PROBES.fetch_add(1, Ordering::Relaxed);
        let caps = probe();
        debug!(%caps, "probed cpu capabilities");
        caps
    })
}

impl Capabilities {
    /// Decode x86 CPUID leaves 1 and 7
    pub fn from_cpuid(regs: CpuidRegisters) -> Self {
        let bit = |word: u32, n: u32| word & (1 << n) != 0;

        let pclmulqdq = bit(regs.leaf1_ecx, 1);
        let aes = bit(regs.leaf1_ecx, 25) && bit(regs.leaf1_ecx, 19) && pclmulqdq;
        let avx = bit(regs.leaf1_ecx, 28);
        let sha = bit(regs.leaf7_ebx, 29);

        Self {
            aes,
            crc32: bit(regs.leaf1_ecx, 20),
            pmull: pclmulqdq,
            sha1: sha,
            sha2: sha,
            vaes: aes && avx && bit(regs.leaf7_ecx, 9),
            vpclmulqdq: aes && avx && bit(regs.leaf7_ecx, 10),
            avx,
            avx2: avx && bit(regs.leaf7_ebx, 5),
            avx512f: avx && bit(regs.leaf7_ebx, 16),
            fsrm: bit(regs.leaf7_edx, 4),
            rdrand: bit(regs.leaf1_ecx, 30),
        }
    }

    /// Decode an auxiliary-vector capability word
    pub fn from_hwcap(word: u64, layout: &HwcapLayout) -> Self {
        Self {
            aes: word & layout.aes != 0,
            crc32: word & layout.crc32 != 0,
            pmull: word & layout.pmull != 0,
            sha1: word & layout.sha1 != 0,
            sha2: word & layout.sha2 != 0,
            ..Self::default()
        }
    }

    /// Fixed baseline of ARMv8 Apple silicon
    pub fn armv8_crypto_baseline() -> Self {
        Self {
            aes: true,
            crc32: true,
            pmull: true,
            sha1: true,
            sha2: true,
            ..Self::default()
        }
    }

    fn flags(&self) -> [(&'static str, bool); 12] {
        [
            ("aes", self.aes),
            ("crc32", self.crc32),
            ("pmull", self.pmull),
            ("sha1", self.sha1),
            ("sha2", self.sha2),
            ("vaes", self.vaes),
            ("vpclmulqdq", self.vpclmulqdq),
            ("avx", self.avx),
            ("avx2", self.avx2),
            ("avx512f", self.avx512f),
            ("fsrm", self.fsrm),
            ("rdrand", self.rdrand),
        ]
    }

    /// Pack the flags into a bit mask, in declaration order starting at bit 0
    pub fn bits(&self) -> u32 {
        self.flags()
            .iter()
            .enumerate()
            .filter(|(_, (_, set))| *set)
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut any = false;
        for (name, _) in self.flags().iter().filter(|(_, set)| *set) {
            if any {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            any = true;
        }
        if !any {
            f.write_str("none")?;
        }
        Ok(())
    }
}

#[cfg(target_arch = "x86_64")]
fn probe() -> Capabilities {
    use core::arch::x86_64::{__cpuid, __cpuid_count};

    // SAFETY: CPUID exists on every x86-64 processor.
    let (max_leaf, leaf1) = unsafe { (__cpuid(0).eax, __cpuid(1)) };
    let mut regs = CpuidRegisters {
        leaf1_ecx: leaf1.ecx,
        ..CpuidRegisters::default()
    };
    if max_leaf >= 7 {
        // SAFETY: leaf 7 is within the range reported by leaf 0.
        let leaf7 = unsafe { __cpuid_count(7, 0) };
        regs.leaf7_ebx = leaf7.ebx;
        regs.leaf7_ecx = leaf7.ecx;
        regs.leaf7_edx = leaf7.edx;
    }
    Capabilities::from_cpuid(regs)
}

#[cfg(all(target_arch = "aarch64", any(target_os = "linux", target_os = "android")))]
fn probe() -> Capabilities {
    // SAFETY: getauxval has no preconditions and yields 0 for missing entries.
    let hwcap = unsafe { libc::getauxval(libc::AT_HWCAP) } as u64;
    Capabilities::from_hwcap(hwcap, &AARCH64_HWCAP)
}

#[cfg(all(target_arch = "arm", any(target_os = "linux", target_os = "android")))]
fn probe() -> Capabilities {
    // 32-bit kernels report the crypto extensions in the secondary word.
    // SAFETY: getauxval has no preconditions and yields 0 for missing entries.
    let hwcap2 = unsafe { libc::getauxval(libc::AT_HWCAP2) } as u64;
    Capabilities::from_hwcap(hwcap2, &ARM_HWCAP2)
}

#[cfg(all(target_arch = "aarch64", target_vendor = "apple"))]
fn probe() -> Capabilities {
    Capabilities::armv8_crypto_baseline()
}

#[cfg(not(any(
    target_arch = "x86_64",
    all(target_arch = "aarch64", any(target_os = "linux", target_os = "android")),
    all(target_arch = "arm", any(target_os = "linux", target_os = "android")),
    all(target_arch = "aarch64", target_vendor = "apple"),
)))]
fn probe() -> Capabilities {
    Capabilities::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_runs_once() {
        let first = capabilities();
        let second = capabilities();
        assert_eq!(first, second);
        assert_eq!(first.bits(), second.bits());
        assert_eq!(PROBES.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_aes_needs_all_three_leaf1_bits() {
        let full = (1 << 25) | (1 << 19) | (1 << 1);
        let caps = Capabilities::from_cpuid(CpuidRegisters {
            leaf1_ecx: full,
            ..Default::default()
        });
        assert!(caps.aes);
        assert!(caps.pmull);

        for missing in [25, 19, 1] {
            let caps = Capabilities::from_cpuid(CpuidRegisters {
                leaf1_ecx: full & !(1 << missing),
                ..Default::default()
            });
            assert!(!caps.aes, "aes set without bit {}", missing);
        }
    }

    #[test]
    fn test_vector_extensions_need_prerequisites() {
        let leaf7 = CpuidRegisters {
            leaf1_ecx: 0,
            leaf7_ebx: (1 << 5) | (1 << 16),
            leaf7_ecx: (1 << 9) | (1 << 10),
            leaf7_edx: 0,
        };
        let caps = Capabilities::from_cpuid(leaf7);
        assert!(!caps.avx2);
        assert!(!caps.avx512f);
        assert!(!caps.vaes);
        assert!(!caps.vpclmulqdq);

        let caps = Capabilities::from_cpuid(CpuidRegisters {
            leaf1_ecx: (1 << 28) | (1 << 25) | (1 << 19) | (1 << 1),
            ..leaf7
        });
        assert!(caps.avx2);
        assert!(caps.avx512f);
        assert!(caps.vaes);
        assert!(caps.vpclmulqdq);
    }

    #[test]
    fn test_single_bit_flags() {
        let caps = Capabilities::from_cpuid(CpuidRegisters {
            leaf1_ecx: (1 << 30) | (1 << 20),
            leaf7_ebx: 1 << 29,
            leaf7_ecx: 0,
            leaf7_edx: 1 << 4,
        });
        assert!(caps.rdrand);
        assert!(caps.crc32);
        assert!(caps.sha1 && caps.sha2);
        assert!(caps.fsrm);
        assert!(!caps.aes);
    }

    #[test]
    fn test_hwcap_layouts() {
        let caps = Capabilities::from_hwcap((1 << 3) | (1 << 7), &AARCH64_HWCAP);
        assert!(caps.aes && caps.crc32);
        assert!(!caps.pmull && !caps.sha1 && !caps.sha2);

        let caps = Capabilities::from_hwcap(0b11111, &ARM_HWCAP2);
        assert_eq!(caps, Capabilities::armv8_crypto_baseline());
    }

    #[test]
    fn test_display_and_bits() {
        assert_eq!(Capabilities::default().to_string(), "none");
        assert_eq!(Capabilities::default().bits(), 0);

        let caps = Capabilities {
            aes: true,
            rdrand: true,
            ..Default::default()
        };
        assert_eq!(caps.to_string(), "aes rdrand");
        assert_eq!(caps.bits(), 1 | (1 << 11));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Capabilities::armv8_crypto_baseline()).unwrap();
        assert_eq!(json["sha2"], true);
        assert_eq!(json["avx2"], false);
    }
}
