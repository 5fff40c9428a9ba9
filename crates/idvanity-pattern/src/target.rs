//! Vanity target parsing and matching

use std::fmt;

use idvanity_identity::Address;
use serde::{Deserialize, Serialize};

/// Longest prefix, in bits, that can be constrained
pub const MAX_PREFIX_BITS: u32 = Address::BITS;

/// Constraint on the high-order bits of an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VanityTarget {
    /// Any address is accepted
    Unconstrained,
    /// The top `bits` bits of the address must equal `value`
    Prefix { bits: u32, value: u64 },
}

impl VanityTarget {
    /// Normalize a host-supplied hex prefix.
    ///
    /// Parsing stops at the first non-hex character. Each digit constrains
    /// four bits, capped at 40; beyond ten digits the value keeps its low
    /// 40 bits. No digits at all means unconstrained.
    pub fn parse(input: Option<&str>) -> Self {
        let Some(input) = input else {
            return Self::Unconstrained;
        };

        let mut digits = 0u32;
        let mut value = 0u64;
        for d in input.chars().map_while(|c| c.to_digit(16)) {
            value = (value << 4) | u64::from(d);
            digits += 1;
        }

        if digits == 0 {
            return Self::Unconstrained;
        }

        Self::Prefix {
            bits: digits.saturating_mul(4).min(MAX_PREFIX_BITS),
            value: value & Address::MASK,
        }
    }

    /// Number of constrained bits (0 when unconstrained)
    pub fn bits(&self) -> u32 {
        match self {
            Self::Unconstrained => 0,
            Self::Prefix { bits, .. } => *bits,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Unconstrained)
    }

    /// Compare the top bits of `address` with the prefix value
    pub fn matches(&self, address: Address) -> bool {
        match *self {
            Self::Unconstrained => true,
            Self::Prefix { bits, value } => address.to_u64() >> (Address::BITS - bits) == value,
        }
    }

    /// The prefix value moved into position in the 40-bit address space
    pub fn shifted_target(&self) -> u64 {
        match *self {
            Self::Unconstrained => 0,
            Self::Prefix { bits, value } => (value << (Address::BITS - bits)) & Address::MASK,
        }
    }
}

impl fmt::Display for VanityTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unconstrained => write!(f, "*"),
            Self::Prefix { bits, value } => {
                let width = bits.div_ceil(4) as usize;
                write!(f, "{:0width$x}/{}", value, bits, width = width)
            }
        }
    }
}
