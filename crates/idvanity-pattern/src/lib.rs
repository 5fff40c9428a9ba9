//! IdVanity Target Normalization
//!
//! Turns the host's hex prefix string into a bit-prefix constraint on the
//! 40-bit address space, and estimates how hard it is to hit.

mod difficulty;
mod target;

pub use difficulty::{
    calculate_difficulty, estimate_time_50pct, format_difficulty, format_duration,
    match_probability,
};
pub use target::{VanityTarget, MAX_PREFIX_BITS};
