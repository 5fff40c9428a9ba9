//! Difficulty calculation for vanity targets

use crate::VanityTarget;

/// Expected number of attempts before a target is hit
pub fn calculate_difficulty(target: &VanityTarget) -> f64 {
    2.0_f64.powi(target.bits() as i32)
}

/// Format difficulty as human-readable string
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.0}", difficulty)
    }
}

/// Probability of at least one hit after `attempts` tries
pub fn match_probability(difficulty: f64, attempts: u64) -> f64 {
    if difficulty <= 1.0 {
        return 1.0;
    }
    1.0 - (-(attempts as f64) / difficulty).exp()
}

/// Estimate time to 50% probability of finding a match
pub fn estimate_time_50pct(difficulty: f64, attempts_per_second: f64) -> f64 {
    if attempts_per_second <= 0.0 {
        return f64::INFINITY;
    }
    (difficulty * std::f64::consts::LN_2) / attempts_per_second
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() {
        "never".to_string()
    } else if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else if seconds < 86400.0 * 365.0 {
        format!("{:.1}d", seconds / 86400.0)
    } else {
        format!("{:.1}y", seconds / (86400.0 * 365.0))
    }
}
