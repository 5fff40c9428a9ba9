//! Vanity search engine

use std::time::Duration;

use idvanity_crypto::capabilities;
use idvanity_identity::{Address, Candidate, IdentityGenerator};
use idvanity_pattern::{calculate_difficulty, format_difficulty, VanityTarget};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::error::SearchError;
use crate::host::{Host, Progress};
use crate::stats::SearchStats;

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Emit a progress log line every this many rejected candidates (0 = never)
    pub log_every: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { log_every: 1000 }
    }
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No constraint, the first candidate was taken
    Unconstrained,
    /// A candidate matched the target prefix
    Matched,
    /// The host cancelled; the last reported candidate was taken
    Cancelled,
}

/// The accepted identity and how it was reached
pub struct SearchOutcome<I> {
    pub identity: I,
    /// Rejected candidates
    pub attempts: u64,
    pub reason: StopReason,
    pub elapsed: Duration,
}

/// Summary of a completed search, after the identity was handed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub address: Address,
    pub target: VanityTarget,
    pub attempts: u64,
    pub reason: StopReason,
    pub time_secs: f64,
    pub attempts_per_second: f64,
}

/// Vanity search engine
pub struct VanitySearch<G> {
    generator: G,
    config: SearchConfig,
}

impl<G: IdentityGenerator> VanitySearch<G> {
    /// Create a new vanity search
    pub fn new(generator: G, config: SearchConfig) -> Self {
        Self { generator, config }
    }

    /// Run one complete search against the host.
    ///
    /// Reads the target, searches, then hands the private and public forms
    /// of the accepted identity to the host before burning it.
    pub fn run<H: Host>(&mut self, host: &mut H) -> Result<SearchSummary, SearchError> {
        let prefix = host.target_prefix();
        let target = VanityTarget::parse(prefix.as_deref());

        let SearchOutcome {
            mut identity,
            attempts,
            reason,
            elapsed,
        } = self.search(host, target)?;

        let address = identity.address();
        let private = identity.private_form();
        host.store_private(address, &private);
        drop(private);
        host.store_public(address, &identity.public_form());
        identity.burn();

        let time_secs = elapsed.as_secs_f64();
        Ok(SearchSummary {
            address,
            target,
            attempts,
            reason,
            time_secs,
            attempts_per_second: if time_secs > 0.0 {
                attempts as f64 / time_secs
            } else {
                0.0
            },
        })
    }

    /// Generate candidates until one matches `target` or the host cancels.
    ///
    /// Every rejected candidate is burned before the next is generated.
    pub fn search<H: Host>(
        &mut self,
        host: &mut H,
        target: VanityTarget,
    ) -> Result<SearchOutcome<G::Identity>, SearchError> {
        let mut stats = SearchStats::new(calculate_difficulty(&target));

        info!(
            %target,
            difficulty = %format_difficulty(stats.difficulty()),
            cpu = %capabilities(),
            "starting vanity search"
        );

        if target.is_unconstrained() {
            let identity = self.generator.generate(&mut *host)?;
            return Ok(finish(identity, &stats, StopReason::Unconstrained));
        }

        let bits = target.bits();
        let shifted_target = target.shifted_target();

        loop {
            let mut candidate = self.generator.generate(&mut *host)?;
            let address = candidate.address();

            if target.matches(address) {
                return Ok(finish(candidate, &stats, StopReason::Matched));
            }

            stats.add_attempt();
            trace!(attempt = stats.attempts(), %address, "rejected candidate");

            let progress = Progress {
                attempt: stats.attempts(),
                address,
                bits,
                shifted_target,
            };
            if host.report_progress(&progress) {
                return Ok(finish(candidate, &stats, StopReason::Cancelled));
            }

            candidate.burn();

            if self.config.log_every > 0 && stats.attempts() % self.config.log_every == 0 {
                info!("{}", stats.format());
            }
        }
    }
}

fn finish<I: Candidate>(identity: I, stats: &SearchStats, reason: StopReason) -> SearchOutcome<I> {
    info!(
        address = %identity.address(),
        attempts = stats.attempts(),
        ?reason,
        "vanity search finished"
    );
    SearchOutcome {
        identity,
        attempts: stats.attempts(),
        reason,
        elapsed: stats.elapsed(),
    }
}
