//! Host boundary
//!
//! Everything the engine needs from its embedder: the target string,
//! entropy, progress/cancellation and storage of the result.

use idvanity_crypto::EntropySource;
use idvanity_identity::Address;
use serde::{Deserialize, Serialize};

/// Progress report sent to the host after each rejected candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Rejected candidates so far, starting at 1
    pub attempt: u64,
    /// Address of the candidate just rejected
    pub address: Address,
    /// Width of the prefix being searched for
    pub bits: u32,
    /// Prefix value moved into position in the 40-bit address space
    pub shifted_target: u64,
}

/// The embedding environment.
///
/// Calls are synchronous and never re-enter the engine.
pub trait Host: EntropySource {
    /// Hex prefix to search for; `None` or empty accepts any address
    fn target_prefix(&mut self) -> Option<String>;

    /// Observe progress. Returning `true` stops the search and accepts the
    /// candidate just reported.
    fn report_progress(&mut self, progress: &Progress) -> bool;

    /// Receive the private form of the accepted identity
    fn store_private(&mut self, address: Address, text: &str);

    /// Receive the public form of the accepted identity
    fn store_public(&mut self, address: Address, text: &str);
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{NativeHost, StoredIdentity};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{Duration, Instant};

    use idvanity_crypto::zeroize::Zeroize;
    use idvanity_crypto::{burn_string, EntropySource};
    use idvanity_identity::Address;
    use rand::rngs::OsRng;
    use rand::RngCore;
    use serde::Serialize;
    use tracing::warn;

    use super::{Host, Progress};

    type ProgressFn = Box<dyn FnMut(&Progress) -> bool + Send>;

    /// Identity handed over by the engine. The private form is burned on drop.
    #[derive(Debug, Clone, Serialize)]
    pub struct StoredIdentity {
        pub address: Address,
        pub public: String,
        pub private: String,
    }

    impl Drop for StoredIdentity {
        fn drop(&mut self) {
            self.private.zeroize();
        }
    }

    /// In-process host backed by the operating system entropy source
    #[derive(Default)]
    pub struct NativeHost {
        prefix: Option<String>,
        max_attempts: Option<u64>,
        max_duration: Option<Duration>,
        started: Option<Instant>,
        on_progress: Option<ProgressFn>,
        private: Option<(Address, String)>,
        public: Option<(Address, String)>,
    }

    impl NativeHost {
        pub fn new() -> Self {
            Self::default()
        }

        /// Hex prefix to search for
        pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
            self.prefix = Some(prefix.into());
            self
        }

        /// Cancel once this many candidates have been rejected
        pub fn max_attempts(mut self, attempts: u64) -> Self {
            self.max_attempts = Some(attempts);
            self
        }

        /// Cancel once the search has run this long
        pub fn max_duration(mut self, duration: Duration) -> Self {
            self.max_duration = Some(duration);
            self
        }

        /// Observe progress; returning `true` cancels
        pub fn on_progress(mut self, f: impl FnMut(&Progress) -> bool + Send + 'static) -> Self {
            self.on_progress = Some(Box::new(f));
            self
        }

        /// Take the identity stored by the last search, if both forms arrived
        pub fn take_identity(&mut self) -> Option<StoredIdentity> {
            match (self.private.take(), self.public.take()) {
                (Some((address, private)), Some((_, public))) => Some(StoredIdentity {
                    address,
                    public,
                    private,
                }),
                (private, _) => {
                    if let Some((_, text)) = private {
                        burn_string(text);
                    }
                    None
                }
            }
        }

        fn limits_reached(&self, progress: &Progress) -> bool {
            if self.max_attempts.is_some_and(|max| progress.attempt >= max) {
                return true;
            }
            match (self.max_duration, self.started) {
                (Some(max), Some(started)) => started.elapsed() >= max,
                _ => false,
            }
        }
    }

    impl EntropySource for NativeHost {
        fn fill_secure_random(&mut self, buf: &mut [u8]) -> usize {
            match OsRng.try_fill_bytes(buf) {
                Ok(()) => buf.len(),
                Err(err) => {
                    warn!(%err, "os entropy source failed");
                    0
                }
            }
        }
    }

    impl Host for NativeHost {
        fn target_prefix(&mut self) -> Option<String> {
            self.started = Some(Instant::now());
            self.prefix.clone()
        }

        fn report_progress(&mut self, progress: &Progress) -> bool {
            let cancel = match self.on_progress.as_mut() {
                Some(f) => f(progress),
                None => false,
            };
            cancel || self.limits_reached(progress)
        }

        fn store_private(&mut self, address: Address, text: &str) {
            if let Some((_, old)) = self.private.replace((address, text.to_string())) {
                burn_string(old);
            }
        }

        fn store_public(&mut self, address: Address, text: &str) {
            self.public = Some((address, text.to_string()));
        }
    }

}
