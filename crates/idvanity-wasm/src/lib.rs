//! IdVanity wasm bridge
//!
//! Maps the JavaScript host imports (`getVanity`, `updateVanity`,
//! `setPrivate`, `setPublic`, `getRandom`) onto [`Host`] and exports `main`,
//! which runs one search per call.

use idvanity_core::{Address, EntropySource, Host, Progress, SearchError, SearchSummary};
use tracing::{error, info};

/// Size of the buffer the host writes the prefix string into
pub const VANITY_BUFFER_LEN: usize = 1024;

/// The raw host imports, with pointers already turned into slices
pub trait Imports {
    /// `getVanity`: the prefix string, or `None` when the host passed null
    fn get_vanity(&mut self) -> Option<String>;

    /// `updateVanity`: non-zero asks the search to stop
    fn update_vanity(&mut self, counter: i32, address: u64, bits: i32, expected: u64) -> i32;

    /// `setPrivate`
    fn set_private(&mut self, address: u64, value: &[u8]);

    /// `setPublic`
    fn set_public(&mut self, address: u64, value: &[u8]);

    /// `getRandom`: the host always fills the whole buffer
    fn get_random(&mut self, buf: &mut [u8]);
}

/// [`Host`] implemented over a set of raw imports
pub struct WasmHost<I> {
    imports: I,
}

impl<I: Imports> WasmHost<I> {
    pub fn new(imports: I) -> Self {
        Self { imports }
    }

    pub fn into_inner(self) -> I {
        self.imports
    }
}

impl<I: Imports> EntropySource for WasmHost<I> {
    fn fill_secure_random(&mut self, buf: &mut [u8]) -> usize {
        self.imports.get_random(buf);
        buf.len()
    }
}

impl<I: Imports> Host for WasmHost<I> {
    fn target_prefix(&mut self) -> Option<String> {
        self.imports.get_vanity()
    }

    fn report_progress(&mut self, progress: &Progress) -> bool {
        let counter = i32::try_from(progress.attempt).unwrap_or(i32::MAX);
        let bits = i32::try_from(progress.bits).unwrap_or(i32::MAX);
        self.imports.update_vanity(
            counter,
            progress.address.to_u64(),
            bits,
            progress.shifted_target,
        ) != 0
    }

    fn store_private(&mut self, address: Address, text: &str) {
        self.imports.set_private(address.to_u64(), text.as_bytes());
    }

    fn store_public(&mut self, address: Address, text: &str) {
        self.imports.set_public(address.to_u64(), text.as_bytes());
    }
}

/// Run one search against `imports`, logging the outcome
pub fn run_with<I: Imports>(imports: I) -> (Result<SearchSummary, SearchError>, I) {
    let mut host = WasmHost::new(imports);
    let result = idvanity_core::run(&mut host);
    match &result {
        Ok(summary) => info!(
            address = %summary.address,
            attempts = summary.attempts,
            reason = ?summary.reason,
            "identity generated"
        ),
        Err(err) => error!(%err, "identity generation failed"),
    }
    (result, host.into_inner())
}

/// How the exported `main` leaves after a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Results were delivered through `setPrivate`/`setPublic`
    Return,
    /// Nothing was delivered; the module traps so the host call fails
    Trap,
}

impl Exit {
    pub fn of(result: &Result<SearchSummary, SearchError>) -> Self {
        match result {
            Ok(_) => Self::Return,
            Err(_) => Self::Trap,
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod ffi {
    use std::ffi::{c_char, CStr};

    use super::{run_with, Exit, Imports, VANITY_BUFFER_LEN};

    #[link(wasm_import_module = "env")]
    extern "C" {
        fn getVanity() -> *const c_char;
        fn updateVanity(counter: i32, address: u64, bits: i32, expected: u64) -> i32;
        fn setPrivate(address: u64, value: *const u8, length: i32);
        fn setPublic(address: u64, value: *const u8, length: i32);
        fn getRandom(buf: *mut u8, bytes: u32);
    }

    static mut VANITY_BUFFER: [u8; VANITY_BUFFER_LEN] = [0; VANITY_BUFFER_LEN];

    struct EnvImports;

    impl Imports for EnvImports {
        fn get_vanity(&mut self) -> Option<String> {
            // SAFETY: the host returns null or a NUL-terminated string in linear memory.
            unsafe {
                let ptr = getVanity();
                if ptr.is_null() {
                    return None;
                }
                Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
            }
        }

        fn update_vanity(&mut self, counter: i32, address: u64, bits: i32, expected: u64) -> i32 {
            // SAFETY: plain values only.
            unsafe { updateVanity(counter, address, bits, expected) }
        }

        fn set_private(&mut self, address: u64, value: &[u8]) {
            let length = i32::try_from(value.len()).unwrap_or(i32::MAX);
            // SAFETY: the host copies `length` bytes out before returning.
            unsafe { setPrivate(address, value.as_ptr(), length) }
        }

        fn set_public(&mut self, address: u64, value: &[u8]) {
            let length = i32::try_from(value.len()).unwrap_or(i32::MAX);
            // SAFETY: the host copies `length` bytes out before returning.
            unsafe { setPublic(address, value.as_ptr(), length) }
        }

        fn get_random(&mut self, buf: &mut [u8]) {
            for chunk in buf.chunks_mut(u32::MAX as usize) {
                // SAFETY: the host writes exactly `chunk.len()` bytes into `chunk`.
                unsafe { getRandom(chunk.as_mut_ptr(), chunk.len() as u32) }
            }
        }
    }

    /// Where the host should write the NUL-terminated prefix string
    #[no_mangle]
    pub extern "C" fn vanity_buffer() -> *mut u8 {
        // SAFETY: only the address is taken; the host owns the contents.
        unsafe { core::ptr::addr_of_mut!(VANITY_BUFFER) as *mut u8 }
    }

    #[no_mangle]
    pub extern "C" fn vanity_buffer_len() -> usize {
        VANITY_BUFFER_LEN
    }

    /// Generate one identity. Results reach the host through `setPrivate`
    /// and `setPublic`; a failed search traps.
    #[export_name = "main"]
    pub extern "C" fn vanity_main() {
        let (result, _) = run_with(EnvImports);
        if Exit::of(&result) == Exit::Trap {
            std::process::abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idvanity_core::{IdentityError, StopReason};

    #[derive(Default)]
    struct FakeImports {
        vanity: Option<String>,
        cancel_at: i32,
        random_calls: usize,
        dry: bool,
        seed: u64,
        updates: Vec<(i32, u64, i32, u64)>,
        private: Vec<(u64, String)>,
        public: Vec<(u64, String)>,
    }

    impl Imports for FakeImports {
        fn get_vanity(&mut self) -> Option<String> {
            self.vanity.clone()
        }

        fn update_vanity(&mut self, counter: i32, address: u64, bits: i32, expected: u64) -> i32 {
            self.updates.push((counter, address, bits, expected));
            i32::from(counter == self.cancel_at)
        }

        fn set_private(&mut self, address: u64, value: &[u8]) {
            self.private
                .push((address, String::from_utf8(value.to_vec()).unwrap()));
        }

        fn set_public(&mut self, address: u64, value: &[u8]) {
            self.public
                .push((address, String::from_utf8(value.to_vec()).unwrap()));
        }

        fn get_random(&mut self, buf: &mut [u8]) {
            self.random_calls += 1;
            if self.dry {
                return;
            }
            for b in buf.iter_mut() {
                self.seed = self
                    .seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                *b = (self.seed >> 56) as u8;
            }
        }
    }

    #[test]
    fn test_null_vanity_generates_once() {
        let (result, imports) = run_with(FakeImports::default());
        let summary = result.unwrap();

        assert_eq!(summary.reason, StopReason::Unconstrained);
        assert!(imports.updates.is_empty());
        assert_eq!(imports.private.len(), 1);
        assert_eq!(imports.public.len(), 1);
        assert_eq!(imports.private[0].0, summary.address.to_u64());
        assert!(imports.private[0].1.starts_with(&imports.public[0].1));
    }

    #[test]
    fn test_update_vanity_arguments() {
        let imports = FakeImports {
            vanity: Some("fffffffff".to_string()),
            cancel_at: 2,
            ..FakeImports::default()
        };
        let (result, imports) = run_with(imports);
        let summary = result.unwrap();

        assert_eq!(summary.reason, StopReason::Cancelled);
        assert_eq!(imports.updates.len(), 2);
        assert_eq!(imports.updates[0].0, 1);
        assert_eq!(imports.updates[1].0, 2);
        assert!(imports
            .updates
            .iter()
            .all(|&(_, _, bits, expected)| bits == 36 && expected == 0xfffffffff0));
        assert_eq!(imports.updates[1].1, summary.address.to_u64());
        assert_eq!(imports.public[0].0, summary.address.to_u64());
    }

    #[test]
    fn test_random_is_pulled_from_host() {
        let (result, imports) = run_with(FakeImports::default());
        assert!(result.is_ok());
        assert!(imports.random_calls >= 1);
    }

    #[test]
    fn test_silent_random_source_is_rejected() {
        let imports = FakeImports {
            dry: true,
            ..FakeImports::default()
        };
        let (result, imports) = run_with(imports);
        assert_eq!(Exit::of(&result), Exit::Trap);
        assert_eq!(
            result.unwrap_err(),
            SearchError::Identity(IdentityError::DegenerateEntropy)
        );
        assert!(imports.private.is_empty());
        assert!(imports.public.is_empty());
    }

    #[test]
    fn test_successful_search_returns_normally() {
        let (result, _) = run_with(FakeImports::default());
        assert_eq!(Exit::of(&result), Exit::Return);
    }
}
