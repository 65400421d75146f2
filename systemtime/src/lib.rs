//! Real and fake system time for deterministic tests.
//!
//! The admission pipeline never calls `SystemTime::now()` directly; it goes
//! through [`unix_time_as_millis`] so that tests built with the
//! `enable_faketime` feature can pin "now" and exercise the future-timestamp
//! and expiration gates deterministically (see property 3 in the
//! specification: identical clock ⇒ identical `Report`).

#[cfg(not(any(target_family = "wasm", target_os = "unknown")))]
use std::time::{SystemTime, UNIX_EPOCH};

/// The real wall-clock time, in milliseconds since the Unix epoch.
///
/// Unlike [`unix_time_as_millis`], this always reads the OS clock, even if
/// faketime has been set.
#[cfg(not(any(target_family = "wasm", target_os = "unknown")))]
pub fn system_time_as_millis() -> u64 {
    let now = SystemTime::now();
    now.duration_since(UNIX_EPOCH)
        .expect("system time before the Unix epoch")
        .as_millis() as u64
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub fn system_time_as_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .expect("system time before the Unix epoch")
        .as_millis() as u64
}

#[cfg(not(feature = "enable_faketime"))]
pub fn unix_time_as_millis() -> u64 {
    system_time_as_millis()
}

#[cfg(feature = "enable_faketime")]
mod faketime_impl {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Mutex, MutexGuard};

    static FAKETIME_ENABLED: AtomicBool = AtomicBool::new(false);
    static FAKETIME_MILLIS: AtomicU64 = AtomicU64::new(0);
    static FAKETIME_LOCK: Mutex<()> = Mutex::new(());

    pub fn unix_time_as_millis() -> u64 {
        if FAKETIME_ENABLED.load(Ordering::SeqCst) {
            FAKETIME_MILLIS.load(Ordering::SeqCst)
        } else {
            super::system_time_as_millis()
        }
    }

    /// A guard that lets a single test own the faketime clock at a time.
    ///
    /// Faketime is disabled automatically when the guard is dropped, so a
    /// panicking test can't leave a stale fake clock for the next test.
    pub struct FaketimeGuard {
        _lock: MutexGuard<'static, ()>,
    }

    impl FaketimeGuard {
        /// Pins `unix_time_as_millis()` to `millis` until disabled or dropped.
        pub fn set_faketime(&self, millis: u64) {
            FAKETIME_MILLIS.store(millis, Ordering::SeqCst);
            FAKETIME_ENABLED.store(true, Ordering::SeqCst);
        }

        /// Reverts to the real system clock.
        pub fn disable_faketime(&self) {
            FAKETIME_ENABLED.store(false, Ordering::SeqCst);
        }
    }

    impl Drop for FaketimeGuard {
        fn drop(&mut self) {
            FAKETIME_ENABLED.store(false, Ordering::SeqCst);
        }
    }

    /// Acquires exclusive ownership of the faketime clock for the current test.
    pub fn faketime() -> FaketimeGuard {
        let lock = FAKETIME_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        FaketimeGuard { _lock: lock }
    }
}

#[cfg(feature = "enable_faketime")]
pub use faketime_impl::{faketime, unix_time_as_millis, FaketimeGuard};

#[cfg(not(feature = "enable_faketime"))]
#[cfg(test)]
mod tests_realtime {
    use crate::{system_time_as_millis, unix_time_as_millis};

    #[test]
    fn test_get_system_real_timestamp() {
        assert!(cfg!(not(feature = "enable_faketime")));

        let now = system_time_as_millis();
        assert!(unix_time_as_millis() >= now);
    }
}
