//! Rate-limited logging for per-record warnings.

/// Default sampling interval for [`warn_every_n!`](crate::warn_every_n).
pub const LOG_EVERY_N: u64 = 1000;

/// Emit a `tracing` warning on the first and then every `n`-th hit of this
/// call site.
///
/// ```
/// # use strata_core::warn_every_n;
/// warn_every_n!(strata_core::log::LOG_EVERY_N, "field {} missing", "time");
/// ```
#[macro_export]
macro_rules! warn_every_n {
    ($n:expr, $($arg:tt)+) => {{
        static HITS: ::std::sync::atomic::AtomicU64 = ::std::sync::atomic::AtomicU64::new(0);
        let seen = HITS.fetch_add(1, ::std::sync::atomic::Ordering::Relaxed);
        let every: u64 = ($n as u64).max(1);
        if seen % every == 0 {
            $crate::__tracing::warn!(occurrences = seen + 1, $($arg)+);
        }
    }};
}
