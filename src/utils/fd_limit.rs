//! File descriptor limit detection for capping concurrent hashing workers (Unix).

/// Estimated number of file descriptors held per hashing worker (the open file plus slack).
pub const FDS_PER_WORKER: usize = 2;

/// Fraction of the process FD limit to use (leave room for stdio, the walker and the output tree).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur as u64 > i64::MAX as u64 {
        return None;
    }
    Some(cur as u64)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Max hashing workers that stay under ~80% of the FD limit.
/// Returns `None` if no limit is available (use caller's count).
pub fn max_workers_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    if usable < FDS_PER_WORKER {
        return Some(1);
    }
    Some(usable / FDS_PER_WORKER)
}

/// Cap `requested` workers by the FD limit. Logs a warning when the count is lowered.
pub fn determine_workers_given_fd_limit(requested: usize) -> usize {
    match max_workers_by_fd_limit() {
        Some(cap) if requested > cap => {
            log::warn!(
                "Requested {} workers but the open file limit allows {}; using {}",
                requested,
                cap,
                cap
            );
            cap
        }
        _ => requested,
    }
}
