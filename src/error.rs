/*
 * Kernel Error Codes
 *
 * This module defines the error type returned by every blocking and
 * non-blocking kernel operation. Success is `Ok(())` / `Ok(T)`; there is
 * no separate "ok" variant here the way a C ABI counterpart would return
 * a zero success code — Rust's `Result` already carries that distinction.
 */

use core::fmt;

/// Kernel-level error code.
///
/// Mirrors the ABI's negative error codes (`ERROR`, `TIMEOUT`, `FULL`,
/// `EMPTY`); the fifth code, `OK`, is represented by `Result::Ok` rather
/// than a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// Generic failure: invalid state for the requested transition, or
    /// the object was torn down (`detach`/`delete`) while a thread was
    /// waiting on it.
    Error,
    /// A blocking call's timeout elapsed before it could complete.
    Timeout,
    /// A fixed-capacity buffer (mailbox, message queue) has no free slot.
    Full,
    /// A fixed-capacity buffer has nothing to return and the caller
    /// asked not to block.
    Empty,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KernelError::Error => "error",
            KernelError::Timeout => "timeout",
            KernelError::Full => "full",
            KernelError::Empty => "empty",
        };
        f.write_str(s)
    }
}

/// Result type used throughout the kernel core.
pub type KResult<T> = Result<T, KernelError>;
