/*
 * Timer Interface
 *
 * The timer wheel driving timeouts is out of scope for this crate
 * (spec.md §1, component D) — what the thread core consumes is a
 * per-thread one-shot timer: program a duration, start it, stop it,
 * detach it. Expiry itself is delivered by the embedder calling
 * `thread::timeout` from its tick ISR, the same interrupt context a
 * timer wheel implementation's own tick handler already runs in.
 */

use crate::thread::ThreadId;
use bitflags::bitflags;

bitflags! {
    /// Per-thread timer flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TimerFlag: u8 {
        /// Timer is armed and counting down.
        const ACTIVE = 0b0000_0001;
        /// Timer fires once then deactivates (the only mode the thread
        /// core uses — spec.md has no periodic per-thread timer).
        const ONE_SHOT = 0b0000_0010;
    }
}

/// One-shot per-thread timer operations.
///
/// An implementation owns the timer wheel and is responsible for
/// invoking `thread::timeout(ctx, thread)` when a timer armed by
/// `start` elapses, from the same interrupt-disabled context a tick ISR
/// normally runs in (spec.md §5).
pub trait TimerOps {
    /// Program (but do not arm) a one-shot timeout of `ticks` for
    /// `thread`.
    fn set_timeout(&mut self, thread: ThreadId, ticks: u64);

    /// Arm the timer programmed by `set_timeout`.
    fn start(&mut self, thread: ThreadId);

    /// Disarm the timer without removing its programmed duration.
    fn stop(&mut self, thread: ThreadId);

    /// Release any resources associated with `thread`'s timer. Called
    /// when the thread exits.
    fn detach(&mut self, thread: ThreadId);
}
