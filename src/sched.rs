/*
 * Scheduler Interface
 *
 * The ready-queue scheduler picker — maintaining the per-priority ready
 * table and choosing the highest-priority runnable thread — is out of
 * scope for this crate (spec.md §1, component C). What the thread core
 * and every sync primitive consume is this narrow interface: insert a
 * thread into the ready table, remove one, and ask for a reschedule.
 *
 * This mirrors the policy/mechanism split the rest of the scheduling
 * subsystem already uses (see the `Scheduler`/`KernelSchedCtx` pair this
 * crate's sibling scheduler module defines) — the core never reaches
 * into ready-table internals, only through this trait.
 */

use crate::thread::ThreadId;

/// Ready-queue operations the thread core and sync primitives rely on.
///
/// An implementation owns the per-priority ready table (indexed by each
/// thread's `group`/`bit_mask` bitmap coordinates) and the scheduling
/// policy that picks the next thread to run. Both are outside this
/// crate's scope; only this trait boundary is specified here.
pub trait SchedulerOps {
    /// Insert a READY thread into the ready table at its current
    /// priority. Called with interrupts disabled.
    fn insert_ready(&mut self, thread: ThreadId);

    /// Remove a thread from the ready table. Called with interrupts
    /// disabled. No-op if the thread is not present.
    fn remove_ready(&mut self, thread: ThreadId);

    /// Request a reschedule: pick the highest-priority runnable thread
    /// and context-switch to it. Must be called with interrupts already
    /// re-enabled (spec.md §5) — callers release the critical section
    /// before invoking this.
    fn reschedule(&mut self);

    /// The thread currently selected as running, if any.
    fn current(&self) -> Option<ThreadId>;

    /// Rotate a READY thread to the tail of its priority slot, without
    /// removing and reinserting (used by `yield_now` when the thread
    /// has at least one same-priority peer).
    fn rotate_same_priority(&mut self, thread: ThreadId);

    /// Whether any other thread shares `thread`'s current ready-table
    /// slot — used by `yield_now` to decide whether rotating has any
    /// observable effect.
    fn has_peer(&self, thread: ThreadId) -> bool;
}
