/*
 * Test Doubles
 *
 * Stand-ins for the three external collaborators spec.md marks
 * "interface only" (hardware gate, scheduler, timer wheel). None of
 * these ship in the crate proper — `testing` is `#[cfg(test)]`-only
 * (see `lib.rs`) — but every unit test in `sync/`, `thread.rs` and
 * `waitqueue.rs` drives the real kernel logic against them, the same
 * way the teacher's scheduler tests drive `Scheduler` policies against
 * a `KernelSchedCtx` stub rather than a booted kernel.
 */

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::hal::Hal;
use crate::sched::SchedulerOps;
use crate::thread::ThreadId;
use crate::timer::TimerOps;

/// Interrupt mask double: tracks nesting depth instead of touching real
/// hardware. `interrupts_disable`/`interrupts_restore` are exercised for
/// their side effect (matched enter/exit), never their return value.
pub struct MockHal {
    depth: AtomicUsize,
}

impl MockHal {
    pub fn new() -> Self {
        Self { depth: AtomicUsize::new(0) }
    }

    /// Current nesting depth — 0 outside any critical section. Tests use
    /// this to assert every `CriticalSection` guard was dropped.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

impl Hal for MockHal {
    fn interrupts_disable(&self) -> usize {
        self.depth.fetch_add(1, Ordering::Relaxed)
    }

    fn interrupts_restore(&self, prev: usize) {
        self.depth.store(prev, Ordering::Relaxed);
    }

    fn stack_init(&self, _entry: usize, _param: usize, stack_top: usize, _exit_trampoline: usize) -> usize {
        // No real stack frame is ever unwound in tests; a stable,
        // recognizable value is enough for assertions that only check
        // `Thread::sp` was set at all.
        stack_top
    }
}

/// Ready-table double: per-priority FIFO queues plus a `current` slot.
///
/// `SchedulerOps::insert_ready`/`remove_ready` don't carry a priority —
/// the real ready-queue picker reads it straight off the `Thread`
/// struct it already owns (out of this crate's scope). This mock has no
/// `Thread` table of its own, so tests call `note_priority` once after
/// `thread::init`/`thread::startup` to tell it which bucket a `ThreadId`
/// belongs in; `insert_ready` then files the thread into that bucket
/// (defaulting to priority 0 if never noted).
pub struct MockScheduler {
    priorities: BTreeMap<ThreadId, u8>,
    ready: BTreeMap<u8, VecDeque<ThreadId>>,
    current: Option<ThreadId>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self {
            priorities: BTreeMap::new(),
            ready: BTreeMap::new(),
            current: None,
        }
    }

    pub fn note_priority(&mut self, thread: ThreadId, priority: u8) {
        self.priorities.insert(thread, priority);
    }

    fn priority_of(&self, thread: ThreadId) -> u8 {
        self.priorities.get(&thread).copied().unwrap_or(0)
    }

    /// Snapshot of the ready bucket a thread was last inserted into, in
    /// queue order. Empty if the thread isn't ready.
    pub fn ready_bucket(&self, priority: u8) -> Vec<ThreadId> {
        self.ready.get(&priority).map(|q| q.iter().copied().collect()).unwrap_or_default()
    }
}

impl Default for MockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerOps for MockScheduler {
    fn insert_ready(&mut self, thread: ThreadId) {
        let priority = self.priority_of(thread);
        let bucket = self.ready.entry(priority).or_default();
        if !bucket.contains(&thread) {
            bucket.push_back(thread);
        }
    }

    fn remove_ready(&mut self, thread: ThreadId) {
        for bucket in self.ready.values_mut() {
            if let Some(pos) = bucket.iter().position(|&t| t == thread) {
                bucket.remove(pos);
            }
        }
    }

    fn reschedule(&mut self) {
        self.current = self
            .ready
            .iter()
            .find(|(_, bucket)| !bucket.is_empty())
            .and_then(|(_, bucket)| bucket.front().copied());
    }

    fn current(&self) -> Option<ThreadId> {
        self.current
    }

    fn rotate_same_priority(&mut self, thread: ThreadId) {
        let priority = self.priority_of(thread);
        if let Some(bucket) = self.ready.get_mut(&priority) {
            if let Some(pos) = bucket.iter().position(|&t| t == thread) {
                let tid = bucket.remove(pos).unwrap();
                bucket.push_back(tid);
            }
        }
    }

    fn has_peer(&self, thread: ThreadId) -> bool {
        let priority = self.priority_of(thread);
        self.ready.get(&priority).map(|bucket| bucket.len() > 1).unwrap_or(false)
    }
}

/// Per-thread one-shot timer double driven by a virtual clock instead
/// of real hardware ticks. `set_timeout`/`start`/`stop`/`detach` record
/// state; `advance(ticks)` is the test-only entry point standing in for
/// a tick ISR, returning the threads whose timer just elapsed so the
/// test can feed them into `thread::timeout` itself.
pub struct MockTimer {
    remaining: BTreeMap<ThreadId, u64>,
    armed: BTreeMap<ThreadId, bool>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self {
            remaining: BTreeMap::new(),
            armed: BTreeMap::new(),
        }
    }

    pub fn is_armed(&self, thread: ThreadId) -> bool {
        self.armed.get(&thread).copied().unwrap_or(false)
    }

    /// Decrement every armed timer by `ticks`; disarm and return the ids
    /// of every one that reached zero, in the order they were found.
    pub fn advance(&mut self, ticks: u64) -> Vec<ThreadId> {
        let mut expired = Vec::new();
        for (&thread, remaining) in self.remaining.iter_mut() {
            if !self.armed.get(&thread).copied().unwrap_or(false) {
                continue;
            }
            *remaining = remaining.saturating_sub(ticks);
            if *remaining == 0 {
                expired.push(thread);
            }
        }
        for &thread in &expired {
            self.armed.insert(thread, false);
        }
        expired
    }
}

impl Default for MockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerOps for MockTimer {
    fn set_timeout(&mut self, thread: ThreadId, ticks: u64) {
        self.remaining.insert(thread, ticks);
        self.armed.insert(thread, false);
    }

    fn start(&mut self, thread: ThreadId) {
        self.armed.insert(thread, true);
    }

    fn stop(&mut self, thread: ThreadId) {
        self.armed.insert(thread, false);
    }

    fn detach(&mut self, thread: ThreadId) {
        self.remaining.remove(&thread);
        self.armed.remove(&thread);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_scheduler_picks_lowest_numeric_priority_first() {
        let mut sched = MockScheduler::new();
        sched.note_priority(ThreadId(0), 20);
        sched.note_priority(ThreadId(1), 5);
        sched.insert_ready(ThreadId(0));
        sched.insert_ready(ThreadId(1));
        sched.reschedule();
        assert_eq!(sched.current(), Some(ThreadId(1)));
    }

    #[test]
    fn mock_timer_advance_reports_expired_threads_once() {
        let mut timer = MockTimer::new();
        timer.set_timeout(ThreadId(0), 10);
        timer.start(ThreadId(0));
        assert!(timer.advance(4).is_empty());
        assert_eq!(timer.advance(6), alloc::vec![ThreadId(0)]);
        assert!(timer.advance(1).is_empty());
    }
}
