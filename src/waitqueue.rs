/*
 * Wait-Queue Base
 *
 * Shared blocking primitive every synchronization object in `sync/`
 * builds on: a FIFO or priority-ordered list of blocked threads plus a
 * `wait` helper that suspends the caller and, on timeout, prunes its own
 * now-stale entry back out.
 *
 * The teacher's own `scheduler::ipc` wait-list implementation links
 * blocked threads through an intrusive list node embedded in each
 * thread's control block; that shape relies on each thread owning a
 * single node it can only be linked onto one list at a time, which a raw
 * pointer expresses cheaply in C. This crate's wait queue instead holds
 * owned `ThreadId`s in a `VecDeque` — one extra allocation per object,
 * no unsafe aliasing, and the same semantics.
 */

use alloc::collections::VecDeque;

use crate::config;
use crate::error::{KResult, KernelError};
use crate::hal::CriticalSection;
use crate::kernel::Kernel;
use crate::thread::{self, ThreadId, ThreadState};

/// Ordering a wait queue enqueues blocked threads in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitFlag {
    /// Arrival order (spec.md default for semaphore/mutex/mailbox/queue).
    Fifo,
    /// Descending priority, FIFO among equal priorities.
    Prio,
}

/// A list of threads blocked on the same resource.
#[derive(Default)]
pub struct WaitQueue {
    entries: VecDeque<ThreadId>,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert `tid` according to `flag`. Called with interrupts already
    /// disabled by the caller (every sync object enqueues from inside
    /// its own critical section, alongside the state change that put
    /// the thread here).
    pub fn enqueue(&mut self, ctx: &Kernel, tid: ThreadId, flag: WaitFlag) {
        match flag {
            WaitFlag::Fifo => self.entries.push_back(tid),
            WaitFlag::Prio => {
                let priority = ctx.threads[tid].current_priority;
                let pos = self
                    .entries
                    .iter()
                    .position(|&other| ctx.threads[other].current_priority > priority)
                    .unwrap_or(self.entries.len());
                self.entries.insert(pos, tid);
            }
        }
    }

    /// The head of the queue without removing it — used by the mutex,
    /// which must know who the next owner will be before it wakes them
    /// (so it can stamp ownership fields first).
    pub fn peek(&self, _ctx: &Kernel) -> Option<ThreadId> {
        self.entries.front().copied()
    }

    /// Remove and resume the head of the queue, if any, stamping it with
    /// `error` so the waiter can tell a normal wake-up from a torn-down
    /// object. Returns the woken thread.
    pub fn resume_one(&mut self, ctx: &mut Kernel, error: Option<KernelError>) -> Option<ThreadId> {
        let tid = self.entries.pop_front()?;
        ctx.threads[tid].error = error;
        let _ = thread::resume(ctx, tid);
        Some(tid)
    }

    /// Resume every waiter, stamping all of them with `error` — used by
    /// `detach`/`delete` (object torn down) and by event-flags broadcast
    /// wake-ups.
    pub fn resume_all(&mut self, ctx: &mut Kernel, error: Option<KernelError>) {
        if !self.entries.is_empty() {
            log::warn!("wait queue broadcasting {:?} to {} waiter(s)", error, self.entries.len());
        }
        while self.resume_one(ctx, error).is_some() {}
    }

    /// Remove `tid` from the queue without resuming it, if present. Used
    /// by a waiter pruning its own stale entry after waking via timeout
    /// rather than via `resume_one`.
    fn remove(&mut self, tid: ThreadId) -> bool {
        if let Some(pos) = self.entries.iter().position(|&t| t == tid) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Block the calling thread `tid` on this queue until it is resumed
    /// by `resume_one`/`resume_all` or `timeout` ticks elapse.
    ///
    /// `timeout` follows spec.md's convention: `config::WAIT_FOREVER`
    /// blocks with no timer armed, `config::NO_WAIT` returns
    /// `Err(KernelError::Timeout)` immediately without suspending.
    ///
    /// On a normal wake-up the resumer has already popped `tid` out of
    /// this queue. On a timeout wake-up nobody has — `thread::timeout`
    /// only flips ready-table/timer state, since it has no way to know
    /// which wait queue (if any) scheduled the timer. So the waiter
    /// prunes its own entry here before returning, per spec.md §4.F's
    /// "operations that observed a wake-up caused by timeout must also
    /// call wait_count_decrement()".
    pub fn wait(&mut self, ctx: &mut Kernel, tid: ThreadId, flag: WaitFlag, timeout: i64) -> KResult<()> {
        if timeout == config::NO_WAIT {
            return Err(KernelError::Timeout);
        }

        {
            let _cs = CriticalSection::enter(ctx.hal);
            ctx.threads[tid].error = None;
            ctx.scheduler.remove_ready(tid);
            ctx.threads[tid].state = ThreadState::Suspend;
            self.enqueue(ctx, tid, flag);
            if timeout > config::NO_WAIT {
                ctx.timer.set_timeout(tid, timeout as u64);
                ctx.timer.start(tid);
            }
        }
        ctx.scheduler.reschedule();

        match ctx.threads[tid].error {
            None => Ok(()),
            Some(KernelError::Timeout) => {
                self.remove(tid);
                Err(KernelError::Timeout)
            }
            Some(e) => Err(e),
        }
    }
}
