/*
 * Event Flags (component I)
 *
 * A 32-bit set of flags threads wait on in combination: AND (all
 * requested bits must be set) or OR (any one suffices), optionally
 * clearing the matched bits on receipt. Unlike the semaphore/mutex wait
 * queue, a waiter here isn't satisfied by "next in line" — every
 * waiter's own requested mask has to be re-tested against the flag set
 * after each `send`, so this component keeps its own waiter list
 * instead of reusing `waitqueue::WaitQueue`.
 */

use alloc::vec::Vec;
use bitflags::bitflags;

use crate::error::{KResult, KernelError};
use crate::hal::CriticalSection;
use crate::kernel::Kernel;
use crate::object::{ObjectClass, ObjectHeader, ObjectTag};
use crate::thread::{self, ThreadId, ThreadState};

bitflags! {
    /// Wait mode passed to `EventFlags::recv`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventOption: u8 {
        /// Every requested bit must be set (mutually exclusive with `OR`).
        const AND = 0b001;
        /// Any requested bit suffices (mutually exclusive with `AND`).
        const OR = 0b010;
        /// Clear the matched bits from the set before returning.
        const CLEAR = 0b100;
    }
}

struct Waiter {
    tid: ThreadId,
    requested: u32,
    option: EventOption,
}

fn matches(set: u32, requested: u32, option: EventOption) -> bool {
    if option.contains(EventOption::AND) {
        set & requested == requested
    } else {
        set & requested != 0
    }
}

pub struct EventFlags {
    pub header: ObjectHeader,
    set: u32,
    waiters: Vec<Waiter>,
}

impl EventFlags {
    pub fn init(ctx: &mut Kernel, name: &str) -> Self {
        let flags = Self {
            header: ObjectHeader::new(ObjectClass::EventFlags, name, true),
            set: 0,
            waiters: Vec::new(),
        };
        ctx.registry.insert(ObjectClass::EventFlags, flags.header.name.clone(), ObjectTag(0));
        flags
    }

    pub fn current(&self) -> u32 {
        self.set
    }

    /// OR the given bits into the set and wake every waiter whose
    /// request now matches, each getting the set as it stood for that
    /// waiter (so a `CLEAR` waiter doesn't see bits a later waiter's
    /// clear already removed).
    pub fn send(&mut self, ctx: &mut Kernel, bits: u32) {
        {
            let _cs = CriticalSection::enter(ctx.hal);
            self.set |= bits;

            let mut remaining = Vec::new();
            for waiter in self.waiters.drain(..) {
                if matches(self.set, waiter.requested, waiter.option) {
                    let matched = self.set & waiter.requested;
                    if waiter.option.contains(EventOption::CLEAR) {
                        self.set &= !matched;
                    }
                    ctx.threads[waiter.tid].event.event_set = matched;
                    ctx.threads[waiter.tid].error = None;
                    let _ = thread::resume(ctx, waiter.tid);
                } else {
                    remaining.push(waiter);
                }
            }
            self.waiters = remaining;
        }
        // spec.md §4.I: "Reschedule once after the scan" — unconditional,
        // not gated on whether anyone actually matched.
        ctx.scheduler.reschedule();
    }

    /// Block until `requested` matches per `option`, or `timeout` ticks
    /// elapse. Returns the matched bits (pre-clear).
    pub fn recv(&mut self, ctx: &mut Kernel, tid: ThreadId, requested: u32, option: EventOption, timeout: i64) -> KResult<u32> {
        assert!(
            option.contains(EventOption::AND) != option.contains(EventOption::OR),
            "exactly one of AND/OR must be set"
        );

        {
            let _cs = CriticalSection::enter(ctx.hal);
            if matches(self.set, requested, option) {
                let matched = self.set & requested;
                if option.contains(EventOption::CLEAR) {
                    self.set &= !matched;
                }
                return Ok(matched);
            }
            if timeout == crate::config::NO_WAIT {
                return Err(KernelError::Timeout);
            }
            ctx.threads[tid].error = None;
            ctx.scheduler.remove_ready(tid);
            ctx.threads[tid].state = ThreadState::Suspend;
            self.waiters.push(Waiter { tid, requested, option });
            if timeout > crate::config::NO_WAIT {
                ctx.timer.set_timeout(tid, timeout as u64);
                ctx.timer.start(tid);
            }
        }
        ctx.scheduler.reschedule();

        match ctx.threads[tid].error {
            None => Ok(ctx.threads[tid].event.event_set),
            Some(KernelError::Timeout) => {
                self.waiters.retain(|w| w.tid != tid);
                Err(KernelError::Timeout)
            }
            Some(e) => Err(e),
        }
    }

    pub fn detach(&mut self, ctx: &mut Kernel) {
        if !self.waiters.is_empty() {
            log::warn!("event flags {}: broadcasting error to {} waiter(s)", self.header.name.as_str(), self.waiters.len());
        }
        for waiter in self.waiters.drain(..) {
            ctx.threads[waiter.tid].error = Some(KernelError::Error);
            let _ = thread::resume(ctx, waiter.tid);
        }
        ctx.registry.remove(ObjectClass::EventFlags, &self.header.name);
    }
}

/// A smaller, 8-bit event-flags variant for memory-constrained objects
/// (supplemental — spec.md only specifies the 32-bit form).
///
/// Its waiter list is kept in arrival order regardless of the
/// `WaitFlag` passed to `recv`: a `WaitFlag::Prio` request degenerates
/// to a plain tail-append here rather than a priority-ordered insert.
/// This mirrors the 32-bit component's own documented behavior — see
/// DESIGN.md's note on event-flags wait ordering — and is preserved
/// rather than fixed, so this type's PRIO mode is really FIFO in
/// disguise. Callers that need true priority ordering should use
/// `EventFlags` instead.
pub struct CompactEventFlags {
    pub header: ObjectHeader,
    set: u8,
    waiters: Vec<Waiter>,
}

impl CompactEventFlags {
    pub fn init(ctx: &mut Kernel, name: &str) -> Self {
        let flags = Self {
            header: ObjectHeader::new(ObjectClass::EventFlags, name, true),
            set: 0,
            waiters: Vec::new(),
        };
        ctx.registry.insert(ObjectClass::EventFlags, flags.header.name.clone(), ObjectTag(0));
        flags
    }

    pub fn current(&self) -> u8 {
        self.set
    }

    pub fn send(&mut self, ctx: &mut Kernel, bits: u8) {
        {
            let _cs = CriticalSection::enter(ctx.hal);
            self.set |= bits;
            let wide = self.set as u32;

            let mut remaining = Vec::new();
            for waiter in self.waiters.drain(..) {
                if matches(wide, waiter.requested, waiter.option) {
                    let matched = wide & waiter.requested;
                    if waiter.option.contains(EventOption::CLEAR) {
                        self.set &= !(matched as u8);
                    }
                    ctx.threads[waiter.tid].event.event_set = matched;
                    ctx.threads[waiter.tid].error = None;
                    let _ = thread::resume(ctx, waiter.tid);
                } else {
                    remaining.push(waiter);
                }
            }
            self.waiters = remaining;
        }
        ctx.scheduler.reschedule();
    }

    pub fn recv(&mut self, ctx: &mut Kernel, tid: ThreadId, requested: u8, option: EventOption, timeout: i64) -> KResult<u8> {
        let requested = requested as u32;
        {
            let _cs = CriticalSection::enter(ctx.hal);
            let wide = self.set as u32;
            if matches(wide, requested, option) {
                let matched = wide & requested;
                if option.contains(EventOption::CLEAR) {
                    self.set &= !(matched as u8);
                }
                return Ok(matched as u8);
            }
            if timeout == crate::config::NO_WAIT {
                return Err(KernelError::Timeout);
            }
            ctx.threads[tid].error = None;
            ctx.scheduler.remove_ready(tid);
            ctx.threads[tid].state = ThreadState::Suspend;
            // Bug preserved on purpose: every insert is a tail-append,
            // even when the caller asked for priority ordering.
            self.waiters.push(Waiter { tid, requested, option });
            if timeout > crate::config::NO_WAIT {
                ctx.timer.set_timeout(tid, timeout as u64);
                ctx.timer.start(tid);
            }
        }
        ctx.scheduler.reschedule();

        match ctx.threads[tid].error {
            None => Ok(ctx.threads[tid].event.event_set as u8),
            Some(KernelError::Timeout) => {
                self.waiters.retain(|w| w.tid != tid);
                Err(KernelError::Timeout)
            }
            Some(e) => Err(e),
        }
    }

    pub fn detach(&mut self, ctx: &mut Kernel) {
        if !self.waiters.is_empty() {
            log::warn!("event flags {}: broadcasting error to {} waiter(s)", self.header.name.as_str(), self.waiters.len());
        }
        for waiter in self.waiters.drain(..) {
            ctx.threads[waiter.tid].error = Some(KernelError::Error);
            let _ = thread::resume(ctx, waiter.tid);
        }
        ctx.registry.remove(ObjectClass::EventFlags, &self.header.name);
    }
}
