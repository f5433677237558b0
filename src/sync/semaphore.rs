/*
 * Counting Semaphore (component G)
 *
 * The simplest wait-queue consumer: an integer count plus a FIFO queue
 * of blocked takers. `release` either wakes the oldest waiter (handing
 * it the unit of resource directly, without incrementing `value`) or,
 * if nobody is waiting, increments `value`.
 */

use crate::error::{KResult, KernelError};
use crate::hal::CriticalSection;
use crate::kernel::Kernel;
use crate::object::{ObjectClass, ObjectHeader, ObjectTag};
use crate::thread::ThreadId;
use crate::waitqueue::{WaitFlag, WaitQueue};

pub struct Semaphore {
    pub header: ObjectHeader,
    value: i32,
    waiters: WaitQueue,
}

impl Semaphore {
    /// Statically initialize a semaphore with `initial` available
    /// resources.
    pub fn init(ctx: &mut Kernel, name: &str, initial: i32) -> Self {
        let sem = Self {
            header: ObjectHeader::new(ObjectClass::Semaphore, name, true),
            value: initial,
            waiters: WaitQueue::new(),
        };
        ctx.registry.insert(ObjectClass::Semaphore, sem.header.name.clone(), ObjectTag(0));
        sem
    }

    /// Current count. Supplemental accessor (spec.md has no direct
    /// read of semaphore state; useful for diagnostics and tests).
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Take one unit, blocking up to `timeout` ticks if none is
    /// available (`config::WAIT_FOREVER`/`config::NO_WAIT` as usual).
    pub fn take(&mut self, ctx: &mut Kernel, tid: ThreadId, timeout: i64) -> KResult<()> {
        {
            let _cs = CriticalSection::enter(ctx.hal);
            if self.value > 0 {
                self.value -= 1;
                crate::trace::on_take(ObjectClass::Semaphore, self.header.name.as_str());
                return Ok(());
            }
        }
        self.waiters.wait(ctx, tid, WaitFlag::Fifo, timeout)?;
        crate::trace::on_take(ObjectClass::Semaphore, self.header.name.as_str());
        Ok(())
    }

    /// Take one unit without blocking; `Err(KernelError::Empty)` if
    /// none available.
    pub fn trytake(&mut self, ctx: &Kernel) -> KResult<()> {
        let _cs = CriticalSection::enter(ctx.hal);
        if self.value > 0 {
            self.value -= 1;
            crate::trace::on_take(ObjectClass::Semaphore, self.header.name.as_str());
            Ok(())
        } else {
            Err(KernelError::Empty)
        }
    }

    /// Release one unit: hands it directly to the oldest waiter if one
    /// is blocked, otherwise increments `value`.
    pub fn release(&mut self, ctx: &mut Kernel) {
        let woke = {
            let _cs = CriticalSection::enter(ctx.hal);
            let woke = self.waiters.resume_one(ctx, None).is_some();
            if !woke {
                self.value += 1;
            }
            crate::trace::on_release(ObjectClass::Semaphore, self.header.name.as_str());
            woke
        };
        if woke {
            ctx.scheduler.reschedule();
        }
    }

    /// Tear down a statically initialized semaphore, waking every
    /// waiter with `KernelError::Error`.
    pub fn detach(&mut self, ctx: &mut Kernel) {
        self.waiters.resume_all(ctx, Some(KernelError::Error));
        ctx.registry.remove(ObjectClass::Semaphore, &self.header.name);
    }
}
