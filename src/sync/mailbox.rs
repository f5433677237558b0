/*
 * Mailbox (component J)
 *
 * A bounded ring buffer of `usize`-sized messages (pointers or small
 * scalars, per spec.md's mailbox payload convention). `send` is a total,
 * non-blocking function — it fails fast with `FULL` rather than
 * suspending a producer. Only `recv` can block a caller, on an empty
 * mailbox. spec.md §4.J and §9 call this out explicitly: the reference
 * never wakes a send-side waiter from `recv` because there is no
 * send-side wait queue to wake — senders never block in the first
 * place. ISRs can therefore call `send` freely (spec.md §5 forbids
 * blocking calls from interrupt context).
 */

use alloc::collections::VecDeque;

use crate::error::{KResult, KernelError};
use crate::hal::CriticalSection;
use crate::kernel::Kernel;
use crate::object::{ObjectClass, ObjectHeader, ObjectTag};
use crate::thread::ThreadId;
use crate::waitqueue::{WaitFlag, WaitQueue};

pub struct Mailbox {
    pub header: ObjectHeader,
    capacity: usize,
    buffer: VecDeque<usize>,
    recv_waiters: WaitQueue,
}

impl Mailbox {
    pub fn init(ctx: &mut Kernel, name: &str, capacity: usize) -> Self {
        let mb = Self {
            header: ObjectHeader::new(ObjectClass::Mailbox, name, true),
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            recv_waiters: WaitQueue::new(),
        };
        ctx.registry.insert(ObjectClass::Mailbox, mb.header.name.clone(), ObjectTag(0));
        mb
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Place `value` at the tail, waking one blocked receiver if any.
    /// Fails fast with `FULL` rather than blocking — mailbox send never
    /// suspends the caller, callable from ISR context.
    pub fn send(&mut self, ctx: &mut Kernel, value: usize) -> KResult<()> {
        let woke = {
            let _cs = CriticalSection::enter(ctx.hal);
            if self.buffer.len() >= self.capacity {
                return Err(KernelError::Full);
            }
            self.buffer.push_back(value);
            self.recv_waiters.resume_one(ctx, None).is_some()
        };
        if woke {
            ctx.scheduler.reschedule();
        }
        Ok(())
    }

    /// Receive one value, blocking up to `timeout` ticks while the
    /// mailbox is empty.
    pub fn recv(&mut self, ctx: &mut Kernel, tid: ThreadId, timeout: i64) -> KResult<usize> {
        loop {
            {
                let _cs = CriticalSection::enter(ctx.hal);
                if let Some(value) = self.buffer.pop_front() {
                    return Ok(value);
                }
                if timeout == crate::config::NO_WAIT {
                    return Err(KernelError::Empty);
                }
            }
            self.recv_waiters.wait(ctx, tid, WaitFlag::Fifo, timeout)?;
        }
    }

    /// Tear down a statically initialized mailbox, waking every blocked
    /// receiver with `KernelError::Error`.
    pub fn detach(&mut self, ctx: &mut Kernel) {
        self.recv_waiters.resume_all(ctx, Some(KernelError::Error));
        ctx.registry.remove(ObjectClass::Mailbox, &self.header.name);
    }
}
