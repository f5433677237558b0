/*
 * Message Queue (component K)
 *
 * Fixed-size message cells drawn from a free-list pool, queued FIFO on
 * `send` or pushed to the front on `send_urgent`. This keeps the
 * message-queue cell-pool shape (a preallocated array of fixed-size
 * buffers, threaded onto a free list and a queued list) but indexes
 * cells rather than linking them through raw pointers.
 *
 * Like the mailbox (component J), `send`/`send_urgent` are total,
 * non-blocking functions: spec.md §4.K describes them as "pop a free
 * cell ... if waiters, wake one" with no suspend path — a full pool
 * reports `FULL` immediately rather than blocking a producer. Only
 * `recv` can suspend the caller.
 */

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::{KResult, KernelError};
use crate::hal::CriticalSection;
use crate::kernel::Kernel;
use crate::object::{ObjectClass, ObjectHeader, ObjectTag};
use crate::thread::ThreadId;
use crate::waitqueue::{WaitFlag, WaitQueue};

pub struct MessageQueue {
    pub header: ObjectHeader,
    msg_size: usize,
    cells: Vec<Vec<u8>>,
    free: VecDeque<usize>,
    queued: VecDeque<usize>,
    recv_waiters: WaitQueue,
}

impl MessageQueue {
    pub fn init(ctx: &mut Kernel, name: &str, msg_size: usize, capacity: usize) -> Self {
        let mq = Self {
            header: ObjectHeader::new(ObjectClass::MessageQueue, name, true),
            msg_size,
            cells: vec![vec![0u8; msg_size]; capacity],
            free: (0..capacity).collect(),
            queued: VecDeque::with_capacity(capacity),
            recv_waiters: WaitQueue::new(),
        };
        ctx.registry.insert(ObjectClass::MessageQueue, mq.header.name.clone(), ObjectTag(0));
        mq
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    /// Returns whether a waiter was woken, so callers can reschedule
    /// only after their critical section has been dropped.
    fn enqueue_cell(&mut self, ctx: &mut Kernel, data: &[u8], urgent: bool) -> KResult<bool> {
        if data.len() > self.msg_size {
            return Err(KernelError::Error);
        }
        let Some(cell) = self.free.pop_front() else {
            return Err(KernelError::Full);
        };
        self.cells[cell][..data.len()].copy_from_slice(data);
        self.cells[cell][data.len()..].fill(0);
        if urgent {
            self.queued.push_front(cell);
        } else {
            self.queued.push_back(cell);
        }
        Ok(self.recv_waiters.resume_one(ctx, None).is_some())
    }

    /// Enqueue `data` at the tail, waking one blocked receiver if any.
    /// `Err(KernelError::Error)` if `data` exceeds the queue's fixed
    /// cell size; `Err(KernelError::Full)` if no free cell remains.
    pub fn send(&mut self, ctx: &mut Kernel, data: &[u8]) -> KResult<()> {
        let woke = {
            let _cs = CriticalSection::enter(ctx.hal);
            self.enqueue_cell(ctx, data, false)?
        };
        if woke {
            ctx.scheduler.reschedule();
        }
        Ok(())
    }

    /// Enqueue `data` at the head, jumping ahead of any message already
    /// queued. Same error behavior as `send`.
    pub fn send_urgent(&mut self, ctx: &mut Kernel, data: &[u8]) -> KResult<()> {
        let woke = {
            let _cs = CriticalSection::enter(ctx.hal);
            self.enqueue_cell(ctx, data, true)?
        };
        if woke {
            ctx.scheduler.reschedule();
        }
        Ok(())
    }

    /// Receive the head message into `buf`, blocking up to `timeout`
    /// ticks while the queue is empty. Returns the number of bytes
    /// copied.
    pub fn recv(&mut self, ctx: &mut Kernel, tid: ThreadId, buf: &mut [u8], timeout: i64) -> KResult<usize> {
        loop {
            {
                let _cs = CriticalSection::enter(ctx.hal);
                if let Some(cell) = self.queued.pop_front() {
                    let len = self.msg_size.min(buf.len());
                    buf[..len].copy_from_slice(&self.cells[cell][..len]);
                    self.free.push_back(cell);
                    return Ok(len);
                }
                if timeout == crate::config::NO_WAIT {
                    return Err(KernelError::Empty);
                }
            }
            self.recv_waiters.wait(ctx, tid, WaitFlag::Fifo, timeout)?;
        }
    }

    /// Tear down a statically initialized message queue, waking every
    /// blocked receiver with `KernelError::Error`.
    pub fn detach(&mut self, ctx: &mut Kernel) {
        self.recv_waiters.resume_all(ctx, Some(KernelError::Error));
        ctx.registry.remove(ObjectClass::MessageQueue, &self.header.name);
    }
}
