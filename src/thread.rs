/*
 * Thread Core
 *
 * The thread lifecycle, state machine, priority changes, yield, sleep,
 * suspend/resume and the timer-expiry callback — the 30% of the core
 * spec.md attributes to this component, and the one piece of the
 * concurrency kernel every sync primitive in `sync/` builds on.
 *
 * Threads live in a flat arena (`ThreadTable`) rather than as
 * self-referential intrusive-list nodes: the teacher's own scheduler
 * state already keeps `threads: Vec<Thread>` and looks threads up by
 * `ThreadId`, and an arena index sidesteps the unsafe aliasing a C-style
 * embedded `node` field would need in safe Rust (see DESIGN.md's note on
 * the "typed list slot" alternative spec.md's design notes suggest).
 */

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

use crate::config::{self, PRIO_MAX};
use crate::error::{KResult, KernelError};
use crate::hal::CriticalSection;
use crate::kernel::Kernel;
use crate::object::{ObjectClass, ObjectHeader, ObjectTag};
use crate::timer::TimerFlag;

/// Thread identifier: an index into the owning `ThreadTable`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub usize);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thread({})", self.0)
    }
}

/// Thread entry point: `fn(parameter)`. Parameters are passed as a raw
/// `usize` rather than a generic payload — this matches the stack-init
/// ABI (`hal::Hal::stack_init`) which only ever deals in register-sized
/// values.
pub type ThreadEntry = fn(usize);

/// Thread state machine (spec.md §4.E).
///
/// ```text
/// Init --startup--> Suspend --resume--> Ready
/// Ready --suspend/sleep/wait--> Suspend
/// Ready --exit--> Close
/// Suspend --timeout or wake--> Ready
/// ```
/// `Close` is terminal; any transition not listed above is illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Init,
    Ready,
    Suspend,
    Close,
}

/// Parameters carried across a blocking event-flags wait (spec.md §3).
#[derive(Debug, Clone, Copy, Default)]
pub struct EventWait {
    pub event_set: u32,
    pub event_info: u8,
}

/// A schedulable thread of execution.
pub struct Thread {
    pub header: ObjectHeader,
    pub entry: ThreadEntry,
    pub parameter: usize,

    pub stack_base: usize,
    pub stack_size: usize,
    pub sp: usize,
    /// Heap-owned stack storage, present only for threads created via
    /// `create` (feature = "heap"). `None` for statically initialized
    /// threads, whose stack memory the caller owns.
    owned_stack: Option<Box<[u8]>>,

    pub init_priority: u8,
    pub current_priority: u8,
    /// Priority group (`priority >> 3`), meaningful only when
    /// `PRIO_MAX > 32`.
    pub group: u8,
    pub group_mask: u32,
    pub bit_mask: u32,

    pub state: ThreadState,

    pub init_tick: u32,
    pub remaining_tick: u32,

    /// Wake-up reason stamped by whoever resumed this thread, observed
    /// by the thread itself immediately after `reschedule()` returns.
    /// `None` means "woken normally" (resource became available).
    pub error: Option<KernelError>,

    pub timer_flag: TimerFlag,

    pub event: EventWait,

    pub flags: u32,
    pub user_data: usize,
}

impl Thread {
    /// Whether this thread's resources are owned by the embedder
    /// (static) rather than this crate's heap-backed `create`.
    pub fn is_static(&self) -> bool {
        self.header.is_static
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("name", &self.header.name.as_str())
            .field("state", &self.state)
            .field("priority", &self.current_priority)
            .finish()
    }
}

/// Snapshot of a thread for diagnostics. Read-only, no scheduling
/// effect — grounded in the teacher's `ThreadManager::stats()`.
#[derive(Debug, Clone)]
pub struct ThreadStats {
    pub id: ThreadId,
    pub state: ThreadState,
    pub priority: u8,
    pub remaining_tick: u32,
}

/// Thread control-block arena plus the defunct list self-terminated
/// heap-owned threads enqueue onto (spec.md §9 "Defunct list").
pub struct ThreadTable {
    arena: Vec<Thread>,
    defunct: VecDeque<ThreadId>,
}

impl Default for ThreadTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadTable {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            defunct: VecDeque::new(),
        }
    }

    fn push(&mut self, thread: Thread) -> ThreadId {
        let id = ThreadId(self.arena.len());
        self.arena.push(thread);
        id
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThreadId, &Thread)> {
        self.arena.iter().enumerate().map(|(i, t)| (ThreadId(i), t))
    }

    pub fn stats(&self) -> Vec<ThreadStats> {
        self.iter()
            .map(|(id, t)| ThreadStats {
                id,
                state: t.state,
                priority: t.current_priority,
                remaining_tick: t.remaining_tick,
            })
            .collect()
    }

    fn push_defunct(&mut self, id: ThreadId) {
        self.defunct.push_back(id);
    }

    /// Drain up to `budget` defunct threads, freeing their heap-owned
    /// stack storage. Returns the number actually reaped. Intended to be
    /// called periodically by an idle-priority cleaner thread the
    /// embedder owns (spec.md §9).
    pub fn reap_defunct(&mut self, budget: usize) -> usize {
        let mut reaped = 0;
        while reaped < budget {
            let Some(id) = self.defunct.pop_front() else {
                break;
            };
            self.arena[id.0].owned_stack = None;
            reaped += 1;
        }
        reaped
    }
}

impl Index<ThreadId> for ThreadTable {
    type Output = Thread;
    fn index(&self, id: ThreadId) -> &Thread {
        &self.arena[id.0]
    }
}

impl IndexMut<ThreadId> for ThreadTable {
    fn index_mut(&mut self, id: ThreadId) -> &mut Thread {
        &mut self.arena[id.0]
    }
}

/// `priority >> 3`, `1 << group`, `1 << (priority & 7)` when
/// `PRIO_MAX > 32`; a flat `1 << priority` bit_mask otherwise
/// (spec.md §3).
fn bitmap_coords(priority: u8) -> (u8, u32, u32) {
    if PRIO_MAX > 32 {
        let group = priority >> 3;
        (group, 1u32 << group, 1u32 << (priority & 7))
    } else {
        (0, 0, 1u32 << priority)
    }
}

/// Dispatch command for `control`.
pub enum ControlCmd {
    ChangePriority(u8),
    Startup,
    Close,
}

/// Fill a thread's fields and register it in `ctx.threads`. The caller
/// owns the stack memory named by `stack_base`/`stack_size`; pass
/// `is_static = false` only from `create`, which additionally owns the
/// allocation via `owned_stack`.
#[allow(clippy::too_many_arguments)]
fn init_internal(
    ctx: &mut Kernel,
    name: &str,
    entry: ThreadEntry,
    parameter: usize,
    stack_base: usize,
    stack_size: usize,
    priority: u8,
    tick: u32,
    is_static: bool,
) -> ThreadId {
    assert!((priority as usize) < PRIO_MAX, "priority out of range");

    let (group, group_mask, bit_mask) = bitmap_coords(priority);

    // Paint the stack with a recognizable pattern so a later watermark
    // scan can estimate high-water usage. `stack_base`/`stack_size`
    // describe memory the caller has handed us exclusive use of — true
    // of the real embedder, not of this crate's own tests, which pass
    // arbitrary integers as a stand-in address and never dereference
    // them (`MockHal::stack_init` doesn't either), so painting is
    // skipped entirely under `cfg(test)`.
    #[cfg(not(test))]
    if stack_size > 0 {
        unsafe {
            core::ptr::write_bytes(stack_base as *mut u8, config::STACK_FILL_PATTERN, stack_size);
        }
    }

    let stack_top = stack_base + stack_size;
    let sp = ctx.hal.stack_init(
        entry as usize,
        parameter,
        stack_top,
        thread_exit_trampoline as usize,
    );

    let thread = Thread {
        header: ObjectHeader::new(ObjectClass::Thread, name, is_static),
        entry,
        parameter,
        stack_base,
        stack_size,
        sp,
        owned_stack: None,
        init_priority: priority,
        current_priority: priority,
        group,
        group_mask,
        bit_mask,
        state: ThreadState::Init,
        init_tick: tick,
        remaining_tick: tick,
        error: None,
        timer_flag: TimerFlag::empty(),
        event: EventWait::default(),
        flags: 0,
        user_data: 0,
    };

    let id = ctx.threads.push(thread);
    let name_fixed = ctx.threads[id].header.name.clone();
    ctx.registry
        .insert(ObjectClass::Thread, name_fixed, ObjectTag(id.0 as u64));
    id
}

/// Placeholder symbol for the exit trampoline address passed to
/// `hal::Hal::stack_init`. A real HAL implementation never calls this
/// function directly — it only needs its address, and its own assembly
/// trampoline jumps to `exit_current` once `entry(param)` returns.
extern "C" fn thread_exit_trampoline() {
    unreachable!("hal::Hal::stack_init trampolines must call thread::exit_current, not this symbol");
}

/// Statically initialize a thread over caller-owned memory
/// (`stack_base`/`stack_size`). State becomes `Init`.
#[allow(clippy::too_many_arguments)]
pub fn init(
    ctx: &mut Kernel,
    name: &str,
    entry: ThreadEntry,
    parameter: usize,
    stack_base: usize,
    stack_size: usize,
    priority: u8,
    tick: u32,
) -> ThreadId {
    init_internal(ctx, name, entry, parameter, stack_base, stack_size, priority, tick, true)
}

/// Allocate a thread object and its stack from the heap and delegate to
/// `init`. Returns `None` on allocation failure, rolling back any
/// partial allocation (feature = "heap").
#[cfg(feature = "heap")]
#[allow(clippy::too_many_arguments)]
pub fn create(
    ctx: &mut Kernel,
    name: &str,
    entry: ThreadEntry,
    parameter: usize,
    stack_size: usize,
    priority: u8,
    tick: u32,
) -> Option<ThreadId> {
    let mut stack: Vec<u8> = Vec::new();
    stack.try_reserve_exact(stack_size).ok()?;
    stack.resize(stack_size, 0);
    let mut boxed = stack.into_boxed_slice();
    let stack_base = boxed.as_mut_ptr() as usize;

    let id = init_internal(ctx, name, entry, parameter, stack_base, stack_size, priority, tick, false);
    ctx.threads[id].owned_stack = Some(boxed);
    Some(id)
}

/// Transition `Init -> Suspend -> Ready` and insert into the ready
/// table. Precondition: `state == Init`.
pub fn startup(ctx: &mut Kernel, tid: ThreadId) -> KResult<()> {
    let _cs = CriticalSection::enter(ctx.hal);
    if ctx.threads[tid].state != ThreadState::Init {
        return Err(KernelError::Error);
    }
    ctx.threads[tid].current_priority = ctx.threads[tid].init_priority;
    let (group, group_mask, bit_mask) = bitmap_coords(ctx.threads[tid].current_priority);
    ctx.threads[tid].group = group;
    ctx.threads[tid].group_mask = group_mask;
    ctx.threads[tid].bit_mask = bit_mask;
    ctx.threads[tid].state = ThreadState::Suspend;
    drop(_cs);
    log::trace!("thread {} startup at priority {}", tid, ctx.threads[tid].current_priority);
    resume(ctx, tid)
}

/// The currently running thread, maintained process-wide by the
/// scheduler collaborator.
pub fn current(ctx: &Kernel) -> Option<ThreadId> {
    ctx.scheduler.current()
}

/// Rotate the current thread to the tail of its ready-table slot if it
/// has a same-priority peer, and request a reschedule. No-op otherwise.
pub fn yield_now(ctx: &mut Kernel, tid: ThreadId) {
    let should_rotate = {
        let _cs = CriticalSection::enter(ctx.hal);
        ctx.threads[tid].state == ThreadState::Ready && ctx.scheduler.has_peer(tid)
    };
    if should_rotate {
        ctx.scheduler.rotate_same_priority(tid);
        ctx.scheduler.reschedule();
    }
}

/// Suspend the calling thread and arm its timer for `ticks`. Returns
/// `Ok(())` on normal timer expiry or the error stamped by whoever woke
/// it early.
pub fn sleep(ctx: &mut Kernel, tid: ThreadId, ticks: u64) -> KResult<()> {
    {
        let _cs = CriticalSection::enter(ctx.hal);
        ctx.threads[tid].error = None;
        ctx.scheduler.remove_ready(tid);
        ctx.threads[tid].state = ThreadState::Suspend;
        ctx.timer.set_timeout(tid, ticks);
        ctx.timer.start(tid);
        ctx.threads[tid].timer_flag = TimerFlag::ACTIVE | TimerFlag::ONE_SHOT;
    }
    ctx.scheduler.reschedule();
    match ctx.threads[tid].error {
        None => Ok(()),
        Some(e) => Err(e),
    }
}

/// `sleep` alias matching spec.md's naming of both `sleep` and `delay`
/// for the same operation.
pub fn delay(ctx: &mut Kernel, tid: ThreadId, ticks: u64) -> KResult<()> {
    sleep(ctx, tid, ticks)
}

/// Precondition: `state == Ready`. Transitions to `Suspend` and removes
/// from the ready table.
pub fn suspend(ctx: &mut Kernel, tid: ThreadId) -> KResult<()> {
    let _cs = CriticalSection::enter(ctx.hal);
    if ctx.threads[tid].state != ThreadState::Ready {
        return Err(KernelError::Error);
    }
    ctx.threads[tid].state = ThreadState::Suspend;
    ctx.scheduler.remove_ready(tid);
    log::trace!("thread {} suspended", tid);
    Ok(())
}

/// Precondition: `state == Suspend`. Unlinks the thread's timer,
/// inserts it into the ready table.
///
/// Callers that suspended this thread via a wait queue (`waitqueue::
/// WaitQueue`) must have already removed it from that queue — this
/// function only handles the ready-table/timer half, matching how
/// `WaitQueue::resume_one` pops the head before calling this.
pub fn resume(ctx: &mut Kernel, tid: ThreadId) -> KResult<()> {
    let _cs = CriticalSection::enter(ctx.hal);
    if ctx.threads[tid].state != ThreadState::Suspend {
        return Err(KernelError::Error);
    }
    ctx.timer.stop(tid);
    ctx.threads[tid].timer_flag.remove(TimerFlag::ACTIVE);
    ctx.threads[tid].state = ThreadState::Ready;
    ctx.scheduler.insert_ready(tid);
    log::trace!("thread {} resumed", tid);
    Ok(())
}

/// Update a thread's priority. If the thread is `Ready`, this removes
/// and reinserts it into the ready table at the new slot. Must be
/// called under an interrupt-disabled section (the caller's, typically
/// a mutex release already holding one).
pub fn change_priority(ctx: &mut Kernel, tid: ThreadId, new_priority: u8) {
    assert!((new_priority as usize) < PRIO_MAX, "priority out of range");
    let was_ready = ctx.threads[tid].state == ThreadState::Ready;
    if was_ready {
        ctx.scheduler.remove_ready(tid);
    }
    let old_priority = ctx.threads[tid].current_priority;
    ctx.threads[tid].current_priority = new_priority;
    let (group, group_mask, bit_mask) = bitmap_coords(new_priority);
    ctx.threads[tid].group = group;
    ctx.threads[tid].group_mask = group_mask;
    ctx.threads[tid].bit_mask = bit_mask;
    if was_ready {
        ctx.scheduler.insert_ready(tid);
    }
    log::debug!("thread {} priority {} -> {}", tid, old_priority, new_priority);
}

/// Dispatch a control command.
pub fn control(ctx: &mut Kernel, tid: ThreadId, cmd: ControlCmd) -> KResult<()> {
    match cmd {
        ControlCmd::ChangePriority(p) => {
            let _cs = CriticalSection::enter(ctx.hal);
            change_priority(ctx, tid, p);
            Ok(())
        }
        ControlCmd::Startup => startup(ctx, tid),
        ControlCmd::Close => close(ctx, tid),
    }
}

/// Forcibly tear down a thread that is not the caller (used by
/// `control(_, _, ControlCmd::Close)`). Unlike `exit_current`, this can
/// target a `Ready` or `Suspend` thread and does not try to reschedule.
fn close(ctx: &mut Kernel, tid: ThreadId) -> KResult<()> {
    let _cs = CriticalSection::enter(ctx.hal);
    match ctx.threads[tid].state {
        ThreadState::Close => return Err(KernelError::Error),
        ThreadState::Ready => ctx.scheduler.remove_ready(tid),
        ThreadState::Suspend => ctx.timer.stop(tid),
        ThreadState::Init => {}
    }
    ctx.timer.detach(tid);
    ctx.threads[tid].state = ThreadState::Close;
    finalize_exit(ctx, tid);
    Ok(())
}

/// Called by the stack-init-installed return trampoline when the
/// current thread's entry function returns. Tears the thread down:
/// removes it from the ready table, detaches its timer, and either
/// detaches it from the registry (static threads) or enqueues it on the
/// defunct list for later reaping (heap-owned threads).
///
/// In a real embedding this never returns — the calling stack no longer
/// exists once `reschedule()` switches away. The mock scheduler used in
/// this crate's tests instead returns control to the harness thread,
/// since there is no separate trampoline stack to jump to on the host.
pub fn exit_current(ctx: &mut Kernel) {
    let Some(tid) = current(ctx) else {
        return;
    };
    {
        let _cs = CriticalSection::enter(ctx.hal);
        ctx.scheduler.remove_ready(tid);
        ctx.threads[tid].state = ThreadState::Close;
        ctx.timer.detach(tid);
        finalize_exit(ctx, tid);
    }
    ctx.scheduler.reschedule();
}

fn finalize_exit(ctx: &mut Kernel, tid: ThreadId) {
    let is_static = ctx.threads[tid].is_static();
    let name = ctx.threads[tid].header.name.clone();
    if is_static {
        ctx.registry.remove(ObjectClass::Thread, &name);
        log::debug!("thread {} ({}) closed, detached from registry", tid, name.as_str());
    } else {
        ctx.threads.push_defunct(tid);
        log::debug!("thread {} ({}) closed, queued for defunct sweep", tid, name.as_str());
    }
}

/// Thread-timer expiry callback, invoked by the embedder's tick
/// handling (via `timer::TimerOps`) from the same interrupt-disabled
/// context a tick ISR runs in. Precondition: `state == Suspend`.
///
/// Does not remove `tid` from whichever sync object's wait queue it is
/// blocked on — that object doesn't know it fired. Per spec.md §4.F,
/// the resumed waiter itself prunes the stale entry (see
/// `waitqueue::WaitQueue::wait`).
pub fn timeout(ctx: &mut Kernel, tid: ThreadId) {
    let _cs = CriticalSection::enter(ctx.hal);
    if ctx.threads[tid].state != ThreadState::Suspend {
        return;
    }
    ctx.threads[tid].error = Some(KernelError::Timeout);
    ctx.threads[tid].timer_flag.remove(TimerFlag::ACTIVE);
    ctx.threads[tid].state = ThreadState::Ready;
    ctx.scheduler.insert_ready(tid);
    drop(_cs);
    log::trace!("thread {} timer expired while suspended", tid);
    ctx.scheduler.reschedule();
}

/// Registry lookup by name.
pub fn find(ctx: &Kernel, name: &str) -> Option<ThreadId> {
    ctx.registry
        .find(ObjectClass::Thread, name)
        .map(|tag| ThreadId(tag.0 as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Registry;
    use crate::testing::harness::{MockHal, MockScheduler, MockTimer};

    fn entry(_: usize) {}

    struct Harness {
        hal: MockHal,
        threads: ThreadTable,
        registry: Registry,
        scheduler: MockScheduler,
        timer: MockTimer,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                hal: MockHal::new(),
                threads: ThreadTable::new(),
                registry: Registry::new(),
                scheduler: MockScheduler::new(),
                timer: MockTimer::new(),
            }
        }

        fn ctx(&mut self) -> Kernel<'_> {
            Kernel {
                hal: &self.hal,
                scheduler: &mut self.scheduler,
                timer: &mut self.timer,
                registry: &mut self.registry,
                threads: &mut self.threads,
            }
        }
    }

    #[test]
    fn init_startup_drives_init_suspend_ready() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 5, 10);
        assert_eq!(ctx.threads[tid].state, ThreadState::Init);
        startup(&mut ctx, tid).unwrap();
        assert_eq!(ctx.threads[tid].state, ThreadState::Ready);
        assert_eq!(ctx.threads[tid].current_priority, 5);
    }

    #[test]
    fn startup_on_non_init_thread_fails() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 5, 10);
        startup(&mut ctx, tid).unwrap();
        assert_eq!(startup(&mut ctx, tid), Err(KernelError::Error));
    }

    #[test]
    fn suspend_requires_ready_state() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 5, 10);
        // Still INIT: suspend must fail rather than silently transition.
        assert_eq!(suspend(&mut ctx, tid), Err(KernelError::Error));
        startup(&mut ctx, tid).unwrap();
        suspend(&mut ctx, tid).unwrap();
        assert_eq!(ctx.threads[tid].state, ThreadState::Suspend);
    }

    #[test]
    fn suspend_then_resume_restores_ready_with_unchanged_priority() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 7, 10);
        startup(&mut ctx, tid).unwrap();
        suspend(&mut ctx, tid).unwrap();
        resume(&mut ctx, tid).unwrap();
        assert_eq!(ctx.threads[tid].state, ThreadState::Ready);
        assert_eq!(ctx.threads[tid].current_priority, 7);
    }

    #[test]
    fn resume_requires_suspend_state() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 5, 10);
        startup(&mut ctx, tid).unwrap();
        // Already READY: resume must fail.
        assert_eq!(resume(&mut ctx, tid), Err(KernelError::Error));
    }

    #[test]
    fn change_priority_reinserts_a_ready_thread() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 10, 10);
        startup(&mut ctx, tid).unwrap();
        change_priority(&mut ctx, tid, 2);
        assert_eq!(ctx.threads[tid].current_priority, 2);
        assert_eq!(ctx.threads[tid].bit_mask, 1u32 << 2);
    }

    #[test]
    fn yield_now_rotates_same_priority_peer_to_tail() {
        // `note_priority`/`ready_bucket` are inherent `MockScheduler`
        // methods, not part of `SchedulerOps` — called on `h.scheduler`
        // directly rather than through `ctx.scheduler` (a `dyn
        // SchedulerOps`, which only exposes the trait's methods).
        let mut h = Harness::new();
        let (a, b) = {
            let mut ctx = h.ctx();
            let a = init(&mut ctx, "a", entry, 0, 0x1000, 256, 10, 5);
            let b = init(&mut ctx, "b", entry, 0, 0x2000, 256, 10, 5);
            (a, b)
        };
        h.scheduler.note_priority(a, 10);
        h.scheduler.note_priority(b, 10);
        {
            let mut ctx = h.ctx();
            startup(&mut ctx, a).unwrap();
            startup(&mut ctx, b).unwrap();
            assert!(ctx.scheduler.has_peer(a));
            yield_now(&mut ctx, a);
        }
        assert_eq!(h.scheduler.ready_bucket(10), alloc::vec![b, a]);
    }

    #[test]
    fn yield_now_is_noop_without_a_peer() {
        let mut h = Harness::new();
        let a = {
            let mut ctx = h.ctx();
            init(&mut ctx, "a", entry, 0, 0x1000, 256, 10, 5)
        };
        h.scheduler.note_priority(a, 10);
        {
            let mut ctx = h.ctx();
            startup(&mut ctx, a).unwrap();
            yield_now(&mut ctx, a);
        }
        assert_eq!(h.scheduler.ready_bucket(10), alloc::vec![a]);
    }

    #[test]
    fn exit_current_enqueues_heap_owned_thread_on_defunct_list() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init_internal(&mut ctx, "dyn", entry, 0, 0x1000, 256, 5, 10, false);
        startup(&mut ctx, tid).unwrap();
        ctx.scheduler.reschedule();
        assert_eq!(ctx.scheduler.current(), Some(tid));

        exit_current(&mut ctx);
        assert_eq!(ctx.threads[tid].state, ThreadState::Close);
        assert_eq!(ctx.threads.reap_defunct(10), 1);
    }

    #[test]
    fn exit_current_detaches_static_thread_from_registry_immediately() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "static", entry, 0, 0x1000, 256, 5, 10);
        startup(&mut ctx, tid).unwrap();
        ctx.scheduler.reschedule();

        exit_current(&mut ctx);
        assert_eq!(ctx.threads[tid].state, ThreadState::Close);
        assert!(find(&ctx, "static").is_none());
        // Nothing heap-owned to reap: it was never pushed onto the
        // defunct list.
        assert_eq!(ctx.threads.reap_defunct(10), 0);
    }

    #[test]
    fn timeout_wakes_a_suspended_thread_with_timeout_error() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 5, 10);
        startup(&mut ctx, tid).unwrap();
        suspend(&mut ctx, tid).unwrap();

        timeout(&mut ctx, tid);
        assert_eq!(ctx.threads[tid].state, ThreadState::Ready);
        assert_eq!(ctx.threads[tid].error, Some(KernelError::Timeout));
    }

    #[test]
    fn timeout_on_a_non_suspended_thread_is_a_noop() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "t", entry, 0, 0x1000, 256, 5, 10);
        startup(&mut ctx, tid).unwrap();
        timeout(&mut ctx, tid);
        assert_eq!(ctx.threads[tid].state, ThreadState::Ready);
        assert_eq!(ctx.threads[tid].error, None);
    }

    #[test]
    fn find_resolves_registered_static_threads_by_name() {
        let mut h = Harness::new();
        let mut ctx = h.ctx();
        let tid = init(&mut ctx, "findme", entry, 0, 0x1000, 256, 5, 10);
        assert_eq!(find(&ctx, "findme"), Some(tid));
        assert_eq!(find(&ctx, "nobody"), None);
    }
}
