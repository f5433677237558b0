/*
 * Kernel Context
 *
 * Every thread and synchronization operation in this crate takes a
 * `&mut Kernel` as its first argument — the explicit-context pattern the
 * teacher's own scheduler already uses at its policy/mechanism boundary
 * (`Scheduler::on_event(&mut self, ctx: &mut dyn KernelSchedCtx, ...)`).
 * There is no process-wide singleton here: the embedder owns one
 * `Kernel` (or, in tests, one per simulated system) and threads it
 * through every call, which keeps the crate safely testable without
 * global mutable state racing across parallel test runs.
 */

use crate::hal::Hal;
use crate::object::Registry;
use crate::sched::SchedulerOps;
use crate::thread::ThreadTable;
use crate::timer::TimerOps;

/// Bundles the four external collaborators (§6) plus the in-scope
/// thread table (component E) that every kernel operation needs.
pub struct Kernel<'a> {
    pub hal: &'a dyn Hal,
    pub scheduler: &'a mut dyn SchedulerOps,
    pub timer: &'a mut dyn TimerOps,
    pub registry: &'a mut Registry,
    pub threads: &'a mut ThreadTable,
}
