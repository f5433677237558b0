/*
 * RT Kernel Core
 *
 * This crate is the thread and inter-thread synchronization kernel of a
 * small preemptive real-time operating system for resource-constrained
 * devices: a typed kernel-object model, a fixed-priority preemptive
 * thread core with a per-thread timer, and a family of blocking
 * synchronization objects (counting semaphore, priority-inheritance
 * mutex, event flag group, mailbox, message queue).
 *
 * Why this is important:
 * - Every operation here must stay correct under arbitrary interrupt
 *   interleaving; it is the only truly concurrent code in the OS.
 * - It defines the invariants (ready-queue consistency, wait-queue/timer
 *   coherency, priority-inheritance chains) every other subsystem
 *   silently depends on.
 * - Its blocking semantics, timeout behavior and error codes are the ABI
 *   of the whole OS — every driver, filesystem and service built above
 *   this crate inherits them unchanged.
 *
 * Out of scope, consumed only as traits the embedding firmware
 * implements: the context-switch/interrupt-mask primitives (`hal::Hal`),
 * the ready-queue picker (`sched::SchedulerOps`), the timer wheel
 * (`timer::TimerOps`) and the kernel-object registry's allocation side
 * (`object::Registry` here reduced to name lookup — see its module doc).
 */

#![cfg_attr(not(test), no_std)]
#![allow(clippy::too_many_arguments)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod hal;
pub mod kernel;
pub mod object;
pub mod sched;
pub mod sync;
pub mod thread;
pub mod timer;
pub mod trace;
pub mod waitqueue;

#[cfg(test)]
pub mod testing;

pub use error::{KResult, KernelError};
pub use kernel::Kernel;
