/*
 * Synchronization Primitives
 *
 * Components G-K: counting semaphore, priority-inheritance mutex,
 * event flags, mailbox, and message queue — every blocking IPC object
 * built on top of `thread` and `waitqueue`. Each kind is gated behind
 * its own feature (spec.md §6 "Configuration toggles": enable flags for
 * each sync object kind) so a minimal build can drop the ones it
 * doesn't use.
 */

#[cfg(feature = "event-flags")]
pub mod event;
#[cfg(feature = "mailbox")]
pub mod mailbox;
#[cfg(feature = "msg-queue")]
pub mod msgqueue;
#[cfg(feature = "mutex")]
pub mod mutex;
#[cfg(feature = "sem")]
pub mod semaphore;

#[cfg(feature = "event-flags")]
pub use event::{CompactEventFlags, EventFlags, EventOption};
#[cfg(feature = "mailbox")]
pub use mailbox::Mailbox;
#[cfg(feature = "msg-queue")]
pub use msgqueue::MessageQueue;
#[cfg(feature = "mutex")]
pub use mutex::Mutex;
#[cfg(feature = "sem")]
pub use semaphore::Semaphore;
