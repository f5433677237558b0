/*
 * Compile-Time Kernel Configuration
 *
 * Centralizes the knobs spec.md's "Configuration toggles" calls out so
 * call sites don't repeat feature-flag literals or magic numbers.
 */

/// Number of distinct thread priorities, 0 (most urgent) to `PRIO_MAX - 1`.
///
/// `prio256` selects the wider bitmap layout (`group`/`group_mask` fields
/// on `Thread` become meaningful); the default layout uses a flat 32-bit
/// mask with a single `bit_mask` lookup.
#[cfg(feature = "prio256")]
pub const PRIO_MAX: usize = 256;
#[cfg(not(feature = "prio256"))]
pub const PRIO_MAX: usize = 32;

/// Default round-robin time slice, in scheduler ticks, for threads
/// created without an explicit tick count.
pub const DEFAULT_TICK: u32 = 10;

/// Sentinel stack-fill byte used to paint a newly initialized thread's
/// stack so a later watermark scan can estimate high-water usage.
pub const STACK_FILL_PATTERN: u8 = 0xA5;

/// `timeout` value meaning "wait forever" (never expires, no timer armed).
pub const WAIT_FOREVER: i64 = -1;

/// `timeout` value meaning "poll once, do not block".
pub const NO_WAIT: i64 = 0;
