//! Test doubles for the out-of-scope collaborators (HAL, scheduler,
//! timer). Compiled only under `cfg(test)` — never part of the shipped
//! crate surface.

pub mod harness;
