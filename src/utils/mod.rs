//! Parallel iteration helpers.

pub mod thread;
