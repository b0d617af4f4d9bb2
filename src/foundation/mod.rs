//! Shared primitives: pixel types, error taxonomy, time sources and small numeric helpers.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
pub(crate) mod time;
