//! Design-space to device-space scaling.

pub mod scaler;
