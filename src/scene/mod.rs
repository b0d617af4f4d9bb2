//! Template boundary: JSON model, validation and the data holder the compositor reads from.

pub mod model;
pub mod store;
pub mod template;
