pub mod action;
pub mod focus;
