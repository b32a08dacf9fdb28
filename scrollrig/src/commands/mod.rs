//! Command implementations

pub mod phases;
pub mod sample;
pub mod simulate;
pub mod validate;
