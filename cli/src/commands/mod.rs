//! Command implementations

pub mod down;
pub mod version;
