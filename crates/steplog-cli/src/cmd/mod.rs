//! Command implementations

pub mod demo;
pub mod frames;
pub mod log;
