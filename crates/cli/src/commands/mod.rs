//! CLI command implementations

pub mod recommend;
pub mod sample;
