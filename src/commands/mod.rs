//! CLI commands

pub mod list;
pub mod paths;
pub mod serve;
