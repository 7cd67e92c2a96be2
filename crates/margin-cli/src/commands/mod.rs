//! CLI subcommands.

pub mod clear;
pub mod index;
pub mod interactive;
pub mod query;
pub mod status;
