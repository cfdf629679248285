// library crate for conditional
// exposes the condition primitives and the modules used by the binary

pub mod cli;
pub mod conditions;
pub mod config;
pub mod triggers;
