//! exit codes for conditional commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// the condition was closed (input ended) before the awaited state
pub const CONDITION_CLOSED: i32 = 2;

/// the awaited state was not reached within --timeout-ms
pub const TIMEOUT: i32 = 3;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 4;

/// configuration file error
pub const CONFIG_ERROR: i32 = 5;
