//! Exit code constants for the agentforge CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid spec, filesystem failure)
//! - 2: Generator output failed schema validation
//! - 3: External generator unavailable, timed out, or failed

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid spec or config, filesystem failure.
pub const USER_ERROR: i32 = 1;

/// The generator returned output that does not match the agent schema.
pub const SCHEMA_FAILURE: i32 = 2;

/// The external generator could not be run to completion.
pub const GENERATION_FAILURE: i32 = 3;
