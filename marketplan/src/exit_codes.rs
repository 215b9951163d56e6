//! Stable exit codes for `marketplan` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid input, config or plan address, or any other error.
pub const INVALID: i32 = 1;
/// The model call failed or returned unusable output; the plan is unchanged.
pub const GENERATION_FAILED: i32 = 2;
