//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, tenant blob, backup).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input, arguments, or configuration.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, truncated or tampered blob).
    pub const AUTH_FAILED: i32 = 5;

    /// Object store or local disk unavailable.
    pub const OUTAGE: i32 = 6;
}

/// Environment variable holding the tenant password.
pub const PASSWORD_ENV: &str = "TVAULT_PASSWORD";

/// Password attempts allowed at an interactive prompt.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;
