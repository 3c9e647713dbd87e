//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                                |
//! |---------|------------------|--------------------------------------------|
//! | 0       | Universal        | Success                                    |
//! | 1       | Universal        | General error / diff found differences     |
//! | 2       | Universal        | CLI usage error (bad args, missing file)   |
//! | 3-9     | pipeline         | Config, artifact, and snapshot codes       |
//! | 50-59   | lookup           | Remote registry connector codes            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use permitscreen_engine::ScreenError;
use permitscreen_io::StoreError;
use permitscreen_lookup::LookupError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Pipeline (3-9)
// =============================================================================

/// Diff found differences between two runs.
/// Like `diff(1)`, exit 1 means "runs differ."
pub const EXIT_DIFF_DIFFS: u8 = 1;

/// Config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 3;

/// Review artifact is corrupt (unrecognized decision value).
pub const EXIT_REVIEW: u8 = 4;

/// Roster/registry schema error (missing column, unreadable row).
pub const EXIT_SCHEMA: u8 = 5;

/// No snapshot under the requested label, or snapshot store corrupt.
pub const EXIT_SNAPSHOT: u8 = 6;

// =============================================================================
// Lookup (50-59) — remote registry connector
// =============================================================================

/// No API key provided (neither flag nor env var).
pub const EXIT_LOOKUP_NOT_AUTH: u8 = 50;

/// Auth rejected by the registry (401/403).
pub const EXIT_LOOKUP_AUTH: u8 = 51;

/// Rate limited after retries (429).
pub const EXIT_LOOKUP_RATE_LIMIT: u8 = 53;

/// Registry error (5xx), network failure after retries, or bad payload.
pub const EXIT_LOOKUP_UPSTREAM: u8 = 54;

// =============================================================================
// Error type mappings
// =============================================================================

/// Map an engine error to its exit code.
pub fn screen_exit_code(err: &ScreenError) -> u8 {
    match err {
        ScreenError::ConfigParse(_) | ScreenError::ConfigValidation(_) => EXIT_CONFIG,
        ScreenError::ReviewDecision { .. } => EXIT_REVIEW,
        ScreenError::MissingColumn { .. } | ScreenError::CsvParse { .. } => EXIT_SCHEMA,
        ScreenError::Io(_) => EXIT_USAGE,
    }
}

/// Map a snapshot store error to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::UnknownLabel { .. } => EXIT_SNAPSHOT,
        StoreError::Corrupt { .. } | StoreError::Version { .. } => EXIT_SNAPSHOT,
        StoreError::Sqlite(_) => EXIT_ERROR,
    }
}

/// Map a lookup error to its exit code.
pub fn lookup_exit_code(err: &LookupError) -> u8 {
    match err {
        LookupError::Registry(_) => EXIT_SCHEMA,
        LookupError::Auth { .. } => EXIT_LOOKUP_AUTH,
        LookupError::RateLimited { .. } => EXIT_LOOKUP_RATE_LIMIT,
        LookupError::Transport(_) | LookupError::Upstream { .. } | LookupError::Parse(_) => {
            EXIT_LOOKUP_UPSTREAM
        }
    }
}
