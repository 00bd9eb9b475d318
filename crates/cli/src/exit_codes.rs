//! CLI Exit Code Registry
//!
//! Single source of truth for `posture` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | Non-compliant standards found (`--strict` only)     |
//! | 2    | Usage error (bad args)                              |
//! | 3    | I/O error (cannot read input, cannot write output)  |
//! | 4    | Input document is not valid                         |
//! | 5    | Config file is not valid                            |
//! | 6    | Template id not found (`--strict` only)             |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one standard is non-compliant and `--strict` was given.
/// Like `diff(1)`, exit 1 means "differs from the template."
pub const EXIT_NON_COMPLIANT: u8 = 1;

/// Usage error - bad arguments.
pub const EXIT_USAGE: u8 = 2;

/// Reading an input file or writing the output file failed.
pub const EXIT_IO: u8 = 3;

/// Templates, snapshots, or catalog could not be parsed.
pub const EXIT_INPUT_PARSE: u8 = 4;

/// Config TOML failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// The requested template id is not in the template list and `--strict`
/// was given.
pub const EXIT_TEMPLATE_NOT_FOUND: u8 = 6;
