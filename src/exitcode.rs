//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error (unknown period or computation id)
pub const USAGE: i32 = 64;

/// Data format error (evaluation failed on the report's data)
pub const DATAERR: i32 = 65;

/// Cannot open input (report file missing)
pub const NOINPUT: i32 = 66;

/// Service unavailable (ledger backend failed)
pub const UNAVAILABLE: i32 = 69;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error (invalid report definition)
pub const CONFIG: i32 = 78;
