//! Defaults and I/O sizing shared by the library and the CLI.

/// Default rotation threshold, as accepted by [`crate::size::parse_size`].
pub const DEFAULT_SIZE: &str = "100M";

/// [`DEFAULT_SIZE`] in bytes.
pub const DEFAULT_SIZE_LIMIT: u64 = 100 * 1024 * 1024;

/// Default number of numbered backups to keep.
pub const DEFAULT_KEEP: u32 = 20;

/// Size of a single read from the input stream.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Longest fragment the dated-line transform buffers before forcing a line break.
pub const MAX_LINE_BYTES: usize = 256 * 1024;

/// Log filter used when neither `RUST_LOG` nor `--verbose` is given.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Log filter used with `--verbose`.
pub const VERBOSE_LOG_FILTER: &str = "debug";
