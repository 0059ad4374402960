//! rotpipe: append a byte stream to a size-rotated log file.
//!
//! The library exposes the pieces used by the `rotpipe` binary:
//!
//! - [`size`] - Parse size expressions such as `100M` or `4_000_000k`
//! - [`config`] - Validate settings into a [`config::RotationPolicy`]
//! - [`sink`] - [`sink::RotatingSink`], the append and rotate state machine
//! - [`dated`] - Per-line timestamp prefixing
//! - [`pipe`] - Read loop that feeds a sink from any [`std::io::Read`]
//!
//! ```no_run
//! use rotpipe::config::RotationPolicy;
//! use rotpipe::sink::RotatingSink;
//!
//! # fn main() -> rotpipe::error::Result<()> {
//! let policy = RotationPolicy::new("/var/log/app.log")
//!     .with_size("10M")?
//!     .with_backup_count(5);
//! let mut sink = RotatingSink::open(policy)?;
//! sink.append(b"started\n")?;
//! sink.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dated;
pub mod error;
pub mod pipe;
pub mod sink;
pub mod size;
pub mod ui;
pub mod utils;


pub use config::RotationPolicy;
pub use error::{Error, Result};
pub use sink::RotatingSink;
