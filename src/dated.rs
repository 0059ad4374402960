//! Per-line timestamp prefixing.
//!
//! [`LineStamper`] splits the input on `\n` and appends each line to the sink
//! as its own write, prefixed with the time it was written:
//!
//! ```text
//! 2024-05-01T12:00:00+02:00 request served
//! ```
//!
//! A fragment without a terminator is held until the rest of the line
//! arrives, so the output does not depend on how the input was chunked.
//! [`LineStamper::finish`] writes out whatever is still held at end of input.

use std::mem;

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use tracing::warn;

use crate::constants::MAX_LINE_BYTES;
use crate::error::Result;
use crate::sink::RotatingSink;

/// Source of line timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Format a timestamp as RFC 3339 with second precision.
///
/// ```
/// use chrono::DateTime;
/// use rotpipe::dated::format_timestamp;
///
/// let t = DateTime::parse_from_rfc3339("2024-05-01T12:00:00.250+02:00").unwrap();
/// assert_eq!(format_timestamp(&t), "2024-05-01T12:00:00+02:00");
/// ```
#[must_use]
pub fn format_timestamp(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Splits input into lines and writes each one with a timestamp prefix.
#[derive(Debug)]
pub struct LineStamper<C = SystemClock> {
    clock: C,
    pending: Vec<u8>,
    scratch: Vec<u8>,
    max_line: usize,
    lines: u64,
}

impl LineStamper<SystemClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for LineStamper<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> LineStamper<C> {
    /// Create a stamper reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            pending: Vec::new(),
            scratch: Vec::new(),
            max_line: MAX_LINE_BYTES,
            lines: 0,
        }
    }

    /// Cap the length of a held fragment. Longer fragments are written out
    /// as a line of their own.
    #[must_use]
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line.max(1);
        self
    }

    /// Write every complete line in `chunk`, holding back a trailing fragment.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`RotatingSink::append`].
    pub fn feed(&mut self, chunk: &[u8], sink: &mut RotatingSink) -> Result<()> {
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let line = &rest[..pos];
            rest = &rest[pos + 1..];

            if self.pending.is_empty() {
                self.emit(line, sink)?;
            } else {
                let mut held = mem::take(&mut self.pending);
                held.extend_from_slice(line);
                let result = self.emit(&held, sink);
                held.clear();
                self.pending = held;
                result?;
            }
        }

        self.pending.extend_from_slice(rest);
        if self.pending.len() > self.max_line {
            warn!(
                bytes = self.pending.len(),
                max_line = self.max_line,
                "Line exceeds maximum length, splitting"
            );
            let held = mem::take(&mut self.pending);
            self.emit(&held, sink)?;
        }
        Ok(())
    }

    /// Write the held fragment, if any, as a terminated line.
    ///
    /// Returns `true` if a fragment was written.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`RotatingSink::append`].
    pub fn finish(&mut self, sink: &mut RotatingSink) -> Result<bool> {
        if self.pending.is_empty() {
            return Ok(false);
        }
        let held = mem::take(&mut self.pending);
        self.emit(&held, sink)?;
        Ok(true)
    }

    /// Lines written so far.
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Bytes held back waiting for a line terminator.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn emit(&mut self, line: &[u8], sink: &mut RotatingSink) -> Result<()> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let stamp = format_timestamp(&self.clock.now());

        let mut out = mem::take(&mut self.scratch);
        out.clear();
        out.reserve(stamp.len() + line.len() + 2);
        out.extend_from_slice(stamp.as_bytes());
        out.push(b' ');
        out.extend_from_slice(line);
        out.push(b'\n');

        let result = sink.append(&out);
        self.scratch = out;
        result?;

        self.lines += 1;
        Ok(())
    }
}
