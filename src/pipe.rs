//! Input pump: reads a stream to exhaustion and feeds the sink.

use std::io::{ErrorKind, Read};

use tracing::{debug, trace};

use crate::constants::CHUNK_SIZE;
use crate::dated::{Clock, LineStamper};
use crate::error::{Error, Result};
use crate::sink::RotatingSink;

/// Totals for one run of [`pump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipeSummary {
    /// Bytes read from the input.
    pub bytes_read: u64,
    /// Non-empty reads.
    pub chunks: u64,
    /// Stamped lines written (dated mode only).
    pub lines: u64,
    /// Rotations performed by the sink during the run.
    pub rotations: u64,
}

/// Copy `input` into `sink` until end of stream.
///
/// With a `stamper`, input goes through [`LineStamper::feed`] and any
/// trailing fragment is flushed at end of stream; otherwise each read is
/// appended unchanged.
///
/// # Errors
///
/// Returns [`Error::Read`] if reading fails (interrupted reads are retried),
/// or any error from the sink.
pub fn pump<R, C>(
    mut input: R,
    sink: &mut RotatingSink,
    mut stamper: Option<&mut LineStamper<C>>,
) -> Result<PipeSummary>
where
    R: Read,
    C: Clock,
{
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut summary = PipeSummary::default();
    let rotations_before = sink.rotations();

    loop {
        let n = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Read(e)),
        };
        trace!(bytes = n, "Read chunk");

        summary.bytes_read += n as u64;
        summary.chunks += 1;

        let chunk = &buffer[..n];
        match stamper.as_deref_mut() {
            Some(stamper) => stamper.feed(chunk, sink)?,
            None => sink.append(chunk)?,
        }
    }

    if let Some(stamper) = stamper {
        if stamper.finish(sink)? {
            debug!("Flushed unterminated final line");
        }
        summary.lines = stamper.lines();
    }
    summary.rotations = sink.rotations() - rotations_before;

    Ok(summary)
}
