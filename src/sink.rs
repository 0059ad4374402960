//! Size-rotated append-only file sink.
//!
//! [`RotatingSink`] owns the handle of the active output file and a running
//! count of the bytes in it. Before each append it checks whether the write
//! would push a non-empty file past the size limit; if so it rotates:
//!
//! ```text
//! app.log.(N-1) -> app.log.N      (old app.log.N is overwritten)
//! ...
//! app.log.1     -> app.log.2
//! app.log       -> app.log.1
//! app.log       (re-created empty)
//! ```
//!
//! The byte count is seeded from the file's size when it is opened, so a
//! restarted process keeps counting towards the same threshold.
//!
//! Rotation is a plain sequence of renames. A crash part-way through can leave
//! the numbering shifted but never loses a completed write. Every I/O failure
//! is returned to the caller and nothing is retried.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::RotationPolicy;
use crate::error::{Error, Result};
use crate::utils::{format_bytes, numbered_path};

/// Append-only writer that rotates its file into numbered backups.
///
/// Not `Sync`-shared: all operations take `&mut self`, so one reader loop
/// drives one sink.
#[derive(Debug)]
pub struct RotatingSink {
    policy: RotationPolicy,
    file: Option<File>,
    bytes_written: u64,
    rotations: u64,
}

impl RotatingSink {
    /// Open (or create) the active file for appending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file cannot be opened for appending.
    pub fn open(policy: RotationPolicy) -> Result<Self> {
        let (file, existing) = open_append(&policy.output_path)?;

        debug!(
            path = %policy.output_path.display(),
            existing_bytes = existing,
            size_limit = policy.size_limit,
            backup_count = policy.backup_count,
            "Opened output file"
        );

        Ok(Self {
            policy,
            file: Some(file),
            bytes_written: existing,
            rotations: 0,
        })
    }

    /// Append `data`, rotating first if it would overflow a non-empty file.
    ///
    /// A chunk larger than the limit is written as-is when the active file is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rename`] or [`Error::Open`] if rotation fails,
    /// [`Error::Write`] if the write fails, and [`Error::Closed`] if an
    /// earlier rotation failure left the sink without a file.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if self.file.is_none() {
            return Err(Error::Closed {
                path: self.policy.output_path.clone(),
            });
        }
        if data.is_empty() {
            return Ok(());
        }

        if self.needs_rotation(data.len()) {
            self.rotate()?;
        }

        let path = &self.policy.output_path;
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Error::Closed { path: path.clone() })?;
        file.write_all(data).map_err(|e| Error::write(path, e))?;

        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Sync the active file to disk and release it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the final sync fails.
    pub fn close(mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()
                .map_err(|e| Error::write(&self.policy.output_path, e))?;
        }
        debug!(
            path = %self.policy.output_path.display(),
            bytes = self.bytes_written,
            rotations = self.rotations,
            "Closed output file"
        );
        Ok(())
    }

    /// Bytes currently in the active file.
    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Rotations performed by this sink.
    #[must_use]
    pub const fn rotations(&self) -> u64 {
        self.rotations
    }

    #[must_use]
    pub const fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Path of the active file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.policy.output_path
    }

    fn needs_rotation(&self, incoming: usize) -> bool {
        self.policy.rotates()
            && self.bytes_written > 0
            && self.bytes_written.saturating_add(incoming as u64) > self.policy.size_limit
    }

    fn rotate(&mut self) -> Result<()> {
        let base = self.policy.output_path.clone();

        if let Some(file) = self.file.take()
            && let Err(e) = file.sync_all()
        {
            warn!(path = %base.display(), error = %e, "Sync before rotation failed");
        }

        // Highest index first so no backup is overwritten before it moves.
        for index in (1..self.policy.backup_count).rev() {
            let from = numbered_path(&base, index);
            if !from.exists() {
                continue;
            }
            let to = numbered_path(&base, index + 1);
            fs::rename(&from, &to).map_err(|e| Error::rename(&from, &to, e))?;
        }

        let first = numbered_path(&base, 1);
        fs::rename(&base, &first).map_err(|e| Error::rename(&base, &first, e))?;

        let (file, existing) = open_append(&base)?;
        info!(
            path = %base.display(),
            rotated = %format_bytes(self.bytes_written),
            backups = self.policy.backup_count,
            "Rotated output file"
        );

        self.file = Some(file);
        self.bytes_written = existing;
        self.rotations += 1;
        Ok(())
    }
}

/// Open `path` for appending and return it with its current size.
fn open_append(path: &Path) -> Result<(File, u64)> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::open(path, e))?;
    let existing = file.metadata().map_err(|e| Error::open(path, e))?.len();
    Ok((file, existing))
}
