//! Shared utility functions.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Path of the numbered backup `index` for `base`, e.g. `app.log.3`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use rotpipe::utils::numbered_path;
///
/// assert_eq!(numbered_path(Path::new("/var/log/app.log"), 3), Path::new("/var/log/app.log.3"));
/// ```
pub fn numbered_path(base: &Path, index: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Format bytes in human-readable form.
///
/// # Examples
///
/// ```
/// use rotpipe::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 bytes");
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(104857600), "100.0 MiB");
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * 1024 * 1024;

    if bytes >= GIB {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
