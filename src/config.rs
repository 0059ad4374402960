//! Configuration types for rotpipe.
//!
//! This module turns user input into a validated [`RotationPolicy`]:
//!
//! - [`RotationPolicy`] - Immutable policy consumed by the sink
//! - [`FileConfig`] - Optional TOML file with the same keys as the CLI flags
//! - [`Settings`] - Unvalidated values merged from the CLI and the file
//!
//! Validation collects every problem and reports them together, before any
//! file under the output path is touched.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{Error, Result};
use crate::size::parse_size;

/// Rotation policy for a [`crate::sink::RotatingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Active file; backups are `<output_path>.1` through `<output_path>.N`.
    pub output_path: PathBuf,
    /// Rotation threshold in bytes. `0` never rotates.
    pub size_limit: u64,
    /// Number of numbered backups retained.
    pub backup_count: u32,
    /// Prefix each line with a timestamp.
    pub dated_lines: bool,
}

impl RotationPolicy {
    /// Create a policy with the default threshold and backup count.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            size_limit: constants::DEFAULT_SIZE_LIMIT,
            backup_count: constants::DEFAULT_KEEP,
            dated_lines: false,
        }
    }

    /// Set the threshold in bytes.
    #[must_use]
    pub fn with_size_limit(mut self, size_limit: u64) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Set the threshold from a size expression such as `10M`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Size`] if the expression does not parse.
    pub fn with_size(self, expr: &str) -> Result<Self> {
        Ok(self.with_size_limit(parse_size(expr)?))
    }

    /// Set the number of backups. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_backup_count(mut self, backup_count: u32) -> Self {
        self.backup_count = backup_count.max(1);
        self
    }

    /// Enable per-line timestamps.
    #[must_use]
    pub fn with_dated_lines(mut self, dated_lines: bool) -> Self {
        self.dated_lines = dated_lines;
        self
    }

    /// Returns true when appends may trigger rotation.
    #[must_use]
    pub const fn rotates(&self) -> bool {
        self.size_limit > 0
    }
}

/// Contents of a `--config` TOML file.
///
/// ```toml
/// out = "/var/log/app.log"
/// size = "10M"
/// keep = 5
/// dated = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub out: Option<PathBuf>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub keep: Option<i64>,
    #[serde(default)]
    pub dated: Option<bool>,
}

impl FileConfig {
    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFile`] if the file cannot be read or is not
    /// valid TOML for this schema.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::config_file(path, e))?;
        toml::from_str(&content).map_err(|e| Error::config_file(path, e))
    }
}

/// Result of validating [`Settings`].
#[derive(Debug)]
pub struct Validated {
    pub policy: RotationPolicy,
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

/// Unvalidated settings, one field per CLI flag.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub out: Option<PathBuf>,
    pub size: Option<String>,
    pub keep: Option<i64>,
    pub dated: Option<bool>,
}

impl Settings {
    /// Fill unset fields from a config file. Values already set win.
    #[must_use]
    pub fn or_file(self, file: FileConfig) -> Self {
        Self {
            out: self.out.or(file.out),
            size: self.size.or(file.size),
            keep: self.keep.or(file.keep),
            dated: self.dated.or(file.dated),
        }
    }

    /// Validate settings and build the rotation policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] listing every problem found:
    /// - Missing or empty output path, or a path naming a directory
    /// - Unparseable or zero size threshold
    /// - Backup count below 1 or above `u32::MAX`
    pub fn validate(&self) -> Result<Validated> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let output_path = match &self.out {
            Some(path) if !path.as_os_str().is_empty() => {
                if path.is_dir() {
                    errors.push(format!(
                        "output path is a directory: {}\n  \
                         Expected a file path such as {}/app.log",
                        path.display(),
                        path.display()
                    ));
                }
                Some(path.clone())
            },
            _ => {
                errors.push("output path is required (--out <FILE>)".to_string());
                None
            },
        };

        let size_expr = self.size.as_deref().unwrap_or(constants::DEFAULT_SIZE);
        let size_limit = match parse_size(size_expr) {
            Ok(0) => {
                errors.push(format!("size must be positive (got '{size_expr}')"));
                0
            },
            Ok(bytes) => {
                if bytes < 1024 {
                    warnings.push(format!(
                        "size limit of {bytes} bytes is very small\n  \
                         The file will rotate on almost every write"
                    ));
                }
                bytes
            },
            Err(e) => {
                errors.push(e.to_string());
                0
            },
        };

        let keep = self.keep.unwrap_or(i64::from(constants::DEFAULT_KEEP));
        let backup_count = if keep <= 0 {
            errors.push(format!("keep must be positive (got {keep})"));
            0
        } else if let Ok(count) = u32::try_from(keep) {
            if count > 1000 {
                warnings.push(format!(
                    "keep {count} is very high (> 1000)\n  \
                     Every rotation renames each existing backup"
                ));
            }
            count
        } else {
            errors.push(format!("keep is too large (got {keep})"));
            0
        };

        if !errors.is_empty() {
            return Err(Error::config(format!(
                "invalid settings:\n  - {}",
                errors.join("\n  - ")
            )));
        }

        let Some(output_path) = output_path else {
            return Err(Error::config("output path is required (--out <FILE>)"));
        };

        Ok(Validated {
            policy: RotationPolicy {
                output_path,
                size_limit,
                backup_count,
                dated_lines: self.dated.unwrap_or(false),
            },
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings(out: &str) -> Settings {
        Settings {
            out: Some(PathBuf::from(out)),
            ..Settings::default()
        }
    }

    #[test]
    fn test_default_size_limit_matches_expression() {
        assert_eq!(
            parse_size(constants::DEFAULT_SIZE).unwrap(),
            constants::DEFAULT_SIZE_LIMIT
        );
    }

    #[test]
    fn test_validate_defaults() {
        let validated = settings("app.log").validate().unwrap();
        assert_eq!(validated.policy, RotationPolicy::new("app.log"));
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn test_validate_missing_out() {
        let err = Settings::default().validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("output path is required"));

        let err = settings("").validate().unwrap_err();
        assert!(err.to_string().contains("output path is required"));
    }

    #[test]
    fn test_validate_size_zero() {
        let mut s = settings("app.log");
        s.size = Some("0K".to_string());
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("size must be positive"));
    }

    #[test]
    fn test_validate_bad_size() {
        let mut s = settings("app.log");
        s.size = Some("10Q".to_string());
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("invalid unit 'Q'"));
    }

    #[test]
    fn test_validate_keep_not_positive() {
        for keep in [0, -3] {
            let mut s = settings("app.log");
            s.keep = Some(keep);
            let err = s.validate().unwrap_err().to_string();
            assert!(err.contains("keep must be positive"), "{err}");
        }
    }

    #[test]
    fn test_validate_keep_too_large() {
        let mut s = settings("app.log");
        s.keep = Some(i64::from(u32::MAX) + 1);
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("keep is too large"));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let s = Settings {
            out: None,
            size: Some("abc".to_string()),
            keep: Some(0),
            dated: None,
        };
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("output path"));
        assert!(err.contains("not a valid size"));
        assert!(err.contains("keep"));
    }

    #[test]
    fn test_validate_out_is_directory() {
        let dir = tempdir().unwrap();
        let s = Settings {
            out: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("is a directory"));
    }

    #[test]
    fn test_validate_warnings() {
        let mut s = settings("app.log");
        s.size = Some("100".to_string());
        s.keep = Some(5000);
        let validated = s.validate().unwrap();
        assert_eq!(validated.policy.size_limit, 100);
        assert_eq!(validated.policy.backup_count, 5000);
        assert_eq!(validated.warnings.len(), 2);
    }

    #[test]
    fn test_parse_file_config() {
        let toml_str = r#"
out = "/var/log/app.log"
size = "10M"
keep = 5
dated = true
"#;
        let file: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(file.out, Some(PathBuf::from("/var/log/app.log")));
        assert_eq!(file.size.as_deref(), Some("10M"));
        assert_eq!(file.keep, Some(5));
        assert_eq!(file.dated, Some(true));
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        let result: std::result::Result<FileConfig, _> = toml::from_str("outfile = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_values_win_over_file() {
        let cli = Settings {
            out: None,
            size: Some("1K".to_string()),
            keep: None,
            dated: None,
        };
        let file = FileConfig {
            out: Some(PathBuf::from("from-file.log")),
            size: Some("1G".to_string()),
            keep: Some(3),
            dated: Some(true),
        };
        let policy = cli.or_file(file).validate().unwrap().policy;
        assert_eq!(policy.output_path, PathBuf::from("from-file.log"));
        assert_eq!(policy.size_limit, 1024);
        assert_eq!(policy.backup_count, 3);
        assert!(policy.dated_lines);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rotpipe.toml");
        fs::write(&path, "out = \"x.log\"\nkeep = 2\n").unwrap();
        let file = FileConfig::load_from(&path).unwrap();
        assert_eq!(file.keep, Some(2));

        let err = FileConfig::load_from(dir.path().join("missing.toml")).unwrap_err();
        assert!(err.is_config());

        fs::write(&path, "keep = \"two\"").unwrap();
        let err = FileConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigFile { .. }));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<toml::de::Error>().is_some());
    }

    #[test]
    fn test_policy_builders() {
        let policy = RotationPolicy::new("a.log")
            .with_size("1K")
            .unwrap()
            .with_backup_count(0)
            .with_dated_lines(true);
        assert_eq!(policy.size_limit, 1024);
        assert_eq!(policy.backup_count, 1);
        assert!(policy.dated_lines);
        assert!(policy.rotates());
        assert!(!policy.with_size_limit(0).rotates());
    }
}
