//! Human-friendly size expressions.
//!
//! Parses strings such as `100M`, `1,000,000` or `4_000_000k` into an exact
//! byte count. Lowercase units are decimal, uppercase units are binary:
//!
//! | Suffix | Multiplier |
//! |---|---|
//! | `k`, `kB` | 1 000 |
//! | `K`, `KB`, `KiB` | 1 024 |
//! | `m`, `mB` | 1 000 000 |
//! | `M`, `MB`, `MiB` | 1 048 576 |
//! | `g`, `gB` | 1 000 000 000 |
//! | `G`, `GB`, `GiB` | 1 073 741 824 |
//!
//! `,` and `_` inside the digit run are stripped without checking where they
//! sit, so `1_0,0` is read as `100`.

use std::num::ParseIntError;

const KILO: u64 = 1000;
const KIBI: u64 = 1024;
const MEGA: u64 = KILO * KILO;
const MEBI: u64 = KIBI * KIBI;
const GIGA: u64 = MEGA * KILO;
const GIBI: u64 = MEBI * KIBI;

/// Recognized unit suffixes, in the order they are listed in error messages.
static UNITS: &[(&str, u64)] = &[
    ("k", KILO),
    ("K", KIBI),
    ("m", MEGA),
    ("M", MEBI),
    ("g", GIGA),
    ("G", GIBI),
    ("kB", KILO),
    ("KB", KIBI),
    ("KiB", KIBI),
    ("mB", MEGA),
    ("MB", MEBI),
    ("MiB", MEBI),
    ("gB", GIGA),
    ("GB", GIBI),
    ("GiB", GIBI),
];

/// Error returned by [`parse_size`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizeParseError {
    /// Input is not a digit run followed by an optional unit.
    #[error(
        "not a valid size: '{input}'. Expected digits with an optional unit, \
         e.g. '10K', '100000', '30g', '1,000,000', '4_000_000k' (units: {})",
        unit_list()
    )]
    Malformed { input: String },

    /// Digit run is empty after stripping separators or does not fit in 64 bits.
    #[error("invalid byte count '{digits}': {source}")]
    InvalidCount {
        digits: String,
        #[source]
        source: ParseIntError,
    },

    /// Suffix is not one of the recognized units.
    #[error("invalid unit '{unit}'. Only {} are supported", unit_list())]
    UnknownUnit { unit: String },

    /// `count * unit` does not fit in 64 bits.
    #[error("size '{input}' is too large")]
    Overflow { input: String },
}

/// Comma-separated list of every accepted unit suffix.
#[must_use]
pub fn unit_list() -> String {
    UNITS
        .iter()
        .map(|(suffix, _)| *suffix)
        .collect::<Vec<_>>()
        .join(",")
}

/// Look up the multiplier for a unit suffix.
#[must_use]
pub fn unit_multiplier(unit: &str) -> Option<u64> {
    UNITS
        .iter()
        .find(|(suffix, _)| *suffix == unit)
        .map(|(_, multiplier)| *multiplier)
}

/// Parse a size expression into bytes.
///
/// # Examples
///
/// ```
/// use rotpipe::size::parse_size;
///
/// assert_eq!(parse_size("100M").unwrap(), 104_857_600);
/// assert_eq!(parse_size("1,000,000").unwrap(), 1_000_000);
/// assert_eq!(parse_size("4_000_000k").unwrap(), 4_000_000_000);
/// assert!(parse_size("10Q").is_err());
/// ```
///
/// # Errors
///
/// Returns [`SizeParseError`] when the input is not `digits[unit]`, the digits
/// do not form a `u64`, the unit is unknown, or the product overflows.
pub fn parse_size(input: &str) -> Result<u64, SizeParseError> {
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == '_'))
        .unwrap_or(input.len());
    let (count_part, unit) = input.split_at(split);

    if count_part.is_empty() || unit.chars().any(|c| c.is_ascii_digit()) {
        return Err(SizeParseError::Malformed {
            input: input.to_string(),
        });
    }

    let digits: String = count_part
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let count: u64 = digits
        .parse()
        .map_err(|source| SizeParseError::InvalidCount {
            digits: count_part.to_string(),
            source,
        })?;

    if unit.is_empty() {
        return Ok(count);
    }

    let multiplier = unit_multiplier(unit).ok_or_else(|| SizeParseError::UnknownUnit {
        unit: unit.to_string(),
    })?;

    count
        .checked_mul(multiplier)
        .ok_or_else(|| SizeParseError::Overflow {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_counts() {
        assert_eq!(parse_size("0").unwrap(), 0);
        assert_eq!(parse_size("100000").unwrap(), 100_000);
        assert_eq!(parse_size("1,000,000").unwrap(), 1_000_000);
        assert_eq!(parse_size("4_000_000").unwrap(), 4_000_000);
    }

    #[test]
    fn test_decimal_units() {
        assert_eq!(parse_size("10k").unwrap(), 10_000);
        assert_eq!(parse_size("100kB").unwrap(), 100_000);
        assert_eq!(parse_size("3m").unwrap(), 3_000_000);
        assert_eq!(parse_size("3mB").unwrap(), 3_000_000);
        assert_eq!(parse_size("30g").unwrap(), 30_000_000_000);
        assert_eq!(parse_size("4_000_000k").unwrap(), 4_000_000_000);
    }

    #[test]
    fn test_binary_units() {
        assert_eq!(parse_size("10K").unwrap(), 10_240);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("1KiB").unwrap(), 1024);
        assert_eq!(parse_size("100M").unwrap(), 104_857_600);
        assert_eq!(parse_size("100MB").unwrap(), 104_857_600);
        assert_eq!(parse_size("100MiB").unwrap(), 104_857_600);
        assert_eq!(parse_size("2G").unwrap(), 2_147_483_648);
        assert_eq!(parse_size("2GiB").unwrap(), 2_147_483_648);
    }

    #[test]
    fn test_separators_are_not_validated() {
        assert_eq!(parse_size("1_0,0").unwrap(), 100);
        assert_eq!(parse_size("1,,0K").unwrap(), 10 * 1024);
    }

    #[test]
    fn test_malformed() {
        for input in ["", "abc", "M", "-5", "+5", " 5", "10M5", "1.5M"] {
            let err = parse_size(input).unwrap_err();
            assert!(
                matches!(
                    err,
                    SizeParseError::Malformed { .. } | SizeParseError::UnknownUnit { .. }
                ),
                "{input:?} gave {err:?}"
            );
        }
        assert!(matches!(
            parse_size("abc"),
            Err(SizeParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_separators_only() {
        assert!(matches!(
            parse_size("_,_"),
            Err(SizeParseError::InvalidCount { .. })
        ));
        assert!(matches!(
            parse_size("__K"),
            Err(SizeParseError::InvalidCount { .. })
        ));
    }

    #[test]
    fn test_unknown_unit() {
        let err = parse_size("10Q").unwrap_err();
        assert_eq!(
            err,
            SizeParseError::UnknownUnit {
                unit: "Q".to_string()
            }
        );
        // units are case-sensitive
        assert!(parse_size("10kib").is_err());
        assert!(parse_size("10 M").is_err());
    }

    #[test]
    fn test_error_lists_units() {
        let msg = parse_size("10Q").unwrap_err().to_string();
        for (suffix, _) in UNITS {
            assert!(msg.contains(suffix), "missing {suffix} in {msg}");
        }
        let msg = parse_size("abc").unwrap_err().to_string();
        assert!(msg.contains("KiB"));
        assert!(msg.contains("4_000_000k"));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            parse_size("99999999999G"),
            Err(SizeParseError::Overflow { .. })
        ));
        assert!(matches!(
            parse_size("99999999999999999999"),
            Err(SizeParseError::InvalidCount { .. })
        ));
    }
}
