//! Terminal output for fatal diagnostics.

use std::error::Error as StdError;

use crate::error::Error;

/// Width of error box separators.
const ERROR_BOX_WIDTH: usize = 60;

/// Print an error box with a title, the error chain, and an optional hint.
///
/// Outputs:
/// ```text
/// ============================================================
/// rotpipe: rotation failed
/// ============================================================
///
/// rename failed app.log -> app.log.1: Permission denied (os error 13)
/// ```
pub fn print_error_box(title: &str, body: &str, hint: Option<&str>) {
    eprintln!("\n{}", "=".repeat(ERROR_BOX_WIDTH));
    eprintln!("{title}");
    eprintln!("{}", "=".repeat(ERROR_BOX_WIDTH));

    if !body.is_empty() {
        eprintln!("\n{body}");
    }

    if let Some(hint) = hint
        && !hint.is_empty()
    {
        eprintln!("\n{hint}");
    }
}

/// Title shown above a fatal error.
#[must_use]
pub fn error_title(err: &Error) -> &'static str {
    match err {
        Error::Size(_) | Error::Config(_) | Error::ConfigFile { .. } => {
            "rotpipe: invalid configuration"
        },
        Error::Open { .. } => "rotpipe: cannot open output file",
        Error::Rename { .. } => "rotpipe: rotation failed",
        Error::Write { .. } | Error::Closed { .. } => "rotpipe: write failed",
        Error::Read(_) => "rotpipe: input failed",
    }
}

/// Render an error and its sources, one per line.
#[must_use]
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    render_chain(std::iter::successors(Some(err), |&e: &&(dyn StdError + 'static)| e.source()))
}

fn render_chain<'a>(mut chain: impl Iterator<Item = &'a (dyn StdError + 'static)>) -> String {
    let mut out = chain.next().map(ToString::to_string).unwrap_or_default();
    for cause in chain {
        let text = cause.to_string();
        // thiserror messages usually embed the source already
        if !out.contains(&text) {
            out.push_str("\n  caused by: ");
            out.push_str(&text);
        }
    }
    out
}

/// Print a fatal error, with any context added on the way up, to stderr.
///
/// The title and hint come from the innermost [`Error`] when there is one.
pub fn print_fatal(err: &anyhow::Error) {
    let inner = err.downcast_ref::<Error>();
    let title = inner.map_or("rotpipe: error", error_title);
    let hint = inner
        .is_some_and(Error::is_config)
        .then_some("Run `rotpipe --help` for usage.");
    print_error_box(title, &render_chain(err.chain()), hint);
}
