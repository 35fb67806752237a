use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Kiln operations.
#[derive(Debug, Error, Diagnostic)]
pub enum KilnError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed configuration file.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.kiln/config.toml (or $KILN_HOME/config.toml) for syntax errors"))]
    Config { message: String },

    /// A package reference or requirement string could not be parsed.
    #[error("Invalid reference '{reference}': {reason}")]
    #[diagnostic(help("References look like name/version or name/version@user/channel"))]
    InvalidReference { reference: String, reason: String },

    /// A version range expression could not be parsed.
    #[error("Invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    /// No local or remote candidate satisfies a version range.
    #[error(
        "Version range '{range}' from requirement '{requirement}' required by '{requester}' could not be resolved"
    )]
    #[diagnostic(help(
        "No locally cached or remote version satisfies the range; check `kiln remote list`"
    ))]
    UnsatisfiableRange {
        range: String,
        requirement: String,
        requester: String,
    },

    /// A query expression was malformed or could not be evaluated.
    #[error("{message}")]
    Query { message: String },

    /// Network request to a remote failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
