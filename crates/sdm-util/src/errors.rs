use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for sdm operations outside the resolution core.
#[derive(Debug, Error, Diagnostic)]
pub enum SdmError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    #[diagnostic(code(sdm::io))]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (e.g. Sdm.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(
        code(sdm::manifest),
        help("Check your Sdm.toml for syntax errors")
    )]
    Manifest { message: String },

    /// Invalid or unreadable configuration (global config or lockfile).
    #[error("Configuration error: {message}")]
    #[diagnostic(code(sdm::config))]
    Config { message: String },

    /// A `git` invocation failed.
    #[error("git error: {message}")]
    #[diagnostic(
        code(sdm::git),
        help("Make sure `git` is installed and the repository is reachable")
    )]
    Git { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    #[diagnostic(code(sdm::generic))]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type SdmResult<T> = miette::Result<T>;
