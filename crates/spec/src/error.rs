use std::path::PathBuf;

/// Errors raised while reading or parsing sources.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// A source file or directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A source unit is not valid Rust.
    #[error("Failed to parse module {module}: {source}")]
    Parse {
        /// The module being parsed.
        module: String,
        /// The parser error.
        source: syn::Error,
    },
    /// The source tree could not be walked.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}
