/// Errors surfaced to callers while scanning a spec file.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported extension: .{0}")]
    UnsupportedExtension(String),

    #[error("parse failed at {line}:{column} (tried {tried})")]
    Parse {
        line: usize,
        column: usize,
        tried: String,
    },
}

/// Extraction failures that are recovered where they happen.
///
/// These never reach the caller: a nameless node or a shorter tag list is
/// produced instead, and the failure is logged at debug level.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ExtractError {
    #[error("unrecognized name expression `{kind}` on line {line}")]
    UnrecognizedName { kind: String, line: usize },

    #[error("unresolved tag expression `{text}` on line {line}")]
    UnresolvedTag { text: String, line: usize },
}
