use std::fmt;
use std::path::Path;

use tree_sitter::Language as TsLanguage;

use crate::error::ScanError;

/// Grammar variants a spec file may be written in.
///
/// The right one is not known up front, so parsing walks an ordered list of
/// dialects and keeps the first tree that parses cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Plain TypeScript/JavaScript statements (type assertions allowed, no JSX).
    TypeScript,
    /// JSX-enabled TypeScript/JavaScript.
    Tsx,
}

/// Try order for source text with no file name attached.
pub const DEFAULT_ORDER: &[Dialect] = &[Dialect::TypeScript, Dialect::Tsx];

const JSX_FIRST_ORDER: &[Dialect] = &[Dialect::Tsx, Dialect::TypeScript];

impl Dialect {
    /// tree-sitter parser language for this dialect.
    pub fn tree_sitter_language(self) -> TsLanguage {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Dialect try order for a file extension.
    pub fn order_for_extension(ext: &str) -> Result<&'static [Dialect], ScanError> {
        if matches_jsx_extension(ext) {
            return Ok(JSX_FIRST_ORDER);
        }
        if is_spec_extension(ext) {
            return Ok(DEFAULT_ORDER);
        }
        Err(ScanError::UnsupportedExtension(ext.to_string()))
    }

    /// Dialect try order for a file path.
    pub fn order_for_path(path: &Path) -> Result<&'static [Dialect], ScanError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::order_for_extension(ext)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeScript => f.write_str("typescript"),
            Self::Tsx => f.write_str("tsx"),
        }
    }
}

/// Check whether a file extension can hold spec sources.
pub fn is_spec_extension(ext: &str) -> bool {
    ["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"]
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

fn matches_jsx_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case("tsx") || ext.eq_ignore_ascii_case("jsx")
}
