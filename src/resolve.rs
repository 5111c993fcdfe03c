mod exports;
mod shared;
mod ts;

use std::path::{Path, PathBuf};

use tracing::debug;

/// Supplies the source text behind an import specifier.
///
/// Returning `None` is never fatal: the import simply contributes no values.
pub trait ImportSource {
    fn read(&self, specifier: &str) -> Option<String>;
}

impl<F> ImportSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn read(&self, specifier: &str) -> Option<String> {
        self(specifier)
    }
}

/// Path alias configuration from tsconfig.json.
#[derive(Debug, Clone)]
pub struct PathConfig {
    base_url: PathBuf,
    aliases: Vec<(String, Vec<String>)>,
}

/// Reads imports from disk relative to one importing file.
#[derive(Debug, Clone)]
pub struct RelativeFiles {
    from: PathBuf,
    paths: Option<PathConfig>,
}

impl RelativeFiles {
    /// Resolver for imports written in `file`, honouring the nearest
    /// tsconfig.json `paths` when there is one.
    pub fn new(file: &Path) -> Self {
        let paths = file.parent().and_then(load_path_config);
        Self {
            from: file.to_path_buf(),
            paths,
        }
    }

    /// File an import specifier points at, if it exists.
    pub fn resolve(&self, specifier: &str) -> Option<PathBuf> {
        resolve_import(specifier, &self.from, self.paths.as_ref())
    }
}

impl ImportSource for RelativeFiles {
    fn read(&self, specifier: &str) -> Option<String> {
        let Some(path) = self.resolve(specifier) else {
            debug!(specifier, from = %self.from.display(), "import not found");
            return None;
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(specifier, path = %path.display(), "import resolved");
                Some(text)
            }
            Err(err) => {
                debug!(path = %path.display(), "cannot read import: {err}");
                None
            }
        }
    }
}

pub use exports::{resolve_exports, resolve_imports};
pub(crate) use exports::imported_values;
pub(crate) use ts::{load_path_config, resolve_import};
