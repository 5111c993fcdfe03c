use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// First existing file among `base` itself, `base` with each extension
/// appended, and `base/index.<ext>`.
///
/// Extensions are appended rather than substituted, so `./tags.config`
/// looks for `tags.config.ts` and not `tags.ts`.
pub(super) fn try_extensions_with(base: &Path, exts: &[&str]) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }

    for ext in exts {
        let candidate = with_appended_extension(base, ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    for ext in exts {
        let candidate = base.join("index").with_extension(ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}

fn with_appended_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
