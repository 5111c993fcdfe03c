use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{shared, PathConfig};

/// Tried in order after the literal path; the plain `.ts` and `.js` forms
/// come first since tag modules are rarely anything else.
const EXTENSIONS: &[&str] = &["ts", "js", "tsx", "jsx", "mts", "mjs", "cts", "cjs"];

/// Resolve an import specifier written in `from_file` to a file on disk.
///
/// Relative specifiers resolve against the importing file's directory.
/// Anything else goes through the tsconfig aliases first and then falls back
/// to the importing directory as well.
pub(crate) fn resolve_import(
    specifier: &str,
    from_file: &Path,
    path_config: Option<&PathConfig>,
) -> Option<PathBuf> {
    let parent = from_file.parent()?;

    if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/') {
        return try_extensions(&parent.join(specifier));
    }

    if let Some(cfg) = path_config {
        for (pattern, replacements) in &cfg.aliases {
            if let Some(resolved) = expand_alias(specifier, pattern, replacements, &cfg.base_url) {
                debug!(specifier, alias = %pattern, "import matched tsconfig alias");
                return Some(resolved);
            }
        }
    }

    try_extensions(&parent.join(specifier))
}

/// Search tsconfig.json walking up from `start_dir`, parse `paths` + `baseUrl`.
pub(crate) fn load_path_config(start_dir: &Path) -> Option<PathConfig> {
    let tsconfig_path = find_tsconfig(start_dir)?;
    let content = std::fs::read_to_string(&tsconfig_path).ok()?;

    let val: serde_json::Value = match serde_json::from_str(&strip_jsonc_comments(&content)) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %tsconfig_path.display(), "ignoring unparsable tsconfig: {e}");
            return None;
        }
    };

    let compiler = val.get("compilerOptions")?;
    let tsconfig_dir = tsconfig_path.parent()?;

    let base_url = compiler
        .get("baseUrl")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| tsconfig_dir.to_path_buf(), |b| tsconfig_dir.join(b));

    let aliases: Vec<(String, Vec<String>)> = compiler
        .get("paths")?
        .as_object()?
        .iter()
        .map(|(pattern, targets)| {
            let replacements: Vec<String> = targets
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|v| v.as_str().map(String::from))
                .collect();
            (pattern.clone(), replacements)
        })
        .collect();

    Some(PathConfig { base_url, aliases })
}

fn try_extensions(base: &Path) -> Option<PathBuf> {
    shared::try_extensions_with(base, EXTENSIONS)
}

/// Expand an alias pattern against a specifier.
///
/// Pattern `@tags/*` with replacement `cypress/tags/*` maps `@tags/smoke`
/// to `<base_url>/cypress/tags/smoke` before extensions are tried.
fn expand_alias(
    specifier: &str,
    pattern: &str,
    replacements: &[String],
    base_url: &Path,
) -> Option<PathBuf> {
    let rest = match pattern.strip_suffix('*') {
        Some(prefix) => specifier.strip_prefix(prefix)?,
        None if specifier == pattern => "",
        None => return None,
    };

    replacements.iter().find_map(|replacement| {
        let target = match replacement.strip_suffix('*') {
            Some(rep_prefix) => format!("{rep_prefix}{rest}"),
            None => replacement.clone(),
        };
        try_extensions(&base_url.join(target))
    })
}

/// Strip JSONC comments (`//` line and `/* */` block) outside of strings.
fn strip_jsonc_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            match ch {
                '\\' => out.extend(chars.next()),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (ch, next) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                while chars.next_if(|c| *c != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Walk up directories from `start` looking for tsconfig.json.
fn find_tsconfig(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("tsconfig.json"))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn strip_jsonc_removes_comments() {
        let input = "{\n  // line\n  \"a\": 1, /* block */ \"b\": 2\n}";
        let value: serde_json::Value = serde_json::from_str(&strip_jsonc_comments(input)).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], 2);
    }

    #[test]
    fn strip_jsonc_keeps_slashes_inside_strings() {
        let input = r#"{ "url": "https://example.com/*api*/", "q": "say \"//hi\"" }"#;
        assert_eq!(strip_jsonc_comments(input), input);
    }

    #[test]
    fn strip_jsonc_keeps_non_ascii_text() {
        let input = "{ \"name\": \"café ✓\" } // trailing";
        assert_eq!(strip_jsonc_comments(input), "{ \"name\": \"café ✓\" } ");
    }

    #[test]
    fn try_extensions_prefers_the_literal_path() {
        let dir = tempfile::tempdir().unwrap();
        let literal = dir.path().join("tags.js");
        fs::write(&literal, "").unwrap();
        fs::write(dir.path().join("tags.js.ts"), "").unwrap();

        assert_eq!(try_extensions(&literal), Some(literal));
    }

    #[test]
    fn try_extensions_appends_ts_before_js() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tags.ts"), "").unwrap();
        fs::write(dir.path().join("tags.js"), "").unwrap();

        let result = try_extensions(&dir.path().join("tags"));
        assert_eq!(result, Some(dir.path().join("tags.ts")));
    }

    #[test]
    fn try_extensions_appends_to_dotted_names() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tags.config.js");
        fs::write(&file, "").unwrap();

        assert_eq!(try_extensions(&dir.path().join("tags.config")), Some(file));
    }

    #[test]
    fn try_extensions_finds_other_module_flavours() {
        let dir = tempfile::tempdir().unwrap();
        for ext in ["mts", "cjs"] {
            let stem = format!("entry_{ext}");
            let file = dir.path().join(format!("{stem}.{ext}"));
            fs::write(&file, "").unwrap();
            assert_eq!(try_extensions(&dir.path().join(&stem)), Some(file));
        }
    }

    #[test]
    fn try_extensions_finds_index_file() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("tags");
        fs::create_dir(&sub).unwrap();
        let file = sub.join("index.ts");
        fs::write(&file, "").unwrap();

        assert_eq!(try_extensions(&sub), Some(file));
    }

    #[test]
    fn try_extensions_returns_none_for_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(try_extensions(&dir.path().join("nonexistent")), None);
    }

    #[test]
    fn expand_alias_replaces_wildcard() {
        let dir = tempfile::tempdir().unwrap();
        let tags = dir.path().join("cypress").join("tags");
        fs::create_dir_all(&tags).unwrap();
        let file = tags.join("smoke.ts");
        fs::write(&file, "").unwrap();

        let result = expand_alias(
            "@tags/smoke",
            "@tags/*",
            &["cypress/tags/*".to_string()],
            dir.path(),
        );
        assert_eq!(result, Some(file));
        assert_eq!(
            expand_alias("lodash", "@tags/*", &["cypress/tags/*".to_string()], dir.path()),
            None
        );
    }

    #[test]
    fn expand_alias_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("all-tags.ts");
        fs::write(&file, "").unwrap();

        let result = expand_alias("@tags", "@tags", &["all-tags".to_string()], dir.path());
        assert_eq!(result, Some(file));
    }

    #[test]
    fn load_path_config_reads_paths_and_base_url() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{
  // compiler settings
  "compilerOptions": {
    "baseUrl": ".",
    /* aliases */
    "paths": { "@tags/*": ["cypress/tags/*"] }
  }
}"#,
        )
        .unwrap();
        let nested = dir.path().join("cypress").join("e2e");
        fs::create_dir_all(&nested).unwrap();

        let cfg = load_path_config(&nested).unwrap();
        assert_eq!(cfg.base_url, dir.path().join("."));
        assert_eq!(cfg.aliases, vec![("@tags/*".to_string(), vec!["cypress/tags/*".to_string()])]);
    }

    #[test]
    fn load_path_config_ignores_broken_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tsconfig.json"), "{ not json").unwrap();
        assert!(load_path_config(dir.path()).is_none());
    }

    #[test]
    fn resolve_import_relative_and_parent() {
        let dir = tempfile::tempdir().unwrap();
        let e2e = dir.path().join("e2e");
        fs::create_dir(&e2e).unwrap();
        let spec = e2e.join("login.cy.ts");
        fs::write(&spec, "").unwrap();
        let local = e2e.join("tags.ts");
        fs::write(&local, "").unwrap();
        let shared = dir.path().join("shared.js");
        fs::write(&shared, "").unwrap();

        assert_eq!(resolve_import("./tags", &spec, None), Some(local));
        let up = resolve_import("../shared", &spec, None).map(|p| p.canonicalize().unwrap());
        assert_eq!(up, Some(shared.canonicalize().unwrap()));
        assert_eq!(resolve_import("react", &spec, None), None);
    }

    #[test]
    fn resolve_import_through_alias() {
        let dir = tempfile::tempdir().unwrap();
        let tags = dir.path().join("tags");
        fs::create_dir(&tags).unwrap();
        let target = tags.join("smoke.ts");
        fs::write(&target, "").unwrap();
        let spec = dir.path().join("spec.ts");
        fs::write(&spec, "").unwrap();

        let cfg = PathConfig {
            base_url: dir.path().to_path_buf(),
            aliases: vec![("@tags/*".to_string(), vec!["tags/*".to_string()])],
        };
        assert_eq!(resolve_import("@tags/smoke", &spec, Some(&cfg)), Some(target));
    }
}
