use std::path::Path;

use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

use crate::error::ScanError;
use crate::lang::Dialect;

/// A clean parse of one source text.
pub struct ParsedSource {
    pub tree: Tree,
    pub dialect: Dialect,
}

/// Parse `source`, trying each dialect in order until one yields a tree
/// without error or missing nodes.
///
/// When every dialect fails, the error points at the first broken node of the
/// first attempt.
pub fn parse_source(source: &str, order: &[Dialect]) -> Result<ParsedSource, ScanError> {
    let mut first_error: Option<(usize, usize)> = None;

    for &dialect in order {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&dialect.tree_sitter_language()) {
            debug!("cannot load {dialect} grammar: {e}");
            continue;
        }
        let Some(tree) = parser.parse(source, None) else {
            debug!("{dialect} parser gave up");
            continue;
        };

        let root = tree.root_node();
        if !root.has_error() {
            return Ok(ParsedSource { tree, dialect });
        }

        let (line, column) = first_error_position(root);
        debug!("{dialect} parse has errors starting at {line}:{column}, trying next dialect");
        if first_error.is_none() {
            first_error = Some((line, column));
        }
    }

    let (line, column) = first_error.unwrap_or((1, 1));
    Err(ScanError::Parse {
        line,
        column,
        tried: order
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Read and parse a file, returning the clean tree and the source text.
pub fn parse_file(path: &Path) -> Result<(ParsedSource, String), ScanError> {
    let order = Dialect::order_for_path(path)?;

    let source = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let parsed = parse_source(&source, order)?;
    Ok((parsed, source))
}

/// 1-based line and column of the first error or missing node.
fn first_error_position(root: Node) -> (usize, usize) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return (pos.row + 1, pos.column + 1);
        }
        // Descend only into subtrees that contain the error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                if cursor.node().has_error() {
                    break;
                }
                continue;
            }
            if !cursor.goto_parent() {
                let pos = root.start_position();
                return (pos.row + 1, pos.column + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::DEFAULT_ORDER;

    #[test]
    fn parses_plain_spec_with_first_dialect() {
        let parsed = parse_source("describe('a', () => { it('b', () => {}) })", DEFAULT_ORDER)
            .unwrap();
        assert_eq!(parsed.dialect, Dialect::TypeScript);
        assert!(!parsed.tree.root_node().has_error());
    }

    #[test]
    fn falls_back_to_tsx_for_jsx() {
        let src = "describe('parent', () => {\n  it('mounts', () => {\n    cy.mount(<Counter />)\n  })\n})\n";
        let parsed = parse_source(src, DEFAULT_ORDER).unwrap();
        assert_eq!(parsed.dialect, Dialect::Tsx);
    }

    #[test]
    fn type_annotations_parse() {
        let src = "interface Person { name: string }\nit('loads', () => { const n: number = 1 })\n";
        assert!(parse_source(src, DEFAULT_ORDER).is_ok());
    }

    #[test]
    fn broken_source_is_a_parse_error() {
        let err = match parse_source("describe('a', () => {\n  it('b', (\n", DEFAULT_ORDER) {
            Err(e) => e,
            Ok(_) => panic!("expected a parse error"),
        };
        match err {
            ScanError::Parse { line, tried, .. } => {
                assert!(line >= 1);
                assert_eq!(tried, "typescript, tsx");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("spec.rb");
        std::fs::write(&file, "describe 'x' do end").unwrap();
        assert!(matches!(
            parse_file(&file),
            Err(ScanError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn parse_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.cy.js");
        assert!(matches!(parse_file(&file), Err(ScanError::Io { .. })));
    }
}
