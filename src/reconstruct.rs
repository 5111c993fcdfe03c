mod engine;
mod index;
mod registry;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;
use tree_sitter::Node as SyntaxNode;

use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::lang::{Dialect, DEFAULT_ORDER};
use crate::literal::{Bindings, Value};
use crate::model::{Entry, EntryKind, Node, TestNames};
use crate::parser::{parse_file, parse_source};
use crate::resolve::{imported_values, ImportSource, RelativeFiles};
use crate::walk::walk_calls;

use engine::Engine;
use index::{Probe, ProbeId, ProbeIndex};

/// Reconstructs suite/test trees from spec sources.
///
/// Without an import source, `scan` leaves imported identifiers unresolved
/// and `scan_file` resolves them relative to the scanned file.
#[derive(Default)]
pub struct Scanner<'a> {
    options: ScanOptions,
    imports: Option<&'a dyn ImportSource>,
}

impl<'a> Scanner<'a> {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            imports: None,
        }
    }

    /// Resolve imported tag constants through `imports`.
    pub fn with_imports(mut self, imports: &'a dyn ImportSource) -> Self {
        self.imports = Some(imports);
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan source text, trying the plain grammar before the JSX one.
    pub fn scan(&self, source: &str) -> Result<TestNames, ScanError> {
        self.scan_with_order(source, DEFAULT_ORDER)
    }

    pub fn scan_with_order(&self, source: &str, order: &[Dialect]) -> Result<TestNames, ScanError> {
        let parsed = parse_source(source, order)?;
        Ok(self.reconstruct_tree(parsed.tree.root_node(), source.as_bytes(), self.imports))
    }

    /// Read and scan a file; the extension picks the grammar order.
    pub fn scan_file(&self, path: &Path) -> Result<TestNames, ScanError> {
        let (parsed, source) = parse_file(path)?;
        let relative;
        let imports: &dyn ImportSource = match self.imports {
            Some(imports) => imports,
            None => {
                relative = RelativeFiles::new(path);
                &relative
            }
        };
        Ok(self.reconstruct_tree(parsed.tree.root_node(), source.as_bytes(), Some(imports)))
    }

    fn reconstruct_tree(
        &self,
        root: SyntaxNode,
        src: &[u8],
        imports: Option<&dyn ImportSource>,
    ) -> TestNames {
        let imported: HashMap<String, Value> = imports
            .map(|imports| imported_values(root, src, imports))
            .unwrap_or_default();
        let bindings = Bindings::collect(root, src, imported);
        let index = ProbeIndex::build(root, src, &self.options, &bindings);

        let mut engine = Engine::default();
        let mut entries = Vec::with_capacity(index.len());

        // Both passes share this walk and the engine's registry.
        walk_calls(root, &mut |call, ancestors| {
            let Some(id) = index.id_of(call) else {
                return;
            };
            let chain: Vec<ProbeId> = ancestors
                .iter()
                .filter_map(|a| index.id_of(*a))
                .filter(|a| index.get(*a).kind.is_suite())
                .collect();

            let probe = index.get(id);
            if probe.kind.is_suite() {
                engine.observe_suite(id, &chain);
            } else {
                engine.observe_test(id, &chain);
            }
            entries.push(entry_of(probe));
        });

        debug!(
            probes = index.len(),
            suites = engine.suite_count(),
            constants = bindings.len(),
            "reconstructed"
        );

        let structure = engine.finish(&index);
        summarize(structure, entries)
    }
}

/// Reconstruct with the default keywords and no import resolution.
pub fn reconstruct(source: &str) -> Result<TestNames, ScanError> {
    Scanner::default().scan(source)
}

/// Reconstruct a file, resolving imported tag constants next to it.
pub fn reconstruct_file(path: &Path) -> Result<TestNames, ScanError> {
    Scanner::default().scan_file(path)
}

fn entry_of(probe: &Probe) -> Entry {
    Entry {
        kind: if probe.kind.is_suite() {
            EntryKind::Suite
        } else {
            EntryKind::Test
        },
        name: probe.name.clone(),
        pending: probe.pending,
        exclusive: probe.exclusive,
        tags: probe.tags.tags.clone(),
        required_tags: probe.tags.required_tags.clone(),
        only_tags: probe.tags.only_tags.clone(),
        comment: probe.comment.clone(),
        line: probe.line,
    }
}

fn summarize(structure: Vec<Node>, entries: Vec<Entry>) -> TestNames {
    let mut suite_names = Vec::new();
    let mut test_names = Vec::new();
    for entry in &entries {
        let Some(name) = &entry.name else { continue };
        match entry.kind {
            EntryKind::Suite => suite_names.push(name.clone()),
            EntryKind::Test => test_names.push(name.clone()),
        }
    }
    suite_names.sort();
    test_names.sort();

    let mut full_test_names = Vec::new();
    let mut full_suite_names = Vec::new();
    crate::visit::visit_each_node(&structure, |node| {
        if node.name().is_none() {
            return;
        }
        let full = node.full_name().to_string();
        if node.is_suite() {
            full_suite_names.push(full);
        } else {
            full_test_names.push(full);
        }
    });
    full_test_names.sort();
    full_suite_names.sort();

    let (mut test_count, mut pending_test_count) = (0, 0);
    for node in &structure {
        match node {
            Node::Suite(s) => {
                test_count += s.test_count;
                pending_test_count += s.pending_test_count;
            }
            Node::Test(t) => {
                test_count += 1;
                pending_test_count += usize::from(t.pending);
            }
        }
    }

    TestNames {
        suite_names,
        test_names,
        entries,
        structure,
        test_count,
        pending_test_count,
        full_test_names,
        full_suite_names,
    }
}
