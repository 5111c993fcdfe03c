use std::collections::HashMap;

use tracing::debug;
use tree_sitter::Node;

use crate::lang::DEFAULT_ORDER;
use crate::literal::{Bindings, Value};
use crate::parser::parse_source;
use crate::util::{named_children, string_value, txt};

use super::ImportSource;

/// Statically known values a module exports, keyed by export name.
///
/// Covers `export const`, `export { a as b }` over local constants and
/// `export default <expr>` (key `default`). Unparsable sources export
/// nothing.
pub fn resolve_exports(source: &str) -> HashMap<String, Value> {
    match parse_source(source, DEFAULT_ORDER) {
        Ok(parsed) => exports_in(parsed.tree.root_node(), source.as_bytes()),
        Err(err) => {
            debug!("no exports from unparsable module: {err}");
            HashMap::new()
        }
    }
}

/// Values bound by the import statements of `source`, keyed by local name.
pub fn resolve_imports(source: &str, imports: &dyn ImportSource) -> HashMap<String, Value> {
    match parse_source(source, DEFAULT_ORDER) {
        Ok(parsed) => imported_values(parsed.tree.root_node(), source.as_bytes(), imports),
        Err(err) => {
            debug!("no imports from unparsable source: {err}");
            HashMap::new()
        }
    }
}

pub(crate) fn imported_values(
    root: Node,
    src: &[u8],
    imports: &dyn ImportSource,
) -> HashMap<String, Value> {
    let mut values = HashMap::new();

    for stmt in named_children(root) {
        if stmt.kind() != "import_statement" {
            continue;
        }
        // Side-effect imports bind nothing.
        let Some(clause) = named_children(stmt)
            .into_iter()
            .find(|c| c.kind() == "import_clause")
        else {
            continue;
        };
        let Some(from) = stmt
            .child_by_field_name("source")
            .map(|s| string_value(s, src))
        else {
            continue;
        };

        debug!(from = %from, "importing");
        let Some(text) = imports.read(&from) else {
            debug!(from = %from, "could not find source");
            continue;
        };
        let exported = resolve_exports(&text);
        bind_clause(clause, src, &from, &exported, &mut values);
    }

    values
}

fn bind_clause(
    clause: Node,
    src: &[u8],
    from: &str,
    exported: &HashMap<String, Value>,
    values: &mut HashMap<String, Value>,
) {
    for part in named_children(clause) {
        match part.kind() {
            "identifier" => bind(values, exported, from, "default", txt(part, src)),
            "namespace_import" => {
                if let Some(local) = named_children(part).first() {
                    let all = exported.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                    values.insert(txt(*local, src).to_string(), Value::Object(all));
                }
            }
            "named_imports" => {
                for spec in named_children(part) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec.child_by_field_name("name").map(|n| module_name(n, src))
                    else {
                        continue;
                    };
                    let local = spec
                        .child_by_field_name("alias")
                        .map_or_else(|| name.clone(), |a| txt(a, src).to_string());
                    bind(values, exported, from, &name, &local);
                }
            }
            _ => {}
        }
    }
}

fn bind(
    values: &mut HashMap<String, Value>,
    exported: &HashMap<String, Value>,
    from: &str,
    name: &str,
    local: &str,
) {
    match exported.get(name) {
        Some(value) => {
            debug!(name, local, "imported");
            values.insert(local.to_string(), value.clone());
        }
        None => debug!(name, from, "export not found"),
    }
}

fn exports_in(root: Node, src: &[u8]) -> HashMap<String, Value> {
    let bindings = Bindings::collect(root, src, HashMap::new());
    let mut exports = HashMap::new();

    for stmt in named_children(root) {
        if stmt.kind() != "export_statement" || stmt.child_by_field_name("source").is_some() {
            continue;
        }

        if let Some(decl) = stmt.child_by_field_name("declaration") {
            if !matches!(decl.kind(), "lexical_declaration" | "variable_declaration") {
                continue;
            }
            for declarator in named_children(decl) {
                let (Some(name), Some(value)) = (
                    declarator.child_by_field_name("name"),
                    declarator.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if name.kind() != "identifier" {
                    continue;
                }
                if let Some(v) = bindings.eval(value, src) {
                    exports.insert(txt(name, src).to_string(), v);
                }
            }
        } else if let Some(value) = stmt.child_by_field_name("value") {
            if let Some(v) = bindings.eval(value, src) {
                exports.insert("default".to_string(), v);
            }
        } else if let Some(clause) = named_children(stmt)
            .into_iter()
            .find(|c| c.kind() == "export_clause")
        {
            for spec in named_children(clause) {
                let Some(local) = spec.child_by_field_name("name").map(|n| module_name(n, src)) else {
                    continue;
                };
                let Some(v) = bindings.get(&local) else {
                    continue;
                };
                let exported_as = spec
                    .child_by_field_name("alias")
                    .map_or_else(|| local.clone(), |a| module_name(a, src));
                exports.insert(exported_as, v.clone());
            }
        }
    }

    exports
}

/// Name in an import or export specifier; string names are allowed there.
fn module_name(node: Node, src: &[u8]) -> String {
    if node.kind() == "string" {
        string_value(node, src)
    } else {
        txt(node, src).to_string()
    }
}
