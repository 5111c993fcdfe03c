use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use tree_sitter::Node;

use crate::error::ExtractError;
use crate::util::{
    comment_text, has_substitution, line_of, named_children, push_unique, string_value,
    template_chunks, txt, unwrap_expression,
};

/// A statically known value a tag expression may refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    List(Vec<String>),
    Object(BTreeMap<String, Value>),
}

/// Tag lists declared in a probe's config object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredTags {
    pub tags: Option<Vec<String>>,
    pub required_tags: Option<Vec<String>>,
    pub only_tags: Option<Vec<String>>,
}

/// Names bound to statically known values in one source file.
///
/// Holds every single-assignment `const` in the file plus whatever the
/// file imports from its neighbours.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    /// Collect `const` bindings from the whole tree on top of `imported`.
    ///
    /// Declarations are evaluated in source order, so a constant may refer to
    /// constants declared above it. A name declared more than once anywhere
    /// in the file is left unbound.
    pub fn collect(root: Node, src: &[u8], imported: HashMap<String, Value>) -> Self {
        let mut declarators = Vec::new();
        collect_declarators(root, src, &mut declarators);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for d in &declarators {
            *counts.entry(d.name).or_default() += 1;
        }

        let mut bindings = Self { values: imported };
        for d in &declarators {
            if !d.is_const || counts.get(d.name).copied().unwrap_or(0) > 1 {
                continue;
            }
            let Some(value_node) = d.value else {
                continue;
            };
            if let Some(value) = bindings.eval(value_node, src) {
                bindings.values.insert(d.name.to_string(), value);
            }
        }
        bindings
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluate the narrow set of expressions tags may be written with.
    pub fn eval(&self, node: Node, src: &[u8]) -> Option<Value> {
        let node = unwrap_expression(node);
        match node.kind() {
            "string" => Some(Value::Str(string_value(node, src))),
            "template_string" if !has_substitution(node) => {
                Some(Value::Str(template_chunks(node, src).join(" ")))
            }
            "array" => Some(Value::List(self.eval_array(node, src))),
            "identifier" | "shorthand_property_identifier" => self.values.get(txt(node, src)).cloned(),
            "member_expression" => {
                let object = node.child_by_field_name("object")?;
                let property = node.child_by_field_name("property")?;
                match self.eval(object, src)? {
                    Value::Object(map) => map.get(txt(property, src)).cloned(),
                    _ => None,
                }
            }
            "subscript_expression" => {
                let object = node.child_by_field_name("object")?;
                let index = node.child_by_field_name("index")?;
                let Value::Str(key) = self.eval(index, src)? else {
                    return None;
                };
                match self.eval(object, src)? {
                    Value::Object(map) => map.get(&key).cloned(),
                    _ => None,
                }
            }
            "object" => Some(Value::Object(self.eval_object(node, src))),
            _ => None,
        }
    }

    fn eval_array(&self, node: Node, src: &[u8]) -> Vec<String> {
        let mut items = Vec::new();
        for element in named_children(node) {
            let target = if element.kind() == "spread_element" {
                named_children(element).first().copied()
            } else {
                Some(element)
            };
            match target.and_then(|t| self.eval(t, src)) {
                Some(Value::Str(s)) if element.kind() != "spread_element" => items.push(s),
                Some(Value::List(list)) => items.extend(list),
                _ => log_recovered(&ExtractError::UnresolvedTag {
                    text: txt(element, src).to_string(),
                    line: line_of(element),
                }),
            }
        }
        items
    }

    fn eval_object(&self, node: Node, src: &[u8]) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        for prop in named_children(node) {
            match prop.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (
                        prop.child_by_field_name("key").and_then(|k| property_key(k, src)),
                        prop.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    if let Some(v) = self.eval(value, src) {
                        map.insert(key, v);
                    }
                }
                "shorthand_property_identifier" => {
                    let name = txt(prop, src);
                    if let Some(v) = self.values.get(name) {
                        map.insert(name.to_string(), v.clone());
                    }
                }
                "spread_element" => {
                    let inner = named_children(prop).first().copied();
                    if let Some(Value::Object(other)) = inner.and_then(|i| self.eval(i, src)) {
                        map.extend(other);
                    }
                }
                _ => {}
            }
        }
        map
    }
}

struct Declarator<'t, 's> {
    name: &'s str,
    value: Option<Node<'t>>,
    is_const: bool,
}

fn collect_declarators<'t, 's>(node: Node<'t>, src: &'s [u8], out: &mut Vec<Declarator<'t, 's>>) {
    if matches!(node.kind(), "lexical_declaration" | "variable_declaration") {
        let is_const = node.kind() == "lexical_declaration"
            && node
                .child_by_field_name("kind")
                .is_some_and(|k| txt(k, src) == "const");
        for child in named_children(node) {
            if child.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = child.child_by_field_name("name") else {
                continue;
            };
            if name.kind() != "identifier" {
                continue;
            }
            out.push(Declarator {
                name: txt(name, src),
                value: child.child_by_field_name("value"),
                is_const,
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_declarators(child, src, out);
    }
}

/// Key of an object property written as an identifier, string or number.
pub(crate) fn property_key(key: Node, src: &[u8]) -> Option<String> {
    match key.kind() {
        "property_identifier" | "number" => Some(txt(key, src).to_string()),
        "string" => Some(string_value(key, src)),
        _ => None,
    }
}

/// Display name from the first argument of a probe call.
///
/// `Ok(None)` when there is no argument at all; an error when the argument
/// is something other than a string or template literal.
pub(crate) fn probe_name(args: &[Node], src: &[u8]) -> Result<Option<String>, ExtractError> {
    let Some(first) = args.first() else {
        return Ok(None);
    };
    match first.kind() {
        "string" => Ok(Some(string_value(*first, src))),
        "template_string" => Ok(Some(template_chunks(*first, src).join(" "))),
        other => Err(ExtractError::UnrecognizedName {
            kind: other.to_string(),
            line: line_of(*first),
        }),
    }
}

/// `tags`, `requiredTags` and `onlyTags` from a config object in second
/// position.
pub(crate) fn declared_tags(args: &[Node], src: &[u8], bindings: &Bindings) -> DeclaredTags {
    let mut declared = DeclaredTags::default();
    let Some(config) = args.get(1).map(|a| unwrap_expression(*a)) else {
        return declared;
    };
    if config.kind() != "object" {
        return declared;
    }

    for prop in named_children(config) {
        let (key, value) = match prop.kind() {
            "pair" => {
                let (Some(key), Some(value)) = (
                    prop.child_by_field_name("key").and_then(|k| property_key(k, src)),
                    prop.child_by_field_name("value"),
                ) else {
                    continue;
                };
                (key, value)
            }
            // `{ tags }` reads the local constant of the same name.
            "shorthand_property_identifier" => (txt(prop, src).to_string(), prop),
            _ => continue,
        };
        let slot = match key.as_str() {
            "tags" => &mut declared.tags,
            "requiredTags" => &mut declared.required_tags,
            "onlyTags" => &mut declared.only_tags,
            _ => continue,
        };
        *slot = tag_list(value, src, bindings);
    }
    declared
}

/// Resolve one tag property value; empty lists count as absent.
fn tag_list(value: Node, src: &[u8], bindings: &Bindings) -> Option<Vec<String>> {
    let items = match bindings.eval(value, src) {
        Some(Value::Str(s)) => vec![s],
        Some(Value::List(list)) => list,
        _ => {
            log_recovered(&ExtractError::UnresolvedTag {
                text: txt(value, src).to_string(),
                line: line_of(value),
            });
            return None;
        }
    };

    let mut unique = Vec::new();
    for item in items {
        push_unique(&mut unique, item);
    }
    if unique.is_empty() {
        None
    } else {
        Some(unique)
    }
}

/// Comment written directly before a call or its enclosing statement.
///
/// The comment must end on the line before, or on the same line as, the
/// statement it annotates, and must not trail some earlier code on its line.
pub(crate) fn leading_comment(call: Node, src: &[u8]) -> Option<String> {
    let statement = call
        .parent()
        .filter(|p| p.kind() == "expression_statement")
        .unwrap_or(call);

    for candidate in [call, statement] {
        let Some(prev) = candidate.prev_sibling() else {
            continue;
        };
        if prev.kind() != "comment" {
            continue;
        }
        if prev.end_position().row + 1 < candidate.start_position().row {
            continue;
        }
        // Punctuation such as an opening `{` does not make a comment trailing.
        let trailing = prev.prev_sibling().is_some_and(|before| {
            before.is_named()
                && before.kind() != "comment"
                && before.end_position().row == prev.start_position().row
        });
        if trailing {
            continue;
        }
        let text = comment_text(txt(prev, src));
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

pub(crate) fn log_recovered(err: &ExtractError) {
    debug!("recovered: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::call_arguments;

    fn parse(src: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    /// Last call expression whose callee text is `callee`, in pre-order.
    fn find_call<'t>(node: Node<'t>, src: &[u8], callee: &str) -> Option<Node<'t>> {
        let mut found = None;
        if node.kind() == "call_expression"
            && node
                .child_by_field_name("function")
                .is_some_and(|f| txt(f, src) == callee)
        {
            found = Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children {
            if let Some(c) = find_call(child, src, callee) {
                found = Some(c);
            }
        }
        found
    }

    fn tags_of(src: &str) -> DeclaredTags {
        let tree = parse(src);
        let bytes = src.as_bytes();
        let bindings = Bindings::collect(tree.root_node(), bytes, HashMap::new());
        let call = find_call(tree.root_node(), bytes, "it").unwrap();
        declared_tags(&call_arguments(call), bytes, &bindings)
    }

    fn strings(items: &[&str]) -> Option<Vec<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn name_from_string_and_template() {
        let src = "it('plain', () => {}); it(`bar ${k + 1} the end`, () => {})";
        let tree = parse(src);
        let bytes = src.as_bytes();
        let root = tree.root_node();
        let first = root.named_child(0).unwrap().named_child(0).unwrap();
        let second = root.named_child(1).unwrap().named_child(0).unwrap();
        assert_eq!(
            probe_name(&call_arguments(first), bytes).unwrap(),
            Some("plain".to_string())
        );
        assert_eq!(
            probe_name(&call_arguments(second), bytes).unwrap(),
            Some("bar the end".to_string())
        );
    }

    #[test]
    fn variable_name_is_unrecognized() {
        let src = "const name = 'works'\nit(name, () => {})";
        let tree = parse(src);
        let bytes = src.as_bytes();
        let call = find_call(tree.root_node(), bytes, "it").unwrap();
        let err = probe_name(&call_arguments(call), bytes).unwrap_err();
        assert!(matches!(err, ExtractError::UnrecognizedName { ref kind, line: 2 } if kind == "identifier"));
    }

    #[test]
    fn no_arguments_means_no_name() {
        let src = "it()";
        let tree = parse(src);
        let call = find_call(tree.root_node(), src.as_bytes(), "it").unwrap();
        assert_eq!(probe_name(&call_arguments(call), src.as_bytes()).unwrap(), None);
    }

    #[test]
    fn single_string_tag() {
        let tags = tags_of("it('bar', {tags: '@one'}, () => {})");
        assert_eq!(tags.tags, strings(&["@one"]));
        assert_eq!(tags.required_tags, None);
    }

    #[test]
    fn array_tags_keep_order_and_drop_duplicates() {
        let tags = tags_of("it('bar', {tags: ['@two', '@one', '@two']}, () => {})");
        assert_eq!(tags.tags, strings(&["@two", "@one"]));
    }

    #[test]
    fn empty_array_is_absent() {
        let tags = tags_of("it('blipp', {tags: []}, () => {})");
        assert_eq!(tags.tags, None);
    }

    #[test]
    fn required_and_only_tags() {
        let tags = tags_of("it('w', {tags: '@one', requiredTags: '@two', onlyTags: ['@special']}, () => {})");
        assert_eq!(tags.tags, strings(&["@one"]));
        assert_eq!(tags.required_tags, strings(&["@two"]));
        assert_eq!(tags.only_tags, strings(&["@special"]));
    }

    #[test]
    fn shorthand_properties_read_local_constants() {
        let tags = tags_of("const tags = '@x'\nconst requiredTags = ['@r', '@r']\nit('t', { tags, requiredTags }, () => {})");
        assert_eq!(tags.tags, strings(&["@x"]));
        assert_eq!(tags.required_tags, strings(&["@r"]));
        assert_eq!(tags.only_tags, None);

        let unknown = tags_of("it('t', { tags }, () => {})");
        assert_eq!(unknown.tags, None);
    }

    #[test]
    fn string_keys_are_accepted() {
        let tags = tags_of("it('w', {'tags': '@quoted'}, () => {})");
        assert_eq!(tags.tags, strings(&["@quoted"]));
    }

    #[test]
    fn spread_config_is_ignored() {
        let src = "const VIEWPORT = { viewportHeight: 800 };\nit('works', { tags: '@foo', ...VIEWPORT }, () => {})";
        assert_eq!(tags_of(src).tags, strings(&["@foo"]));
    }

    #[test]
    fn resolves_local_constants() {
        let src = "const foo = '@foo';\nit('works', { tags: foo }, () => {})";
        assert_eq!(tags_of(src).tags, strings(&["@foo"]));

        let src = "const bar = '@bar';\nit('works', { tags: ['@foo', bar] }, () => {})";
        assert_eq!(tags_of(src).tags, strings(&["@foo", "@bar"]));
    }

    #[test]
    fn resolves_object_members() {
        let src = "const TAGS = {\n  foo: '@foo',\n}\nit('works', { tags: ['@sanity', TAGS.foo] }, () => {})";
        assert_eq!(tags_of(src).tags, strings(&["@sanity", "@foo"]));

        let src = "const TAGS = { foo: '@foo' }\nit('works', { requiredTags: TAGS['foo'] }, () => {})";
        assert_eq!(tags_of(src).required_tags, strings(&["@foo"]));
    }

    #[test]
    fn resolves_spread_arrays_and_as_const() {
        let src = "const BASE = ['@a', '@b'] as const;\nconst ALL = [...BASE, '@c'];\nit('x', { tags: ALL }, () => {})";
        assert_eq!(tags_of(src).tags, strings(&["@a", "@b", "@c"]));
    }

    #[test]
    fn unresolvable_values_are_dropped() {
        let src = "it('x', { tags: ['@a', getTag(), `@${env}`] }, () => {})";
        assert_eq!(tags_of(src).tags, strings(&["@a"]));

        let src = "it('x', { tags: computeTags() }, () => {})";
        assert_eq!(tags_of(src).tags, None);
    }

    #[test]
    fn reassigned_names_are_not_resolved() {
        let src = "const tag = '@a';\nfunction f() { const tag = '@b' }\nit('x', { tags: tag }, () => {})";
        assert_eq!(tags_of(src).tags, None);

        let src = "let tag = '@a';\nit('x', { tags: tag }, () => {})";
        assert_eq!(tags_of(src).tags, None);
    }

    #[test]
    fn imported_values_are_visible() {
        let src = "it('x', { tags: [TAGS.user, smoke] }, () => {})";
        let tree = parse(src);
        let bytes = src.as_bytes();
        let mut imported = HashMap::new();
        imported.insert("smoke".to_string(), Value::Str("@smoke".to_string()));
        let mut tags = BTreeMap::new();
        tags.insert("user".to_string(), Value::Str("@user".to_string()));
        imported.insert("TAGS".to_string(), Value::Object(tags));
        let bindings = Bindings::collect(tree.root_node(), bytes, imported);
        assert_eq!(bindings.len(), 2);

        let call = find_call(tree.root_node(), bytes, "it").unwrap();
        let declared = declared_tags(&call_arguments(call), bytes, &bindings);
        assert_eq!(declared.tags, strings(&["@user", "@smoke"]));
    }

    #[test]
    fn leading_comment_before_statement() {
        let src = "describe('foo', () => {\n  // this is the test comment\n  it('bar', () => {})\n})";
        let tree = parse(src);
        let bytes = src.as_bytes();
        let call = find_call(tree.root_node(), bytes, "it").unwrap();
        assert_eq!(
            leading_comment(call, bytes),
            Some("this is the test comment".to_string())
        );
    }

    #[test]
    fn detached_and_trailing_comments_are_ignored() {
        let src = "// far away\n\nit('a', () => {}) // about a\nit('b', () => {})";
        let tree = parse(src);
        let bytes = src.as_bytes();
        let a = tree.root_node().named_child(1).unwrap().named_child(0).unwrap();
        let b = find_call(tree.root_node(), bytes, "it").unwrap();
        assert_eq!(leading_comment(a, bytes), None);
        assert_eq!(leading_comment(b, bytes), None);
    }

    #[test]
    fn comment_after_opening_brace_belongs_to_next_test() {
        let src = "describe('p', () => { // note\n  it('x', () => {})\n})";
        let tree = parse(src);
        let bytes = src.as_bytes();
        let call = find_call(tree.root_node(), bytes, "it").unwrap();
        assert_eq!(leading_comment(call, bytes), Some("note".to_string()));
    }
}
