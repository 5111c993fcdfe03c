use tree_sitter::Node;

/// Extract UTF-8 text from a tree-sitter node, returning `""` on failure.
pub fn txt<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// 1-based line a node starts on.
pub fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// Named children of a node, skipping comments.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// Strip `as`/`satisfies`/parentheses/non-null wrappers around an expression.
pub fn unwrap_expression(mut node: Node) -> Node {
    loop {
        match node.kind() {
            "parenthesized_expression"
            | "as_expression"
            | "satisfies_expression"
            | "non_null_expression" => match named_children(node).first() {
                Some(inner) => node = *inner,
                None => return node,
            },
            _ => return node,
        }
    }
}

/// Decoded value of a `string` node.
///
/// Fragments are copied verbatim and escape sequences are decoded.
pub fn string_value(node: Node, src: &[u8]) -> String {
    let mut out = Unescaped::default();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_fragment" => out.push_str(txt(child, src)),
            "escape_sequence" => out.push_escape(txt(child, src)),
            _ => {}
        }
    }
    out.finish()
}

/// Literal chunks of a `template_string`, each decoded and trimmed, in order.
///
/// Interpolated `${...}` parts split chunks and are otherwise discarded.
pub fn template_chunks(node: Node, src: &[u8]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = Unescaped::default();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_fragment" => current.push_str(txt(child, src)),
            "escape_sequence" => current.push_escape(txt(child, src)),
            "template_substitution" => chunks.push(std::mem::take(&mut current).finish()),
            _ => {}
        }
    }
    chunks.push(current.finish());

    chunks
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Whether a `template_string` contains any `${...}` substitution.
pub fn has_substitution(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .any(|c| c.kind() == "template_substitution");
    found
}

/// Decoded literal text. A `\uXXXX` high surrogate is held back until the
/// next escape, so a following low surrogate combines with it; unpaired
/// halves are kept as written.
#[derive(Default)]
struct Unescaped<'a> {
    text: String,
    high: Option<(u32, &'a str)>,
}

impl<'a> Unescaped<'a> {
    fn push_str(&mut self, s: &str) {
        self.flush();
        self.text.push_str(s);
    }

    fn push_escape(&mut self, seq: &'a str) {
        match utf16_unit(seq) {
            Some(unit @ 0xD800..=0xDBFF) => {
                self.flush();
                self.high = Some((unit, seq));
                return;
            }
            Some(low @ 0xDC00..=0xDFFF) => {
                if let Some((high, _)) = self.high.take() {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(c) = char::from_u32(code) {
                        self.text.push(c);
                        return;
                    }
                }
            }
            _ => {}
        }
        self.flush();
        decode_escape(seq, &mut self.text);
    }

    fn flush(&mut self) {
        if let Some((_, raw)) = self.high.take() {
            self.text.push_str(raw);
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.text
    }
}

/// The code unit of a four-digit `\uXXXX` escape.
fn utf16_unit(seq: &str) -> Option<u32> {
    let hex = seq.strip_prefix("\\u")?;
    if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn decode_escape(seq: &str, out: &mut String) {
    let body = seq.strip_prefix('\\').unwrap_or(seq);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return;
    };
    let rest = chars.as_str();
    match first {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        'b' => out.push('\u{8}'),
        'f' => out.push('\u{c}'),
        'v' => out.push('\u{b}'),
        '0' if rest.is_empty() => out.push('\0'),
        'u' | 'x' => {
            let hex = rest.trim_start_matches('{').trim_end_matches('}');
            match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                Some(c) => out.push(c),
                None => out.push_str(seq),
            }
        }
        // Line continuation
        '\n' | '\r' => {}
        other => {
            out.push(other);
            out.push_str(rest);
        }
    }
}

/// Text of a comment with its markers removed and whitespace trimmed.
///
/// Block comments have a leading `*` stripped from each line; the remaining
/// non-empty lines are joined with a single space.
pub fn comment_text(raw: &str) -> String {
    if let Some(line) = raw.strip_prefix("//") {
        return line.trim().to_string();
    }

    let inner = raw.strip_prefix("/*").unwrap_or(raw);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    inner
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Push `item` unless an equal string is already present.
pub fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.iter().any(|existing| *existing == item) {
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    /// First node of `kind` in pre-order.
    fn find<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        children.into_iter().find_map(|c| find(c, kind))
    }

    #[test]
    fn string_value_decodes_escapes() {
        let src = r#"x = 'it\'s a A\ttab'"#;
        let tree = parse(src);
        let s = find(tree.root_node(), "string").unwrap();
        assert_eq!(string_value(s, src.as_bytes()), "it's a A\ttab");
    }

    #[test]
    fn string_value_combines_surrogate_pairs() {
        let src = r"x = 'smile \uD83D\uDE00'";
        let tree = parse(src);
        let s = find(tree.root_node(), "string").unwrap();
        assert_eq!(string_value(s, src.as_bytes()), "smile \u{1F600}");

        let src = r"x = 'half \uD83D!'";
        let tree = parse(src);
        let s = find(tree.root_node(), "string").unwrap();
        assert_eq!(string_value(s, src.as_bytes()), r"half \uD83D!");
    }

    #[test]
    fn template_chunks_combine_surrogate_pairs() {
        let src = r"x = `\uD83D\uDE00 ${n} done`";
        let tree = parse(src);
        let t = find(tree.root_node(), "template_string").unwrap();
        assert_eq!(template_chunks(t, src.as_bytes()), vec!["\u{1F600}", "done"]);
    }

    #[test]
    fn string_value_handles_empty_string() {
        let src = "x = ''";
        let tree = parse(src);
        let s = find(tree.root_node(), "string").unwrap();
        assert_eq!(string_value(s, src.as_bytes()), "");
    }

    #[test]
    fn template_chunks_drop_substitutions() {
        let src = "x = `bar ${k + 1} the end`";
        let tree = parse(src);
        let t = find(tree.root_node(), "template_string").unwrap();
        assert_eq!(template_chunks(t, src.as_bytes()), vec!["bar", "the end"]);
        assert!(has_substitution(t));
    }

    #[test]
    fn template_chunks_of_plain_template() {
        let src = "x = `plain`";
        let tree = parse(src);
        let t = find(tree.root_node(), "template_string").unwrap();
        assert_eq!(template_chunks(t, src.as_bytes()), vec!["plain"]);
        assert!(!has_substitution(t));
    }

    #[test]
    fn unwrap_expression_strips_as_const() {
        let src = "x = ('@a' as const)";
        let tree = parse(src);
        let p = find(tree.root_node(), "parenthesized_expression").unwrap();
        assert_eq!(unwrap_expression(p).kind(), "string");
    }

    #[test]
    fn comment_text_strips_markers() {
        assert_eq!(comment_text("// this is the test comment"), "this is the test comment");
        assert_eq!(comment_text("/* inline */"), "inline");
        assert_eq!(
            comment_text("/**\n * first line\n * second line\n */"),
            "first line second line"
        );
    }

    #[test]
    fn push_unique_keeps_first_occurrence() {
        let mut items = vec!["@a".to_string()];
        push_unique(&mut items, "@b".to_string());
        push_unique(&mut items, "@a".to_string());
        assert_eq!(items, vec!["@a", "@b"]);
    }
}
