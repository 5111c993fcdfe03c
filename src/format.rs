use std::fmt;

use crate::model::{Node, NodeRef, UNNAMED};

const MIDDLE: &str = "├─ ";
const LAST: &str = "└─ ";
const NEIGHBOUR: &str = "│ ";
const SPACER: &str = "  ";

/// Outline of a forest, one node per line.
///
/// ```text
/// ├─ parent [@user]
/// │ ├─ works a
/// │ └─ child
/// │   └─ (empty)
/// └─ top
/// ```
pub struct TestList<'a>(pub &'a [Node]);

impl fmt::Display for TestList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top: Vec<NodeRef<'_>> = self.0.iter().map(Node::as_node_ref).collect();
        let mut first = true;
        write_level(f, &top, "", &mut first)
    }
}

fn write_level(
    f: &mut fmt::Formatter<'_>,
    items: &[NodeRef<'_>],
    indent: &str,
    first: &mut bool,
) -> fmt::Result {
    let last = items.len().saturating_sub(1);
    for (k, item) in items.iter().enumerate() {
        let is_last = k == last;
        write_line(f, first, indent, if is_last { LAST } else { MIDDLE }, *item)?;

        let NodeRef::Suite(suite) = item else {
            continue;
        };
        let deeper = format!("{indent}{}", if is_last { SPACER } else { NEIGHBOUR });
        let children: Vec<NodeRef<'_>> = suite
            .tests
            .iter()
            .map(NodeRef::Test)
            .chain(suite.suites.iter().map(NodeRef::Suite))
            .collect();
        if children.is_empty() {
            separate(f, first)?;
            write!(f, "{deeper}{LAST}(empty)")?;
        } else {
            write_level(f, &children, &deeper, first)?;
        }
    }
    Ok(())
}

fn write_line(
    f: &mut fmt::Formatter<'_>,
    first: &mut bool,
    indent: &str,
    glyph: &str,
    node: NodeRef<'_>,
) -> fmt::Result {
    separate(f, first)?;
    write!(f, "{indent}{glyph}{}", node.name().unwrap_or(UNNAMED))?;
    match node.tags() {
        Some(tags) if !tags.is_empty() => write!(f, " [{}]", tags.join(", ")),
        _ => Ok(()),
    }
}

fn separate(f: &mut fmt::Formatter<'_>, first: &mut bool) -> fmt::Result {
    if *first {
        *first = false;
        Ok(())
    } else {
        f.write_str("\n")
    }
}
