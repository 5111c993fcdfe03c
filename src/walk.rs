use tree_sitter::Node;

/// Depth-first walk calling `visit(call, ancestors)` for every
/// `call_expression`.
///
/// Calls are reported in post-order: every call nested inside another call's
/// subtree is reported before the enclosing call. `ancestors` runs from the
/// root down to the call's immediate parent. Node kinds the walk knows nothing
/// about are descended into like any other.
pub fn walk_calls<'t, F>(root: Node<'t>, visit: &mut F)
where
    F: FnMut(Node<'t>, &[Node<'t>]),
{
    let mut ancestors = Vec::new();
    walk_node(root, &mut ancestors, visit);
}

fn walk_node<'t, F>(node: Node<'t>, ancestors: &mut Vec<Node<'t>>, visit: &mut F)
where
    F: FnMut(Node<'t>, &[Node<'t>]),
{
    ancestors.push(node);
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_node(child, ancestors, visit);
    }
    ancestors.pop();

    if node.kind() == "call_expression" {
        visit(node, ancestors);
    }
}

/// Pre-order walk over every `call_expression`, without ancestors.
pub fn for_each_call_preorder<'t, F>(node: Node<'t>, visit: &mut F)
where
    F: FnMut(Node<'t>),
{
    if node.kind() == "call_expression" {
        visit(node);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        for_each_call_preorder(child, visit);
    }
}
