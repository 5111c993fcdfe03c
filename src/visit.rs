use crate::model::{Node, NodeRef, Suite, Test};

/// Call `visit` for every test in the forest, depth first.
///
/// Within a suite, its own tests come before the tests of nested suites.
pub fn visit_each_test<'a, F>(forest: &'a [Node], mut visit: F)
where
    F: FnMut(&'a Test),
{
    visit_each_node(forest, |node| {
        if let NodeRef::Test(test) = node {
            visit(test);
        }
    });
}

/// Call `visit` for every suite and test in the forest, parents first.
pub fn visit_each_node<'a, F>(forest: &'a [Node], mut visit: F)
where
    F: FnMut(NodeRef<'a>),
{
    for node in forest {
        match node {
            Node::Suite(suite) => visit_suite(suite, &mut visit),
            Node::Test(test) => visit(NodeRef::Test(test)),
        }
    }
}

fn visit_suite<'a, F>(suite: &'a Suite, visit: &mut F)
where
    F: FnMut(NodeRef<'a>),
{
    visit(NodeRef::Suite(suite));
    for test in &suite.tests {
        visit(NodeRef::Test(test));
    }
    for child in &suite.suites {
        visit_suite(child, visit);
    }
}
