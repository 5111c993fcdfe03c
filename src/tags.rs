use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ScanError;
use crate::model::{Node, Suite, Test, TestTags};
use crate::reconstruct::{reconstruct, reconstruct_file};
use crate::visit::visit_each_test;

/// Tag sets flowing down from enclosing suites.
#[derive(Debug, Clone, Default)]
struct Inherited {
    tags: Vec<String>,
    required: Vec<String>,
    only: Vec<String>,
}

impl Inherited {
    fn with_suite(&self, suite: &Suite) -> Self {
        let mut inner = self.clone();
        inner.tags.extend(suite.tags.iter().flatten().cloned());
        inner.required.extend(suite.required_tags.iter().flatten().cloned());
        inner.only.extend(suite.only_tags.iter().flatten().cloned());
        inner
    }
}

/// Compute every test's effective tags from its own tags and its suites'.
///
/// Required and only tags are inherited the same way and written back onto
/// each test; suites are left untouched. Running this twice gives the same
/// result.
pub fn propagate_tags(forest: &mut [Node]) {
    let top = Inherited::default();
    for node in forest {
        match node {
            Node::Suite(suite) => propagate_suite(suite, &top),
            Node::Test(test) => apply(test, &top),
        }
    }
}

fn propagate_suite(suite: &mut Suite, outer: &Inherited) {
    let inner = outer.with_suite(suite);
    for test in &mut suite.tests {
        apply(test, &inner);
    }
    for child in &mut suite.suites {
        propagate_suite(child, &inner);
    }
}

fn apply(test: &mut Test, inherited: &Inherited) {
    let required = sorted_union(&inherited.required, test.required_tags.as_deref());
    let only = sorted_union(&inherited.only, test.only_tags.as_deref());

    let mut effective = sorted_union(&inherited.tags, test.tags.as_deref());
    effective.extend(required.iter().cloned());
    effective.sort();
    effective.dedup();

    test.effective_tags = effective;
    test.required_tags = non_empty(required);
    test.only_tags = non_empty(only);
}

fn sorted_union(inherited: &[String], own: Option<&[String]>) -> Vec<String> {
    let mut all: Vec<String> = inherited
        .iter()
        .chain(own.unwrap_or_default())
        .cloned()
        .collect();
    all.sort();
    all.dedup();
    all
}

fn non_empty(tags: Vec<String>) -> Option<Vec<String>> {
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}

/// Tests whose effective tags include any of `wanted`, in visit order.
///
/// Expects a forest that went through [`propagate_tags`].
pub fn filter_by_effective_tags<'a, S: AsRef<str>>(forest: &'a [Node], wanted: &[S]) -> Vec<&'a Test> {
    let mut matches = Vec::new();
    visit_each_test(forest, |test| {
        let hit = test
            .effective_tags
            .iter()
            .any(|tag| wanted.iter().any(|w| w.as_ref() == tag));
        if hit {
            matches.push(test);
        }
    });
    matches
}

/// Reconstruct `source` and return the tests matching any of `wanted`.
pub fn filter_source_by_effective_tags<S: AsRef<str>>(
    source: &str,
    wanted: &[S],
) -> Result<Vec<Test>, ScanError> {
    let mut result = reconstruct(source)?;
    propagate_tags(&mut result.structure);
    Ok(filter_by_effective_tags(&result.structure, wanted)
        .into_iter()
        .cloned()
        .collect())
}

/// Effective, required and only tags of every test, keyed by full name.
pub fn find_effective_test_tags(source: &str) -> Result<BTreeMap<String, TestTags>, ScanError> {
    let mut result = reconstruct(source)?;
    propagate_tags(&mut result.structure);
    Ok(tags_by_full_name(&result.structure))
}

/// Like [`find_effective_test_tags`], reading `path` and resolving tag
/// constants it imports from neighbouring files.
pub fn find_effective_test_tags_in(path: &Path) -> Result<BTreeMap<String, TestTags>, ScanError> {
    let mut result = reconstruct_file(path)?;
    propagate_tags(&mut result.structure);
    Ok(tags_by_full_name(&result.structure))
}

pub(crate) fn tags_by_full_name(forest: &[Node]) -> BTreeMap<String, TestTags> {
    let mut map = BTreeMap::new();
    visit_each_test(forest, |test| {
        map.insert(
            test.full_name.clone(),
            TestTags {
                effective_tags: test.effective_tags.clone(),
                required_tags: test.required_tags.clone(),
                only_tags: test.only_tags.clone(),
            },
        );
    });
    map
}

/// Number of tests carrying each effective tag.
pub fn count_tags(forest: &[Node]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    visit_each_test(forest, |test| {
        for tag in &test.effective_tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    });
    counts
}
