use serde::Serialize;

/// Placeholder used in full names for suites and tests without a literal name.
pub const UNNAMED: &str = "<unnamed>";

/// A single test declaration (`it`, `specify`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub full_name: String,
    pub pending: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
    pub tags: Option<Vec<String>>,
    pub required_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_tags: Option<Vec<String>>,
    /// Own tags and required tags plus everything inherited from enclosing
    /// suites, sorted. Empty until tags are propagated.
    pub effective_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub line: usize,
}

/// A suite declaration (`describe`, `context`) and everything nested in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub full_name: String,
    pub pending: bool,
    pub tags: Option<Vec<String>>,
    pub required_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_tags: Option<Vec<String>>,
    pub tests: Vec<Test>,
    pub suites: Vec<Suite>,
    /// Tests anywhere under this suite.
    pub test_count: usize,
    /// Descendant suites, not counting this one.
    pub suite_count: usize,
    /// Pending tests anywhere under this suite.
    pub pending_test_count: usize,
    pub line: usize,
}

/// A top-level entry of the reconstructed forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Suite(Suite),
    Test(Test),
}

/// Borrowed view of either kind of node, handed out by the visitors.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Suite(&'a Suite),
    Test(&'a Test),
}

impl Node {
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Self::Suite(s) => NodeRef::Suite(s),
            Self::Test(t) => NodeRef::Test(t),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.as_node_ref().name()
    }
}

impl<'a> NodeRef<'a> {
    pub fn name(self) -> Option<&'a str> {
        match self {
            Self::Suite(s) => s.name.as_deref(),
            Self::Test(t) => t.name.as_deref(),
        }
    }

    pub fn full_name(self) -> &'a str {
        match self {
            Self::Suite(s) => &s.full_name,
            Self::Test(t) => &t.full_name,
        }
    }

    /// Tags declared on the node itself.
    pub fn tags(self) -> Option<&'a [String]> {
        match self {
            Self::Suite(s) => s.tags.as_deref(),
            Self::Test(t) => t.tags.as_deref(),
        }
    }

    pub fn is_suite(self) -> bool {
        matches!(self, Self::Suite(_))
    }
}

/// Whether a flat entry declares a suite or a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Suite,
    Test,
}

/// One probe in walk order, without any tree structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub pending: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub line: usize,
}

/// Everything recovered from one spec file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNames {
    /// Sorted names of every named suite.
    pub suite_names: Vec<String>,
    /// Sorted names of every named test.
    pub test_names: Vec<String>,
    /// Every probe in walk order.
    pub entries: Vec<Entry>,
    /// Top-level suites and tests in source order.
    pub structure: Vec<Node>,
    pub test_count: usize,
    pub pending_test_count: usize,
    /// Sorted full names of named tests.
    pub full_test_names: Vec<String>,
    /// Sorted full names of named suites.
    pub full_suite_names: Vec<String>,
}

/// Tag sets of a single test after propagation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestTags {
    pub effective_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_tags: Option<Vec<String>>,
}
