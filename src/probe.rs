use tree_sitter::Node;

use crate::config::ScanOptions;
use crate::util::{named_children, txt, unwrap_expression};

/// What a recognized declaration call declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// `describe(...)`, `context(...)`, `describe.only(...)`
    Suite,
    /// `describe.skip(...)`
    SuiteSkip,
    /// `it(...)`, `specify(...)`
    Test,
    /// `it.skip(...)`
    TestSkip,
    /// `it.only(...)`
    TestOnly,
}

impl ProbeKind {
    pub fn is_suite(self) -> bool {
        matches!(self, Self::Suite | Self::SuiteSkip)
    }

    pub fn is_test(self) -> bool {
        !self.is_suite()
    }

    pub fn is_skip(self) -> bool {
        matches!(self, Self::SuiteSkip | Self::TestSkip)
    }

    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::TestOnly)
    }
}

/// Classify a `call_expression` node; `None` for any other call.
///
/// Recognizes `kw(...)`, `kw.skip(...)` and `kw.only(...)` for every suite
/// and test keyword in `options`.
pub fn classify(call: Node, src: &[u8], options: &ScanOptions) -> Option<ProbeKind> {
    if call.kind() != "call_expression" {
        return None;
    }
    let callee = call.child_by_field_name("function")?;

    let (keyword, modifier) = match callee.kind() {
        "identifier" => (txt(callee, src), None),
        "member_expression" => {
            let object = callee.child_by_field_name("object")?;
            let property = callee.child_by_field_name("property")?;
            if object.kind() != "identifier" {
                return None;
            }
            (txt(object, src), Some(txt(property, src)))
        }
        _ => return None,
    };

    if options.is_suite_keyword(keyword) {
        match modifier {
            None | Some("only") => Some(ProbeKind::Suite),
            Some("skip") => Some(ProbeKind::SuiteSkip),
            Some(_) => None,
        }
    } else if options.is_test_keyword(keyword) {
        match modifier {
            None => Some(ProbeKind::Test),
            Some("skip") => Some(ProbeKind::TestSkip),
            Some("only") => Some(ProbeKind::TestOnly),
            Some(_) => None,
        }
    } else {
        None
    }
}

/// Argument expressions of a call, comments excluded.
///
/// Tagged templates (`` it`name` ``) have no argument list and yield nothing.
pub fn call_arguments<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    match call.child_by_field_name("arguments") {
        Some(args) if args.kind() == "arguments" => named_children(args),
        _ => Vec::new(),
    }
}

/// A declaration without a callback is pending even without `.skip`.
///
/// That is: fewer than two arguments, or a name followed only by a config
/// object. Three or more arguments always count as having a callback.
pub fn is_implicitly_pending(args: &[Node]) -> bool {
    match args {
        [] | [_] => true,
        [_, second] => unwrap_expression(*second).kind() == "object",
        _ => false,
    }
}
