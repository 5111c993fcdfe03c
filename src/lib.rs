//! Suite/test trees recovered from Mocha-style spec files.
//!
//! Parses TypeScript/JavaScript sources with tree-sitter, finds
//! `describe`/`context`/`it`/`specify` calls (with `.skip`/`.only`) and
//! rebuilds the suite tree with its counts and inherited tags.

pub mod config;
pub mod error;
pub mod format;
pub mod lang;
pub mod literal;
pub mod model;
pub mod parser;
pub mod probe;
pub mod reconstruct;
pub mod resolve;
pub mod tags;
pub mod visit;
pub mod walk;

mod util;

pub use config::ScanOptions;
pub use error::ScanError;
pub use format::TestList;
pub use model::{Entry, EntryKind, Node, NodeRef, Suite, Test, TestNames, TestTags, UNNAMED};
pub use reconstruct::{reconstruct, reconstruct_file, Scanner};
pub use resolve::{resolve_exports, resolve_imports, ImportSource, RelativeFiles};
pub use tags::{
    count_tags, filter_by_effective_tags, filter_source_by_effective_tags,
    find_effective_test_tags, find_effective_test_tags_in, propagate_tags,
};
pub use visit::{visit_each_node, visit_each_test};
