use std::collections::HashMap;

use tree_sitter::Node;

use crate::config::ScanOptions;
use crate::literal::{declared_tags, leading_comment, log_recovered, probe_name, Bindings, DeclaredTags};
use crate::probe::{call_arguments, classify, is_implicitly_pending, ProbeKind};
use crate::util::line_of;
use crate::walk::for_each_call_preorder;

/// Dense id of one probe call, assigned in source (pre-)order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ProbeId(u32);

impl ProbeId {
    fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// Everything extracted from one probe call.
#[derive(Debug, Clone)]
pub(crate) struct Probe {
    pub kind: ProbeKind,
    pub name: Option<String>,
    pub pending: bool,
    pub exclusive: bool,
    pub tags: DeclaredTags,
    pub comment: Option<String>,
    pub line: usize,
}

/// Arena of all probes in a tree, addressable by [`ProbeId`] or by the
/// tree-sitter node of the call.
pub(crate) struct ProbeIndex {
    probes: Vec<Probe>,
    by_node: HashMap<usize, ProbeId>,
}

impl ProbeIndex {
    /// Index every suite and test call under `root` in one pre-order pass.
    pub fn build(root: Node, src: &[u8], options: &ScanOptions, bindings: &Bindings) -> Self {
        let mut index = Self {
            probes: Vec::new(),
            by_node: HashMap::new(),
        };

        for_each_call_preorder(root, &mut |call| {
            let Some(kind) = classify(call, src, options) else {
                return;
            };
            let probe = extract_probe(call, kind, src, bindings);
            let id = ProbeId(index.probes.len() as u32);
            index.probes.push(probe);
            index.by_node.insert(call.id(), id);
        });

        index
    }

    /// Probe id of a call node, if the call is a probe.
    pub fn id_of(&self, call: Node) -> Option<ProbeId> {
        self.by_node.get(&call.id()).copied()
    }

    pub fn get(&self, id: ProbeId) -> &Probe {
        &self.probes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }
}

fn extract_probe(call: Node, kind: ProbeKind, src: &[u8], bindings: &Bindings) -> Probe {
    let args = call_arguments(call);

    let name = probe_name(&args, src).unwrap_or_else(|err| {
        log_recovered(&err);
        None
    });

    Probe {
        kind,
        name,
        pending: kind.is_skip() || is_implicitly_pending(&args),
        exclusive: kind.is_exclusive(),
        tags: declared_tags(&args, src, bindings),
        comment: if kind.is_test() {
            leading_comment(call, src)
        } else {
            None
        },
        line: line_of(call),
    }
}
