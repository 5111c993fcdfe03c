use crate::model::{Node, Suite, Test, UNNAMED};

use super::index::{Probe, ProbeId, ProbeIndex};
use super::registry::{Registry, SlotId};

/// A child link: either a test probe or a suite under construction.
#[derive(Debug, Clone, Copy)]
enum Link {
    Test(ProbeId),
    Suite(SlotId),
}

/// A suite under construction.
#[derive(Debug)]
struct SuiteSlot {
    probe: ProbeId,
    tests: Vec<ProbeId>,
    suites: Vec<SlotId>,
}

/// Builds the suite/test forest from call sightings.
///
/// Sightings arrive leaf-first (a nested call before the call enclosing it),
/// each with the chain of enclosing suite probes ordered outermost first.
/// Suites are created lazily and wired to their parent the first time they
/// are reached; the registry guarantees one suite node per suite call.
#[derive(Debug, Default)]
pub(crate) struct Engine {
    slots: Vec<SuiteSlot>,
    registry: Registry,
    forest: Vec<Link>,
}

impl Engine {
    /// Primary pass: place a test under its innermost enclosing suite,
    /// building whatever part of the suite chain is still unknown.
    pub fn observe_test(&mut self, test: ProbeId, suite_chain: &[ProbeId]) {
        self.climb(Link::Test(test), suite_chain);
    }

    /// Orphan pass: make sure a suite is in the forest even if no test under
    /// it was ever observed.
    ///
    /// A suite that is already known was wired in by an earlier sighting, so
    /// nothing new is discovered and nothing is added.
    pub fn observe_suite(&mut self, suite: ProbeId, suite_chain: &[ProbeId]) {
        if self.registry.contains(suite) {
            return;
        }
        let (slot, _) = self.slot_for(suite);
        self.climb(Link::Suite(slot), suite_chain);
    }

    /// Attach `child` to the innermost suite of the chain and keep linking
    /// newly created suites upward.
    ///
    /// Climbing stops at the first suite that already existed: its own
    /// parent linkage was made when it was created. Reaching the top of the
    /// chain without meeting a known suite means `child`'s branch is new at
    /// the top level.
    fn climb(&mut self, mut child: Link, suite_chain: &[ProbeId]) {
        for &suite in suite_chain.iter().rev() {
            let (slot, existed) = self.slot_for(suite);
            let parent = &mut self.slots[slot.0];
            match child {
                Link::Test(test) => parent.tests.push(test),
                Link::Suite(s) => parent.suites.push(s),
            }
            if existed {
                return;
            }
            child = Link::Suite(slot);
        }
        self.forest.push(child);
    }

    /// Slot of a suite probe, creating it on first use. The flag tells
    /// whether the slot existed before this call.
    fn slot_for(&mut self, suite: ProbeId) -> (SlotId, bool) {
        if let Some(slot) = self.registry.lookup(suite) {
            return (slot, true);
        }
        let slot = SlotId(self.slots.len());
        self.slots.push(SuiteSlot {
            probe: suite,
            tests: Vec::new(),
            suites: Vec::new(),
        });
        self.registry.register(suite, slot);
        (slot, false)
    }

    /// Number of distinct suites seen so far.
    pub fn suite_count(&self) -> usize {
        self.registry.len()
    }

    /// Turn the arena into an owned forest with full names and counts.
    pub fn finish(self, index: &ProbeIndex) -> Vec<Node> {
        let mut forest: Vec<Node> = self
            .forest
            .iter()
            .map(|link| match *link {
                Link::Test(test) => Node::Test(build_test(index.get(test), None)),
                Link::Suite(slot) => Node::Suite(self.build_suite(slot, None, index)),
            })
            .collect();

        for node in &mut forest {
            if let Node::Suite(suite) = node {
                tally(suite);
            }
        }
        forest
    }

    fn build_suite(&self, slot: SlotId, parent: Option<&str>, index: &ProbeIndex) -> Suite {
        let state = &self.slots[slot.0];
        let probe = index.get(state.probe);
        let full_name = full_name(parent, probe.name.as_deref());

        let tests = state
            .tests
            .iter()
            .map(|&t| build_test(index.get(t), Some(&full_name)))
            .collect();
        let suites = state
            .suites
            .iter()
            .map(|&s| self.build_suite(s, Some(&full_name), index))
            .collect();

        Suite {
            name: probe.name.clone(),
            full_name,
            pending: probe.pending,
            tags: probe.tags.tags.clone(),
            required_tags: probe.tags.required_tags.clone(),
            only_tags: probe.tags.only_tags.clone(),
            tests,
            suites,
            test_count: 0,
            suite_count: 0,
            pending_test_count: 0,
            line: probe.line,
        }
    }
}

fn build_test(probe: &Probe, parent: Option<&str>) -> Test {
    Test {
        name: probe.name.clone(),
        full_name: full_name(parent, probe.name.as_deref()),
        pending: probe.pending,
        exclusive: probe.exclusive,
        tags: probe.tags.tags.clone(),
        required_tags: probe.tags.required_tags.clone(),
        only_tags: probe.tags.only_tags.clone(),
        effective_tags: Vec::new(),
        comment: probe.comment.clone(),
        line: probe.line,
    }
}

/// Space-joined path of names from the top-level suite down to `name`.
fn full_name(parent: Option<&str>, name: Option<&str>) -> String {
    let own = name.unwrap_or(UNNAMED);
    match parent {
        Some(p) => format!("{p} {own}"),
        None => own.to_string(),
    }
}

/// Bottom-up recount of a suite's test, descendant-suite and pending totals.
pub(crate) fn tally(suite: &mut Suite) {
    let mut test_count = suite.tests.len();
    let mut pending_test_count = suite.tests.iter().filter(|t| t.pending).count();
    let mut suite_count = 0;

    for child in &mut suite.suites {
        tally(child);
        test_count += child.test_count;
        pending_test_count += child.pending_test_count;
        suite_count += 1 + child.suite_count;
    }

    suite.test_count = test_count;
    suite.pending_test_count = pending_test_count;
    suite.suite_count = suite_count;
}
