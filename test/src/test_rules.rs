//! Game rules for the test mesh: records every applied event so tests can
//! compare application order across peers.

use std::collections::HashSet;

use meshsync_shared::{Event, EventKind, EventSeq, GameRules};

use crate::{test_protocol::CHEAT, test_world::TestWorld};

pub struct TestRules {
    pub applied: Vec<(EventSeq, Event)>,
    pub illegal: HashSet<EventKind>,
}

impl TestRules {
    pub fn new() -> Self {
        Self {
            applied: Vec::new(),
            illegal: HashSet::from([CHEAT]),
        }
    }

    pub fn applied_seqs(&self) -> Vec<EventSeq> {
        self.applied.iter().map(|(seq, _)| *seq).collect()
    }
}

impl Default for TestRules {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules<TestWorld> for TestRules {
    fn is_legal(&self, _world: &TestWorld, event: &Event) -> bool {
        !self.illegal.contains(&event.kind)
    }

    fn apply(&mut self, _world: &mut TestWorld, seq: EventSeq, event: &Event) {
        self.applied.push((seq, event.clone()));
    }
}
