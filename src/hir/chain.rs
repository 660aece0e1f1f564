//! Cycle detection for resolution and classification.
//!
//! A [`ReferenceChain`] is the stack of assignments currently being
//! resolved by one resolution attempt. Pushing an assignment that is
//! already on the stack fails with [`CircularReference`]; every assignment
//! on the detected cycle is remembered so it can report the cycle itself
//! once its own resolution finishes.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use super::ids::AssignmentRef;

/// Re-entry of an assignment already on the chain.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("circular reference: {path}")]
pub struct CircularReference {
    /// Assignments from the re-entered one to the top of the chain.
    pub members: Vec<AssignmentRef>,
    /// `a -> b -> a`
    pub path: String,
}

/// Chain depth to return to with [`ReferenceChain::rollback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainMark(usize);

#[derive(Clone, Debug)]
pub struct ReferenceChain {
    elements: IndexMap<AssignmentRef, SmolStr>,
    /// Record cycle members when a re-entry is detected.
    report: bool,
    /// Cycle members with the cycle rendered from their own position.
    cycle_members: FxHashMap<AssignmentRef, String>,
}

impl Default for ReferenceChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceChain {
    pub fn new() -> Self {
        Self {
            elements: IndexMap::new(),
            report: true,
            cycle_members: FxHashMap::default(),
        }
    }

    /// A chain for speculative lookups: re-entry still fails, but nothing is
    /// recorded for reporting.
    pub fn silent() -> Self {
        Self {
            report: false,
            ..Self::new()
        }
    }

    pub fn push(&mut self, element: AssignmentRef, name: &str) -> Result<(), CircularReference> {
        if let Some(start) = self.elements.get_index_of(&element) {
            let members: Vec<AssignmentRef> =
                self.elements.keys().skip(start).copied().collect();
            let names: Vec<&str> = self
                .elements
                .values()
                .skip(start)
                .map(SmolStr::as_str)
                .collect();
            if self.report {
                for (k, member) in members.iter().enumerate() {
                    let rotated = rotate(&names, k);
                    self.cycle_members.insert(*member, rotated);
                }
            }
            let mut path = names;
            path.push(name);
            let path = path.join(" -> ");
            tracing::trace!("[CHAIN] cycle detected: {}", path);
            return Err(CircularReference { members, path });
        }
        self.elements.insert(element, SmolStr::new(name));
        Ok(())
    }

    pub fn mark(&self) -> ChainMark {
        ChainMark(self.elements.len())
    }

    /// Drop everything pushed after `mark`.
    pub fn rollback(&mut self, mark: ChainMark) {
        self.elements.truncate(mark.0);
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn contains(&self, element: AssignmentRef) -> bool {
        self.elements.contains_key(&element)
    }

    /// Whether `element` was found on a cycle by this chain.
    pub fn is_cycle_member(&self, element: AssignmentRef) -> bool {
        self.cycle_members.contains_key(&element)
    }

    /// The cycle through `element`, starting and ending at it.
    pub fn cycle_path(&self, element: AssignmentRef) -> Option<&str> {
        self.cycle_members.get(&element).map(String::as_str)
    }
}

fn rotate(names: &[&str], start: usize) -> String {
    let mut path: Vec<&str> = names[start..].iter().chain(&names[..start]).copied().collect();
    path.push(names[start]);
    path.join(" -> ")
}
