//! Tag-generic finite automata over the 16-bit alphabet.
//!
//! States live in an arena owned by their automaton and reference each
//! other by index, so cycles need no indirection and structural equality
//! is a comparison of index vectors. State 0 is the start state; the
//! arena is kept in traversal order from it.

use std::fmt;

use crate::charset::{compute_overlaps, CharSet};

mod compose;
mod determinize;
mod matcher;

pub use matcher::Matcher;

pub type StateId = usize;

/// A labelled edge to another state of the same automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    trigger: CharSet,
    target: StateId,
}

impl Transition {
    pub fn trigger(&self) -> &CharSet {
        &self.trigger
    }

    pub fn target(&self) -> StateId {
        self.target
    }
}

/// A state: a duplicate-free, insertion-ordered set of recognized tags
/// (empty for transient states) and an ordered list of transitions.
#[derive(Debug, Clone)]
pub struct State<T> {
    recognizables: Vec<T>,
    transitions: Vec<Transition>,
}

impl<T: Clone + PartialEq> State<T> {
    /// A state recognizing nothing.
    pub fn transient() -> Self {
        Self {
            recognizables: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// A final state recognizing the given tags, deduplicated.
    pub fn accepting(tags: impl IntoIterator<Item = T>) -> Self {
        let mut state = Self::transient();
        for tag in tags {
            state.add_recognizable(tag);
        }
        state
    }

    pub fn recognizables(&self) -> &[T] {
        &self.recognizables
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn is_accepting(&self) -> bool {
        !self.recognizables.is_empty()
    }

    pub(crate) fn add_recognizable(&mut self, tag: T) {
        if !self.recognizables.contains(&tag) {
            self.recognizables.push(tag);
        }
    }

    pub(crate) fn add_recognizables(&mut self, tags: &[T]) {
        for tag in tags {
            self.add_recognizable(tag.clone());
        }
    }

    pub(crate) fn set_recognizables(&mut self, tags: Vec<T>) {
        self.recognizables.clear();
        for tag in tags {
            self.add_recognizable(tag);
        }
    }

    /// Adds a transition. With `merge` set, an existing transition to the
    /// same target absorbs the new trigger instead.
    pub fn on(&mut self, trigger: CharSet, target: StateId, merge: bool) {
        if merge {
            if let Some(t) = self.transitions.iter_mut().find(|t| t.target == target) {
                t.trigger = t.trigger.union(&trigger);
                return;
            }
        }
        self.transitions.push(Transition { trigger, target });
    }

    /// Rewrites the transitions so their triggers are pairwise disjoint.
    /// A trigger overlapping several others is cut into the partitions of
    /// the overlap, one transition per partition and former target, so
    /// nondeterminism survives only as duplicated targets.
    pub(crate) fn reorganize_overlaps(&mut self) {
        if self.transitions.len() < 2 {
            return;
        }
        let triggers: Vec<&CharSet> = self.transitions.iter().map(|t| &t.trigger).collect();
        let overlaps = compute_overlaps(&triggers);
        let old = std::mem::take(&mut self.transitions);
        for overlap in &overlaps {
            for &i in overlap.members() {
                self.transitions.push(Transition {
                    trigger: overlap.set().clone(),
                    target: old[i].target,
                });
            }
        }
    }

    /// Structural equality: same recognizables as sets, same transitions
    /// as multisets of (trigger, target).
    pub(crate) fn same_shape(&self, other: &Self) -> bool {
        if self.recognizables.len() != other.recognizables.len()
            || self.transitions.len() != other.transitions.len()
        {
            return false;
        }
        if !self
            .recognizables
            .iter()
            .all(|t| other.recognizables.contains(t))
        {
            return false;
        }
        let mut used = vec![false; other.transitions.len()];
        'outer: for t in &self.transitions {
            for (i, o) in other.transitions.iter().enumerate() {
                if !used[i] && t.target == o.target && t.trigger == o.trigger {
                    used[i] = true;
                    continue 'outer;
                }
            }
            return false;
        }
        true
    }
}

/// Builds an automaton state by state, the way composition passes and
/// hand-written machines do.
#[derive(Debug)]
pub struct Builder<T> {
    states: Vec<State<T>>,
}

impl<T: Clone + PartialEq> Default for Builder<T> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<T: Clone + PartialEq> Builder<T> {
    pub fn push(&mut self, state: State<T>) -> StateId {
        let id = self.states.len();
        self.states.push(state);
        id
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut State<T> {
        &mut self.states[id]
    }

    /// Finishes the automaton. State 0 is the start; unreachable states
    /// are dropped and the rest renumbered in traversal order.
    pub fn build(self) -> Automaton<T> {
        let mut autom = Automaton { states: self.states };
        assert!(!autom.states.is_empty(), "an automaton needs a start state");
        autom.compact();
        autom
    }
}

/// An automaton: its reachable states in traversal order from state 0.
#[derive(Debug, Clone)]
pub struct Automaton<T> {
    states: Vec<State<T>>,
}

impl<T: Clone + PartialEq> Automaton<T> {
    pub fn builder() -> Builder<T> {
        Builder::default()
    }

    pub(crate) fn from_states(states: Vec<State<T>>) -> Self {
        debug_assert!(!states.is_empty());
        let mut autom = Self { states };
        autom.compact();
        autom
    }

    pub fn states(&self) -> &[State<T>] {
        &self.states
    }

    pub(crate) fn states_mut(&mut self) -> &mut [State<T>] {
        &mut self.states
    }

    pub fn state(&self, id: StateId) -> &State<T> {
        &self.states[id]
    }

    pub fn start(&self) -> &State<T> {
        &self.states[0]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// An automaton is optional when its start state is final, which puts
    /// the empty string in its language.
    pub fn is_optional(&self) -> bool {
        self.start().is_accepting()
    }

    /// True when every state's triggers are pairwise disjoint.
    pub fn is_deterministic(&self) -> bool {
        self.states.iter().all(|s| {
            s.transitions.iter().enumerate().all(|(i, a)| {
                s.transitions[i + 1..]
                    .iter()
                    .all(|b| a.trigger.intersect(&b.trigger).is_empty())
            })
        })
    }

    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_accepting())
            .map(|(id, _)| id)
    }

    /// Replaces every tag through `f`, preserving the shape.
    pub fn map_tags<U: Clone + PartialEq>(&self, f: impl Fn(&T) -> U) -> Automaton<U> {
        Automaton {
            states: self
                .states
                .iter()
                .map(|s| {
                    let mut ns = State::accepting(s.recognizables.iter().map(&f));
                    ns.transitions = s.transitions.clone();
                    ns
                })
                .collect(),
        }
    }

    /// Drops unreachable states and renumbers the rest breadth-first from
    /// the start. Uses an explicit work list, never the call stack.
    pub(crate) fn compact(&mut self) {
        const UNSEEN: usize = usize::MAX;
        let mut remap = vec![UNSEEN; self.states.len()];
        let mut order: Vec<StateId> = vec![0];
        remap[0] = 0;
        let mut head = 0;
        while head < order.len() {
            let id = order[head];
            head += 1;
            for t in &self.states[id].transitions {
                if remap[t.target] == UNSEEN {
                    remap[t.target] = order.len();
                    order.push(t.target);
                }
            }
        }
        if order.len() == self.states.len() && order.iter().enumerate().all(|(i, &s)| i == s) {
            return;
        }
        let mut states = Vec::with_capacity(order.len());
        for &old in &order {
            let mut s = self.states[old].clone();
            for t in &mut s.transitions {
                t.target = remap[t.target];
            }
            states.push(s);
        }
        self.states = states;
    }
}

impl<T: fmt::Debug> fmt::Display for Automaton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            write!(f, "{id:>4}")?;
            if !state.recognizables.is_empty() {
                write!(f, " accepts {:?}", state.recognizables)?;
            }
            writeln!(f)?;
            for t in &state.transitions {
                writeln!(f, "      {:?} -> {}", t.trigger, t.target)?;
            }
        }
        Ok(())
    }
}
