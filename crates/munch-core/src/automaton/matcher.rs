use rand::Rng;

use super::{Automaton, StateId};

/// Walks an automaton one code unit at a time, remembering the tags of
/// the most recent accepting state it entered. The walk is only
/// meaningful on deterministic automata; on others the first transition
/// whose trigger contains the input wins.
#[derive(Debug)]
pub struct Matcher<'a, T> {
    autom: &'a Automaton<T>,
    current: StateId,
    last_recognized: Vec<T>,
}

impl<'a, T: Clone + PartialEq> Matcher<'a, T> {
    pub fn new(autom: &'a Automaton<T>) -> Self {
        let mut matcher = Self {
            autom,
            current: 0,
            last_recognized: Vec::new(),
        };
        matcher.reset();
        matcher
    }

    /// Puts the matcher back on the start state.
    pub fn reset(&mut self) {
        self.current = 0;
        self.last_recognized = self.autom.start().recognizables().to_vec();
    }

    /// Tags recognized by the current state.
    pub fn recognized(&self) -> &[T] {
        self.autom.state(self.current).recognizables()
    }

    /// Whether the current state is accepting.
    pub fn is_recognizing(&self) -> bool {
        self.autom.state(self.current).is_accepting()
    }

    /// Tags of the most recent accepting state entered since the last
    /// reset, the start state included.
    pub fn last_recognized(&self) -> &[T] {
        &self.last_recognized
    }

    /// Feeds one code unit. Returns whether a transition fired; when none
    /// does the matcher stays where it is.
    pub fn step(&mut self, c: u16) -> bool {
        let fired = self
            .autom
            .state(self.current)
            .transitions()
            .iter()
            .find(|t| t.trigger().contains(c));
        match fired {
            Some(t) => {
                self.enter(t.target());
                true
            }
            None => false,
        }
    }

    /// Takes a random outgoing transition and returns a random code unit
    /// from its trigger, or `None` on a state with no way out.
    pub fn random_step<R: Rng>(&mut self, rng: &mut R) -> Option<u16> {
        let transitions = self.autom.state(self.current).transitions();
        if transitions.is_empty() {
            return None;
        }
        let t = &transitions[rng.gen_range(0..transitions.len())];
        let c = t.trigger().random(rng)?;
        self.enter(t.target());
        Some(c)
    }

    fn enter(&mut self, target: StateId) {
        self.current = target;
        let tags = self.autom.state(target).recognizables();
        if !tags.is_empty() {
            self.last_recognized = tags.to_vec();
        }
    }
}
