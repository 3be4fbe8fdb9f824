//! Composition of automata. Every operation leaves its inputs untouched
//! and produces a fresh machine, splicing start transitions into the
//! states where a sub-machine begins instead of routing through empty
//! transitions, so no epsilon elimination pass is ever needed.

use super::{Automaton, State, StateId, Transition};

impl<T: Clone + PartialEq> Automaton<T> {
    /// Copies all states of `src` to the end of `dst`, running each
    /// state's replica through `clone_state` (which controls the
    /// recognizables) and re-pointing transitions. Returns the offset of
    /// the copied start state.
    fn splice_into(
        dst: &mut Vec<State<T>>,
        src: &Automaton<T>,
        mut clone_state: impl FnMut(&State<T>) -> State<T>,
    ) -> StateId {
        let offset = dst.len();
        for s in src.states() {
            let mut replica = clone_state(s);
            replica.transitions = s
                .transitions
                .iter()
                .map(|t| Transition {
                    trigger: t.trigger.clone(),
                    target: t.target + offset,
                })
                .collect();
            dst.push(replica);
        }
        offset
    }

    fn replica(s: &State<T>) -> State<T> {
        State::accepting(s.recognizables().iter().cloned())
    }

    /// A machine accepting the same language plus the empty string.
    ///
    /// The new start state recognizes everything any final state does and
    /// carries a copy of the original start's outbound edges.
    pub fn optional(&self) -> Self {
        if self.is_optional() {
            return self.clone();
        }
        let mut states = Vec::with_capacity(self.state_count() + 1);
        let mut start = State::transient();
        for id in self.final_states() {
            start.add_recognizables(self.state(id).recognizables());
        }
        states.push(start);
        let offset = Self::splice_into(&mut states, self, Self::replica);
        let entry = states[offset].transitions.clone();
        states[0].transitions.extend(entry);
        Self::from_states(states)
    }

    /// One or more repetitions of this machine's language.
    pub fn repeated(&self) -> Self {
        let mut states = Vec::with_capacity(self.state_count());
        Self::splice_into(&mut states, self, Self::replica);
        let entry = states[0].transitions.clone();
        for id in self.final_states() {
            states[id].transitions.extend(entry.iter().cloned());
        }
        Self::from_states(states)
    }

    /// The union of the operand languages. Operand order is preserved in
    /// state numbering and transition listing.
    pub fn choice(operands: &[&Self]) -> Self {
        assert!(!operands.is_empty(), "choice of no automata");
        let mut states = vec![State::transient()];
        for a in operands {
            states[0].add_recognizables(a.start().recognizables());
            let offset = Self::splice_into(&mut states, a, Self::replica);
            let entry = states[offset].transitions.clone();
            states[0].transitions.extend(entry);
        }
        Self::from_states(states)
    }

    /// Concatenation of the operand languages.
    ///
    /// The frontier is the set of states where the next operand must be
    /// spliced in. Recognizables are stripped from every operand before
    /// the last non-optional one, so only runs that cover all required
    /// operands can accept; an optional operand leaves the previous
    /// frontier alive, since the operand may be skipped entirely.
    pub fn concat(operands: &[&Self]) -> Self {
        assert!(!operands.is_empty(), "concatenation of no automata");
        let last_required = operands.iter().rposition(|a| !a.is_optional());

        let start = match last_required {
            // every operand is optional, so the whole machine is
            None => Self::replica(operands[0].start()),
            Some(_) => State::transient(),
        };
        let mut states = vec![start];
        let mut frontier: Vec<StateId> = vec![0];

        for (i, a) in operands.iter().enumerate() {
            let keep_tags = last_required.map_or(true, |l| i >= l);
            let offset = Self::splice_into(&mut states, a, |s| {
                if keep_tags {
                    Self::replica(s)
                } else {
                    State::transient()
                }
            });
            // finality is judged on the operand, not on the stripped clone
            let new_frontier: Vec<StateId> =
                a.final_states().map(|id| id + offset).collect();

            let entry = states[offset].transitions.clone();
            for &f in &frontier {
                states[f].transitions.extend(entry.iter().cloned());
            }

            if a.is_optional() {
                frontier.extend(new_frontier);
            } else {
                frontier = new_frontier;
            }
        }
        Self::from_states(states)
    }
}
